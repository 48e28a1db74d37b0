mod common;

use std::time::Duration;

use tokio::time::Instant;

use common::LaggyTable;
use todolist_e2e::wait::{MAX_WAIT, POLL_INTERVAL};
use todolist_e2e::{E2eError, ListPage, WaitConfig};

#[tokio::test(start_paused = true)]
async fn wait_for_row_tolerates_a_slow_render() {
    let browser = LaggyTable::new(&["1: 운동 하기", "2: 운동 후 단백질 섭취하기"], 4);
    let page = ListPage::new(&browser, WaitConfig::default());
    let start = Instant::now();

    page.wait_for_row_in_list_table("2: 운동 후 단백질 섭취하기")
        .await
        .unwrap();
    page.wait_for_row_in_list_table("1: 운동 하기").await.unwrap();

    assert_eq!(browser.reads(), 6);
    assert_eq!(start.elapsed(), POLL_INTERVAL * 4);
}

#[tokio::test(start_paused = true)]
async fn wait_for_missing_row_fails_after_max_wait() {
    let browser = LaggyTable::new(&["1: Buy milk"], 0);
    let page = ListPage::new(&browser, WaitConfig::default());
    let start = Instant::now();

    let err = page
        .wait_for_row_in_list_table("1: Buy peacock feathers")
        .await
        .unwrap_err();

    assert!(matches!(err, E2eError::AssertionFailed(_)));
    assert!(err.to_string().contains("Buy peacock feathers"));
    assert!(start.elapsed() > MAX_WAIT);
}

#[tokio::test(start_paused = true)]
async fn row_text_must_match_exactly() {
    let browser = LaggyTable::new(&["1: 운동 하기"], 0);
    let page = ListPage::new(
        &browser,
        WaitConfig {
            max_wait: Duration::from_secs(1),
            poll_interval: Duration::from_millis(100),
        },
    );

    assert!(page.wait_for_row_in_list_table("운동 하기").await.is_err());
}

#[tokio::test(start_paused = true)]
async fn add_list_item_submits_and_waits_for_next_position() {
    let browser = LaggyTable::new(&["1: Buy milk"], 0);
    let page = ListPage::new(&browser, WaitConfig::default());

    assert_eq!(page.row_texts().await.unwrap(), vec!["1: Buy milk"]);

    page.add_list_item("Buy peacock feathers").await.unwrap();

    assert_eq!(
        page.row_texts().await.unwrap(),
        vec!["1: Buy milk", "2: Buy peacock feathers"]
    );
    assert_eq!(
        *browser.keys.lock(),
        vec!["Buy peacock feathers".to_string(), "<enter>".to_string()]
    );
}

#[tokio::test(start_paused = true)]
async fn add_list_item_waits_for_a_slow_table_before_counting() {
    // The existing row is hidden for one read after load and after submit
    let browser = LaggyTable::new(&["1: Buy milk"], 1);
    let page = ListPage::new(&browser, WaitConfig::default());
    let start = Instant::now();

    page.add_list_item("Buy peacock feathers").await.unwrap();

    assert_eq!(
        page.row_texts().await.unwrap(),
        vec!["1: Buy milk", "2: Buy peacock feathers"]
    );
    assert!(start.elapsed() < MAX_WAIT);
}

#[tokio::test(start_paused = true)]
async fn add_list_item_on_an_empty_list_still_loading_starts_at_one() {
    let browser = LaggyTable::new(&[], 3);
    let page = ListPage::new(
        &browser,
        WaitConfig {
            max_wait: Duration::from_secs(2),
            poll_interval: Duration::from_millis(100),
        },
    );

    page.add_list_item("운동 하기").await.unwrap();
    assert_eq!(page.row_texts().await.unwrap(), vec!["1: 운동 하기"]);
}

#[tokio::test(start_paused = true)]
async fn add_list_item_on_the_home_page_starts_at_one_without_reading_a_table() {
    let browser = LaggyTable::new(&[], 0).at("http://testserver/");
    let page = ListPage::new(&browser, WaitConfig::default());

    page.add_list_item("운동 하기").await.unwrap();

    // Only the wait for the new row reads the table
    assert_eq!(browser.reads(), 1);
    assert_eq!(page.row_texts().await.unwrap(), vec!["1: 운동 하기"]);
}
