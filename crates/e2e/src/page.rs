//! Helpers for the to-do list page

use tracing::debug;

use crate::browser::{Browser, Key, Target};
use crate::error::{E2eError, E2eResult};
use crate::wait::{wait_until, WaitConfig};

pub const INPUT_ID: &str = "id_new_item";
pub const TABLE_ID: &str = "id_list_table";

/// The list page as seen through one browser session
pub struct ListPage<'a> {
    browser: &'a dyn Browser,
    wait: WaitConfig,
}

impl<'a> ListPage<'a> {
    pub fn new(browser: &'a dyn Browser, wait: WaitConfig) -> Self {
        Self { browser, wait }
    }

    pub fn get_item_input_box(&self) -> Target {
        Target::id(INPUT_ID)
    }

    pub fn list_table(&self) -> Target {
        Target::id(TABLE_ID)
    }

    /// Texts of all rows currently in the list table
    pub async fn row_texts(&self) -> E2eResult<Vec<String>> {
        self.browser
            .child_texts(&self.list_table(), &Target::tag("tr"))
            .await
    }

    /// Wait until a row reading exactly `row_text` shows up in the list table
    pub async fn wait_for_row_in_list_table(&self, row_text: &str) -> E2eResult<()> {
        let browser = self.browser;
        let table = self.list_table();
        let table = &table;

        wait_until(&self.wait, row_text, || async move {
            let rows = browser.child_texts(table, &Target::tag("tr")).await?;
            if rows.iter().any(|row| row == row_text) {
                Ok(())
            } else {
                Err(E2eError::AssertionFailed(format!(
                    "{:?} not found in {:?}",
                    row_text, rows
                )))
            }
        })
        .await
    }

    /// Type `text` into the input box, submit it, and wait for its row
    pub async fn add_list_item(&self, text: &str) -> E2eResult<()> {
        let expected_position = self.count_rows().await? + 1;
        let input = self.get_item_input_box();

        self.browser.send_keys(&input, text).await?;
        self.browser.press_key(&input, Key::Enter).await?;

        debug!("Submitted item #{}: {}", expected_position, text);
        self.wait_for_row_in_list_table(&format!("{}: {}", expected_position, text))
            .await
    }

    /// Number of rows on the current page.
    ///
    /// Pages outside `/lists/` have no list yet and count as empty. On a list
    /// page the table is waited for like any other element.
    async fn count_rows(&self) -> E2eResult<usize> {
        let url = self.browser.current_url().await?;
        if !is_list_url(&url) {
            return Ok(0);
        }

        let browser = self.browser;
        let table = &self.list_table();
        wait_until(&self.wait, "list table", || async move {
            Ok(browser.child_texts(table, &Target::tag("tr")).await?.len())
        })
        .await
    }
}

fn is_list_url(url: &str) -> bool {
    reqwest::Url::parse(url)
        .map(|u| u.path().starts_with("/lists/"))
        .unwrap_or(false)
}
