//! Step execution against a live browser session

use std::collections::HashMap;
use std::time::{Duration, Instant};

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::browser::{Browser, BrowserFactory, Target};
use crate::error::{E2eError, E2eResult};
use crate::page::ListPage;
use crate::scenario::Step;
use crate::wait::WaitConfig;

/// Result of executing a scenario step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    pub success: bool,
    pub step_name: String,
    pub duration_ms: u64,
    pub error: Option<String>,
}

/// One user's view of the app: a browser session plus remembered URLs.
///
/// Only one browser is open at a time. [`Step::NewSession`] quits it and
/// launches a fresh one from the factory.
pub struct ScenarioSession<'f> {
    factory: &'f dyn BrowserFactory,
    browser: Option<Box<dyn Browser>>,
    base_url: String,
    wait: WaitConfig,
    urls: HashMap<String, String>,
}

impl<'f> ScenarioSession<'f> {
    /// Launch the first browser session
    pub async fn start(
        factory: &'f dyn BrowserFactory,
        base_url: &str,
        wait: WaitConfig,
    ) -> E2eResult<ScenarioSession<'f>> {
        let browser = factory.launch().await?;
        Ok(Self {
            factory,
            browser: Some(browser),
            base_url: base_url.trim_end_matches('/').to_string(),
            wait,
            urls: HashMap::new(),
        })
    }

    pub fn browser(&self) -> E2eResult<&dyn Browser> {
        self.browser
            .as_deref()
            .ok_or_else(|| E2eError::Browser("No browser session is open".to_string()))
    }

    pub fn list_page(&self) -> E2eResult<ListPage<'_>> {
        Ok(ListPage::new(self.browser()?, self.wait))
    }

    /// URL remembered by a previous `remember_url` step
    pub fn remembered_url(&self, name: &str) -> Option<&str> {
        self.urls.get(name).map(String::as_str)
    }

    /// Resolve a path against the live server
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Quit the current browser and launch a fresh one
    pub async fn new_session(&mut self) -> E2eResult<()> {
        if let Some(browser) = self.browser.take() {
            browser.quit().await?;
        }
        self.browser = Some(self.factory.launch().await?);
        info!("Started a fresh browser session");
        Ok(())
    }

    /// Quit the browser
    pub async fn close(mut self) -> E2eResult<()> {
        match self.browser.take() {
            Some(browser) => browser.quit().await,
            None => Ok(()),
        }
    }

    /// Execute a single step, capturing its outcome
    pub async fn execute_step(&mut self, step: &Step) -> StepResult {
        let start = Instant::now();
        let step_name = step.name();

        debug!("Executing step: {}", step_name);
        let result = self.run_step(step).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(()) => StepResult {
                success: true,
                step_name,
                duration_ms,
                error: None,
            },
            Err(e) => StepResult {
                success: false,
                step_name,
                duration_ms,
                error: Some(e.to_string()),
            },
        }
    }

    /// Execute a single step, propagating its error
    pub async fn run_step(&mut self, step: &Step) -> E2eResult<()> {
        match step {
            Step::Visit { path } => {
                let url = self.url_for(path);
                self.browser()?.goto(&url).await
            }
            Step::AssertTitle { contains } => {
                let title = self.browser()?.title().await?;
                assert_contains("title", &title, contains)
            }
            Step::AssertText {
                target,
                contains,
                equals,
            } => {
                let text = self.browser()?.text(target).await?;
                if let Some(expected) = contains {
                    assert_contains(&target.to_string(), &text, expected)?;
                }
                if let Some(expected) = equals {
                    assert_equals(&target.to_string(), &text, expected)?;
                }
                Ok(())
            }
            Step::AssertAttribute {
                target,
                name,
                equals,
            } => {
                let value = self.browser()?.attribute(target, name).await?;
                match value {
                    Some(value) => assert_equals(&format!("{}[{}]", target, name), &value, equals),
                    None => Err(E2eError::AssertionFailed(format!(
                        "{} has no attribute {:?}",
                        target, name
                    ))),
                }
            }
            Step::Type { target, text } => self.browser()?.send_keys(target, text).await,
            Step::Press { target, key } => self.browser()?.press_key(target, *key).await,
            Step::AddItem { text } => self.list_page()?.add_list_item(text).await,
            Step::WaitForRow { text } => self.list_page()?.wait_for_row_in_list_table(text).await,
            Step::RememberUrl { name } => {
                let url = self.browser()?.current_url().await?;
                debug!("Remembering {} as {:?}", url, name);
                self.urls.insert(name.clone(), url);
                Ok(())
            }
            Step::AssertUrl {
                matches,
                differs_from,
            } => {
                let url = self.browser()?.current_url().await?;
                if let Some(pattern) = matches {
                    if !Regex::new(pattern)?.is_match(&url) {
                        return Err(E2eError::AssertionFailed(format!(
                            "URL {:?} does not match {:?}",
                            url, pattern
                        )));
                    }
                }
                if let Some(name) = differs_from {
                    let other = self.remembered_url(name).ok_or_else(|| E2eError::StepFailed {
                        step: step.name(),
                        reason: format!("no URL remembered as {:?}", name),
                    })?;
                    if other == url {
                        return Err(E2eError::AssertionFailed(format!(
                            "URL {:?} is the same as {}'s",
                            url, name
                        )));
                    }
                }
                Ok(())
            }
            Step::AssertPageText {
                contains,
                not_contains,
            } => {
                let text = self.browser()?.text(&Target::tag("body")).await?;
                for expected in contains {
                    assert_contains("page", &text, expected)?;
                }
                for unexpected in not_contains {
                    if text.contains(unexpected.as_str()) {
                        return Err(E2eError::AssertionFailed(format!(
                            "page unexpectedly contains {:?}",
                            unexpected
                        )));
                    }
                }
                Ok(())
            }
            Step::NewSession => self.new_session().await,
            Step::Sleep { ms } => {
                warn!("Sleeping {} ms; prefer wait_for_row", ms);
                tokio::time::sleep(Duration::from_millis(*ms)).await;
                Ok(())
            }
            Step::Log { message } => {
                info!("[SCENARIO] {}", message);
                Ok(())
            }
            Step::Fail { message } => Err(E2eError::Unfinished(message.clone())),
        }
    }
}

fn assert_contains(what: &str, actual: &str, expected: &str) -> E2eResult<()> {
    if actual.contains(expected) {
        Ok(())
    } else {
        Err(E2eError::AssertionFailed(format!(
            "{} {:?} does not contain {:?}",
            what, actual, expected
        )))
    }
}

fn assert_equals(what: &str, actual: &str, expected: &str) -> E2eResult<()> {
    if actual == expected {
        Ok(())
    } else {
        Err(E2eError::AssertionFailed(format!(
            "{} is {:?}, expected {:?}",
            what, actual, expected
        )))
    }
}
