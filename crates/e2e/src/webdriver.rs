//! WebDriver browser automation via fantoccini

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::wd::TimeoutConfiguration;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use crate::browser::{Browser, BrowserFactory, Key, Target};
use crate::error::{E2eError, E2eResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BrowserKind {
    #[default]
    Chrome,
    Firefox,
}

impl BrowserKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BrowserKind::Chrome => "chrome",
            BrowserKind::Firefox => "firefox",
        }
    }
}

impl FromStr for BrowserKind {
    type Err = E2eError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "chrome" | "chromium" => Ok(BrowserKind::Chrome),
            "firefox" => Ok(BrowserKind::Firefox),
            other => Err(E2eError::Config(format!("Unsupported browser: {}", other))),
        }
    }
}

/// Configuration for WebDriver sessions
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// WebDriver endpoint (chromedriver, geckodriver)
    pub webdriver_url: String,
    pub browser: BrowserKind,
    pub headless: bool,
    /// How long element lookups block before failing
    pub implicit_wait: Duration,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:9515".to_string(),
            browser: BrowserKind::Chrome,
            headless: true,
            implicit_wait: Duration::from_secs(3),
        }
    }
}

impl DriverConfig {
    /// W3C capabilities requested for a new session
    pub fn capabilities(&self) -> Map<String, Value> {
        let mut caps = Map::new();
        caps.insert("browserName".to_string(), json!(self.browser.as_str()));

        match self.browser {
            BrowserKind::Chrome => {
                let mut args = vec!["--disable-gpu", "--no-sandbox", "--disable-dev-shm-usage"];
                if self.headless {
                    args.push("--headless=new");
                }
                caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
            }
            BrowserKind::Firefox => {
                let args: Vec<&str> = if self.headless { vec!["-headless"] } else { vec![] };
                caps.insert("moz:firefoxOptions".to_string(), json!({ "args": args }));
            }
        }

        caps
    }

    /// Whether the WebDriver endpoint answers its status route
    pub async fn is_reachable(&self) -> bool {
        let client = match reqwest::Client::builder()
            .timeout(Duration::from_secs(2))
            .no_proxy()
            .build()
        {
            Ok(client) => client,
            Err(_) => return false,
        };

        let url = format!("{}/status", self.webdriver_url.trim_end_matches('/'));
        matches!(client.get(&url).send().await, Ok(resp) if resp.status().is_success())
    }
}

/// A browser session driven over WebDriver
pub struct WebDriverBrowser {
    client: Client,
}

impl WebDriverBrowser {
    pub async fn connect(config: &DriverConfig) -> E2eResult<Self> {
        debug!(
            "Opening {} session at {}",
            config.browser.as_str(),
            config.webdriver_url
        );

        let mut builder = ClientBuilder::native();
        builder.capabilities(config.capabilities());
        let client = builder.connect(&config.webdriver_url).await?;

        client
            .update_timeouts(TimeoutConfiguration::new(
                None,
                None,
                Some(config.implicit_wait),
            ))
            .await?;

        Ok(Self { client })
    }

    async fn find(&self, target: &Target) -> E2eResult<Element> {
        let css = target.css();
        Ok(self.client.find(Locator::Css(&css)).await?)
    }
}

fn key_char(key: Key) -> char {
    let key = match key {
        Key::Enter => fantoccini::key::Key::Enter,
        Key::Tab => fantoccini::key::Key::Tab,
        Key::Escape => fantoccini::key::Key::Escape,
    };
    char::from(key)
}

#[async_trait]
impl Browser for WebDriverBrowser {
    async fn goto(&self, url: &str) -> E2eResult<()> {
        Ok(self.client.goto(url).await?)
    }

    async fn title(&self) -> E2eResult<String> {
        Ok(self.client.title().await?)
    }

    async fn current_url(&self) -> E2eResult<String> {
        Ok(self.client.current_url().await?.to_string())
    }

    async fn text(&self, target: &Target) -> E2eResult<String> {
        Ok(self.find(target).await?.text().await?)
    }

    async fn child_texts(&self, parent: &Target, child: &Target) -> E2eResult<Vec<String>> {
        let parent = self.find(parent).await?;
        let css = child.css();

        let mut texts = Vec::new();
        for element in parent.find_all(Locator::Css(&css)).await? {
            texts.push(element.text().await?);
        }
        Ok(texts)
    }

    async fn attribute(&self, target: &Target, name: &str) -> E2eResult<Option<String>> {
        Ok(self.find(target).await?.attr(name).await?)
    }

    async fn send_keys(&self, target: &Target, text: &str) -> E2eResult<()> {
        Ok(self.find(target).await?.send_keys(text).await?)
    }

    async fn press_key(&self, target: &Target, key: Key) -> E2eResult<()> {
        let keys = key_char(key).to_string();
        Ok(self.find(target).await?.send_keys(&keys).await?)
    }

    async fn quit(&self) -> E2eResult<()> {
        Ok(self.client.clone().close().await?)
    }
}

/// Launches a new WebDriver session per call
#[derive(Debug, Clone, Default)]
pub struct WebDriverFactory {
    config: DriverConfig,
}

impl WebDriverFactory {
    pub fn new(config: DriverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }
}

#[async_trait]
impl BrowserFactory for WebDriverFactory {
    async fn launch(&self) -> E2eResult<Box<dyn Browser>> {
        let browser = WebDriverBrowser::connect(&self.config).await?;
        info!("Launched {} session", self.config.browser.as_str());
        Ok(Box::new(browser))
    }
}
