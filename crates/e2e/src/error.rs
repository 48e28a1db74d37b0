//! Error types for functional testing

use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("Server failed to start: {0}")]
    ServerStartup(String),

    #[error("Server health check failed after {0} attempts")]
    ServerHealthCheck(usize),

    #[error("WebDriver session could not be created: {0}")]
    NewSession(#[from] fantoccini::error::NewSessionError),

    #[error("WebDriver error: {0}")]
    WebDriver(#[from] fantoccini::error::CmdError),

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Scenario parse error: {0}")]
    ScenarioParse(String),

    #[error("Step failed: {step} - {reason}")]
    StepFailed { step: String, reason: String },

    #[error("Assertion failed: {0}")]
    AssertionFailed(String),

    /// Raised by scenarios that are deliberately left incomplete
    #[error("{0}")]
    Unfinished(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL pattern: {0}")]
    Pattern(#[from] regex::Error),
}

impl E2eError {
    /// Whether a polling wait should swallow this error and retry.
    ///
    /// Assertion failures and driver errors are expected while a page is
    /// still rendering; everything else is a real failure. A missing or
    /// closed session does not come back by waiting.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            E2eError::AssertionFailed(_) | E2eError::ElementNotFound(_) | E2eError::WebDriver(_)
        )
    }
}

pub type E2eResult<T> = Result<T, E2eError>;
