//! Declarative YAML scenarios

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::browser::{Key, Target};
use crate::error::{E2eError, E2eResult};

/// A complete functional test scenario parsed from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Unique name for this scenario
    pub name: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Tags for filtering scenarios
    #[serde(default)]
    pub tags: Vec<String>,

    /// Work in progress: skipped unless explicitly included
    #[serde(default)]
    pub unfinished: bool,

    /// Steps to execute in order
    pub steps: Vec<Step>,
}

/// A single step in a scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// Navigate to a path relative to the live server
    Visit {
        #[serde(default = "default_path")]
        path: String,
    },

    /// Assert the page title contains a string
    AssertTitle { contains: String },

    /// Assert the text of an element
    AssertText {
        target: Target,
        #[serde(default)]
        contains: Option<String>,
        #[serde(default)]
        equals: Option<String>,
    },

    /// Assert an attribute of an element
    AssertAttribute {
        target: Target,
        name: String,
        equals: String,
    },

    /// Type text into an element
    Type { target: Target, text: String },

    /// Press a special key on an element
    Press { target: Target, key: Key },

    /// Type an item into the input box, press Enter and wait for its row
    AddItem { text: String },

    /// Wait until a row with exactly this text appears in the list table
    WaitForRow { text: String },

    /// Store the current URL under a name
    RememberUrl { name: String },

    /// Assert the current URL matches a pattern and/or differs from a remembered one
    AssertUrl {
        #[serde(default)]
        matches: Option<String>,
        #[serde(default)]
        differs_from: Option<String>,
    },

    /// Assert on the whole page text
    AssertPageText {
        #[serde(default)]
        contains: Vec<String>,
        #[serde(default)]
        not_contains: Vec<String>,
    },

    /// Quit the browser and start a fresh session with no cookies
    NewSession,

    /// Wait for a fixed amount of time (use sparingly)
    Sleep { ms: u64 },

    /// Log a message
    Log { message: String },

    /// Fail the scenario unconditionally
    Fail { message: String },
}

fn default_path() -> String {
    "/".to_string()
}

impl Step {
    /// Short label used in logs and results
    pub fn name(&self) -> String {
        match self {
            Step::Visit { path } => format!("visit:{}", path),
            Step::AssertTitle { contains } => format!("assert_title:{}", contains),
            Step::AssertText { target, .. } => format!("assert_text:{}", target),
            Step::AssertAttribute { target, name, .. } => {
                format!("assert_attribute:{}[{}]", target, name)
            }
            Step::Type { target, .. } => format!("type:{}", target),
            Step::Press { target, key } => format!("press:{}:{}", target, key.as_str()),
            Step::AddItem { text } => format!("add_item:{}", text),
            Step::WaitForRow { text } => format!("wait_for_row:{}", text),
            Step::RememberUrl { name } => format!("remember_url:{}", name),
            Step::AssertUrl { .. } => "assert_url".to_string(),
            Step::AssertPageText { .. } => "assert_page_text".to_string(),
            Step::NewSession => "new_session".to_string(),
            Step::Sleep { ms } => format!("sleep:{}ms", ms),
            Step::Log { message } => {
                format!("log:{}", message.chars().take(30).collect::<String>())
            }
            Step::Fail { .. } => "fail".to_string(),
        }
    }
}

impl Scenario {
    /// Parse a scenario from YAML string
    pub fn from_yaml(yaml: &str) -> E2eResult<Self> {
        let scenario: Scenario = serde_yaml::from_str(yaml)?;
        if scenario.steps.is_empty() {
            return Err(E2eError::ScenarioParse(format!(
                "Scenario '{}' has no steps",
                scenario.name
            )));
        }
        Ok(scenario)
    }

    /// Parse a scenario from a YAML file
    pub fn from_file(path: &Path) -> E2eResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
            .map_err(|e| E2eError::ScenarioParse(format!("{}: {}", path.display(), e)))
    }

    /// Load all scenarios from a directory, sorted by file path
    pub fn load_all(dir: &Path) -> E2eResult<Vec<Self>> {
        if !dir.is_dir() {
            return Err(E2eError::ScenarioParse(format!(
                "Scenario directory not found: {}",
                dir.display()
            )));
        }

        let mut scenarios = Vec::new();

        for entry in walkdir::WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .extension()
                    .map(|ext| ext == "yaml" || ext == "yml")
                    .unwrap_or(false)
            })
        {
            scenarios.push(Self::from_file(entry.path())?);
        }

        Ok(scenarios)
    }

    /// Filter scenarios by tag
    pub fn filter_by_tag<'a>(scenarios: &'a [Self], tag: &str) -> Vec<&'a Self> {
        scenarios
            .iter()
            .filter(|s| s.tags.iter().any(|t| t == tag))
            .collect()
    }
}
