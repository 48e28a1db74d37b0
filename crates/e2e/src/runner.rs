//! Main test runner that orchestrates the live server, browser sessions and scenarios

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::browser::BrowserFactory;
use crate::error::{E2eError, E2eResult};
use crate::executor::{ScenarioSession, StepResult};
use crate::scenario::Scenario;
use crate::server::{ServerConfig, ServerHandle};
use crate::wait::WaitConfig;
use crate::webdriver::{DriverConfig, WebDriverFactory};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Passed,
    Failed,
    Skipped,
}

/// Result of running a single scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub name: String,
    pub outcome: Outcome,
    pub duration_ms: u64,
    pub steps: Vec<StepResult>,
    pub error: Option<String>,
}

impl TestResult {
    pub fn success(&self) -> bool {
        self.outcome != Outcome::Failed
    }

    fn skipped(name: &str) -> Self {
        Self {
            name: name.to_string(),
            outcome: Outcome::Skipped,
            duration_ms: 0,
            steps: vec![],
            error: None,
        }
    }
}

/// Result of running a set of scenarios
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSuiteResult {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub duration_ms: u64,
    pub started_at: DateTime<Utc>,
    pub results: Vec<TestResult>,
}

/// Main functional test runner
pub struct TestRunner {
    /// Live server configuration
    server_config: ServerConfig,

    /// Creates one browser session per scenario
    factory: Arc<dyn BrowserFactory>,

    wait: WaitConfig,

    /// Running server handle (if any)
    server: Option<ServerHandle>,

    /// Scenario directory
    scenarios_dir: PathBuf,

    /// Output directory for results
    output_dir: PathBuf,

    /// Run scenarios marked unfinished instead of skipping them
    include_unfinished: bool,
}

impl TestRunner {
    /// Create a new test runner with default configuration
    pub fn new() -> Self {
        Self::with_config(RunnerConfig::default())
    }

    /// Create a test runner driving real browsers over WebDriver
    pub fn with_config(config: RunnerConfig) -> Self {
        let factory = Arc::new(WebDriverFactory::new(config.driver.clone()));
        Self::with_factory(config, factory)
    }

    /// Create a test runner with a custom browser factory
    pub fn with_factory(config: RunnerConfig, factory: Arc<dyn BrowserFactory>) -> Self {
        Self {
            server_config: config.server,
            factory,
            wait: config.wait,
            server: None,
            scenarios_dir: config.scenarios_dir,
            output_dir: config.output_dir,
            include_unfinished: config.include_unfinished,
        }
    }

    /// Start the live server
    pub async fn start_server(&mut self) -> E2eResult<()> {
        if self.server.is_some() {
            return Ok(()); // Already running
        }

        let server = ServerHandle::spawn(self.server_config.clone()).await?;
        self.server = Some(server);
        Ok(())
    }

    /// Stop the live server
    pub async fn stop_server(&mut self) -> E2eResult<()> {
        if let Some(mut server) = self.server.take() {
            server.stop().await?;
        }
        Ok(())
    }

    pub fn server(&self) -> Option<&ServerHandle> {
        self.server.as_ref()
    }

    /// Run all scenarios in the scenario directory
    pub async fn run_all(&mut self) -> E2eResult<TestSuiteResult> {
        let scenarios = Scenario::load_all(&self.scenarios_dir)?;
        self.run_scenarios(&scenarios).await
    }

    /// Run scenarios matching a tag
    pub async fn run_tagged(&mut self, tag: &str) -> E2eResult<TestSuiteResult> {
        let scenarios = Scenario::load_all(&self.scenarios_dir)?;
        let filtered: Vec<Scenario> = Scenario::filter_by_tag(&scenarios, tag)
            .into_iter()
            .cloned()
            .collect();
        self.run_scenarios(&filtered).await
    }

    /// Run a specific scenario by name
    pub async fn run_test(&mut self, name: &str) -> E2eResult<TestSuiteResult> {
        let scenarios = Scenario::load_all(&self.scenarios_dir)?;
        let scenario = scenarios
            .into_iter()
            .find(|s| s.name == name)
            .ok_or_else(|| E2eError::ScenarioParse(format!("Scenario not found: {}", name)))?;

        self.run_scenarios(std::slice::from_ref(&scenario)).await
    }

    /// Run a list of scenarios, one browser session at a time
    pub async fn run_scenarios(&mut self, scenarios: &[Scenario]) -> E2eResult<TestSuiteResult> {
        let started_at = Utc::now();
        let start = Instant::now();
        let mut results = Vec::new();
        let mut passed = 0;
        let mut failed = 0;
        let mut skipped = 0;

        // Ensure server is running
        self.start_server().await?;

        info!("Running {} scenario(s)...", scenarios.len());

        for scenario in scenarios {
            let result = self.run_scenario(scenario).await;
            match result.outcome {
                Outcome::Passed => {
                    passed += 1;
                    info!("✓ {} ({} ms)", result.name, result.duration_ms);
                }
                Outcome::Failed => {
                    failed += 1;
                    error!(
                        "✗ {} - {}",
                        result.name,
                        result.error.as_deref().unwrap_or("unknown error")
                    );
                }
                Outcome::Skipped => {
                    skipped += 1;
                    info!("- {} (unfinished, skipped)", result.name);
                }
            }
            results.push(result);
        }

        let duration_ms = start.elapsed().as_millis() as u64;

        info!(
            "Test Results: {} passed, {} failed, {} skipped ({} ms)",
            passed, failed, skipped, duration_ms
        );

        Ok(TestSuiteResult {
            total: scenarios.len(),
            passed,
            failed,
            skipped,
            duration_ms,
            started_at,
            results,
        })
    }

    /// Run a single scenario in a fresh browser session
    pub async fn run_scenario(&self, scenario: &Scenario) -> TestResult {
        if scenario.unfinished && !self.include_unfinished {
            return TestResult::skipped(&scenario.name);
        }

        let start = Instant::now();
        debug!("Running scenario: {}", scenario.name);

        let base_url = match self.base_url() {
            Ok(url) => url,
            Err(e) => return failed_result(&scenario.name, start, vec![], e.to_string()),
        };

        let mut session =
            match ScenarioSession::start(self.factory.as_ref(), &base_url, self.wait).await {
                Ok(session) => session,
                Err(e) => return failed_result(&scenario.name, start, vec![], e.to_string()),
            };

        let mut step_results = Vec::new();
        let mut test_error: Option<String> = None;

        for step in &scenario.steps {
            let result = session.execute_step(step).await;

            if !result.success {
                test_error = result.error.clone();
                step_results.push(result);
                break; // Stop on first failure
            }

            step_results.push(result);
        }

        // The browser is closed whether or not the scenario passed
        if let Err(e) = session.close().await {
            warn!("Failed to quit browser after '{}': {}", scenario.name, e);
        }

        match test_error {
            Some(error) => failed_result(&scenario.name, start, step_results, error),
            None => TestResult {
                name: scenario.name.clone(),
                outcome: Outcome::Passed,
                duration_ms: start.elapsed().as_millis() as u64,
                steps: step_results,
                error: None,
            },
        }
    }

    fn base_url(&self) -> E2eResult<String> {
        self.server
            .as_ref()
            .map(|s| s.base_url().to_string())
            .ok_or_else(|| E2eError::ServerStartup("Live server is not running".to_string()))
    }

    /// Write test results to JSON file
    pub fn write_results(&self, results: &TestSuiteResult) -> E2eResult<PathBuf> {
        write_results(&self.output_dir, results)
    }
}

impl Default for TestRunner {
    fn default() -> Self {
        Self::new()
    }
}

fn failed_result(name: &str, start: Instant, steps: Vec<StepResult>, error: String) -> TestResult {
    TestResult {
        name: name.to_string(),
        outcome: Outcome::Failed,
        duration_ms: start.elapsed().as_millis() as u64,
        steps,
        error: Some(error),
    }
}

/// Write `results` as `test-results.json` under `output_dir`
pub fn write_results(output_dir: &Path, results: &TestSuiteResult) -> E2eResult<PathBuf> {
    std::fs::create_dir_all(output_dir)?;

    let path = output_dir.join("test-results.json");
    let json = serde_json::to_string_pretty(results)?;
    std::fs::write(&path, json)?;

    info!("Results written to: {}", path.display());
    Ok(path)
}

/// Configuration for the test runner
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub server: ServerConfig,
    pub driver: DriverConfig,
    pub wait: WaitConfig,
    pub scenarios_dir: PathBuf,
    pub output_dir: PathBuf,
    pub include_unfinished: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            driver: DriverConfig::default(),
            wait: WaitConfig::default(),
            scenarios_dir: PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/scenarios")),
            output_dir: PathBuf::from("test-results"),
            include_unfinished: false,
        }
    }
}
