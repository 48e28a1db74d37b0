//! To-Do Lists Functional Tests
//!
//! Browser-driven acceptance tests for the to-do list app:
//! - Starts the live server in-process (or targets an external one)
//! - Drives real browsers over WebDriver
//! - Parses declarative YAML scenarios
//! - Retries DOM assertions with a bounded polling wait
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Functional Test Runner                     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  TestRunner                                                 │
//! │    ├── start_server() -> ServerHandle                       │
//! │    ├── run_scenario(scenario) -> TestResult                 │
//! │    │     └── ScenarioSession (one Browser at a time)        │
//! │    │           ├── execute_step(step) -> StepResult         │
//! │    │           └── new_session()  (fresh cookies)           │
//! │    └── write_results(suite) -> test-results.json            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Scenario (YAML)                                            │
//! │    ├── name, description, tags, unfinished                  │
//! │    └── steps: [Step]                                        │
//! │          ├── visit { path }                                 │
//! │          ├── type / press { target, ... }                   │
//! │          ├── add_item / wait_for_row { text }               │
//! │          ├── assert_title / assert_text / assert_attribute  │
//! │          ├── remember_url / assert_url / assert_page_text   │
//! │          └── new_session / sleep / log / fail               │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod browser;
pub mod error;
pub mod executor;
pub mod page;
pub mod runner;
pub mod scenario;
pub mod server;
pub mod wait;
pub mod webdriver;

pub use browser::{Browser, BrowserFactory, Key, Target};
pub use error::{E2eError, E2eResult};
pub use page::ListPage;
pub use runner::TestRunner;
pub use scenario::{Scenario, Step};
pub use wait::{wait_until, WaitConfig};
