//! Bounded polling waits
//!
//! Pages update asynchronously after a form submit, so assertions against
//! the DOM are retried until they pass or a deadline is exceeded.

use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::error::E2eResult;

/// Default upper bound on how long a wait keeps retrying
pub const MAX_WAIT: Duration = Duration::from_secs(10);

/// Default pause between attempts
pub const POLL_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitConfig {
    pub max_wait: Duration,
    pub poll_interval: Duration,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            max_wait: MAX_WAIT,
            poll_interval: POLL_INTERVAL,
        }
    }
}

/// Run `check` until it succeeds or `config.max_wait` has elapsed.
///
/// Transient errors (see [`crate::E2eError::is_transient`]) are retried after
/// `poll_interval`. Once the deadline has passed the last error is returned
/// as-is. Any other error is returned immediately.
pub async fn wait_until<T, F, Fut>(config: &WaitConfig, what: &str, mut check: F) -> E2eResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = E2eResult<T>>,
{
    let start = Instant::now();
    let mut attempts = 0usize;

    loop {
        attempts += 1;
        match check().await {
            Ok(value) => {
                if attempts > 1 {
                    debug!("{} succeeded after {} attempts", what, attempts);
                }
                return Ok(value);
            }
            Err(e) if e.is_transient() => {
                if start.elapsed() > config.max_wait {
                    debug!(
                        "Giving up on {} after {} attempts ({:?})",
                        what,
                        attempts,
                        start.elapsed()
                    );
                    return Err(e);
                }
                sleep(config.poll_interval).await;
            }
            Err(e) => return Err(e),
        }
    }
}
