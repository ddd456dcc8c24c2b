use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::errors::ServiceError;

/// Bounded exponential backoff for idempotent reads.
///
/// Writes never go through this: replaying a replace could duplicate rows.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_retries: u32,
    backoff_base: Duration,
    backoff_max: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, backoff_base: Duration, backoff_max: Duration) -> Self {
        Self { max_retries, backoff_base, backoff_max }
    }

    pub fn disabled() -> Self {
        Self::new(0, Duration::ZERO, Duration::ZERO)
    }

    pub fn from_config(cfg: &configs::StoreConfig) -> Self {
        Self::new(cfg.read_retries, cfg.retry_backoff(), cfg.retry_backoff_max())
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Delay before retry number `attempt` (1-based).
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let factor = 2_u32.saturating_pow(attempt - 1);
        self.backoff_base.saturating_mul(factor).min(self.backoff_max)
    }

    pub fn should_retry(&self, attempt: u32, error: &ServiceError) -> bool {
        if attempt >= self.max_retries {
            return false;
        }
        error.is_transient()
    }

    /// Run `f` until it succeeds, fails permanently, or the retry budget is spent.
    pub async fn run<T, F, Fut>(&self, op: &'static str, mut f: F) -> Result<T, ServiceError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ServiceError>>,
    {
        let mut attempt = 0;
        loop {
            match f().await {
                Ok(v) => return Ok(v),
                Err(e) if self.should_retry(attempt, &e) => {
                    attempt += 1;
                    let wait = self.backoff_for(attempt);
                    warn!(op, attempt, error = %e, "transient store fault, retrying");
                    debug!(op, ?wait, "backing off");
                    sleep(wait).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&configs::StoreConfig::default())
    }
}
