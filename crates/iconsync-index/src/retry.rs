//! Bounded retry for rate-limited service calls

use std::time::Duration;

use crate::error::ServiceError;

/// Default pause before retrying a rate-limited call
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Retries a call exactly once, after a fixed delay, when the service
/// answers with a rate-limit error.
///
/// The policy holds no state between calls; every wrapped call gets its
/// own single retry.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_RETRY_DELAY)
    }
}

impl RetryPolicy {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Runs `op`, retrying once if the first attempt was rate limited.
    ///
    /// Any other error, or a second rate-limit error, is returned as is.
    pub fn call<T, F>(&self, mut op: F) -> Result<T, ServiceError>
    where
        F: FnMut() -> Result<T, ServiceError>,
    {
        match op() {
            Err(err) if err.is_rate_limited() => {
                log::debug!("Rate limited, retrying in {:?}", self.delay);
                std::thread::sleep(self.delay);
                op()
            }
            other => other,
        }
    }
}
