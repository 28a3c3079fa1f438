//! Shared HTTP client setup

use std::time::Duration;

/// Default timeout for a single request to any remote service
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub(crate) fn agent(timeout: Duration) -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout(timeout)
        .user_agent(concat!("iconsync/", env!("CARGO_PKG_VERSION")))
        .build()
}
