use reqwest::Client;
use std::time::Duration;

/// Default per-request timeout for kHealth and notify calls.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

pub fn build_client_with_timeout(timeout_secs: u64) -> Client {
    let timeout = Duration::from_secs(timeout_secs.max(1));
    Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(DEFAULT_TIMEOUT_SECS)))
        .pool_max_idle_per_host(4)
        .pool_idle_timeout(Duration::from_secs(90))
        .user_agent(concat!("khealth-bridge/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_else(|_| Client::new())
}
