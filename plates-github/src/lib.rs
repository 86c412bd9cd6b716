//! # Plates GitHub
//!
//! GitHub contents API backend for the plates record store.

#![warn(missing_docs)]

// Re-export core types for convenience
pub use plates_core::backend::FileBackend;
pub use plates_core::config::StoreConfig;
pub use plates_core::error::{Error, Result};

pub mod github;

pub use github::GitHub;

/// User agent sent with every request (GitHub rejects requests without one)
pub const USER_AGENT: &str = concat!("plates/", env!("CARGO_PKG_VERSION"));

/// HTTP client configuration
#[derive(Clone)]
pub struct HttpConfig {
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Connection pool idle timeout
    pub pool_idle_timeout_secs: u64,
    /// Max idle connections per host
    pub pool_max_idle_per_host: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            pool_idle_timeout_secs: 90,
            pool_max_idle_per_host: 16,
        }
    }
}

impl HttpConfig {
    /// Override the per-request timeout (minimum one second)
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs.max(1);
        self
    }

    /// Build a reqwest client
    pub fn build_client(&self) -> Result<reqwest::Client> {
        use std::time::Duration;

        reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(self.timeout_secs))
            .pool_idle_timeout(Duration::from_secs(self.pool_idle_timeout_secs))
            .pool_max_idle_per_host(self.pool_max_idle_per_host)
            .build()
            .map_err(|e| Error::Internal(e.to_string()))
    }
}
