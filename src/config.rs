// Client configuration. Values come from the environment with fallbacks that
// match a locally running service, mirroring how the binary is usually run
// during development (`primes-cli` next to a server on port 8000).

use crate::error::ConfigError;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(300);
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(2);

const ENV_BASE_URL: &str = "PRIMES_API_URL";
const ENV_TIMEOUT: &str = "PRIMES_HTTP_TIMEOUT_SECS";

/// Connection settings for `PrimesClient`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    /// Applied to every single HTTP call, independent of any polling budget.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            base_url: DEFAULT_BASE_URL.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// Read `PRIMES_API_URL` and `PRIMES_HTTP_TIMEOUT_SECS`, falling back to
    /// the defaults for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let mut config = ClientConfig::default();
        if let Some(url) = lookup(ENV_BASE_URL) {
            config.base_url = url;
        }
        if let Some(raw) = lookup(ENV_TIMEOUT) {
            let secs: u64 = raw
                .trim()
                .parse()
                .ok()
                .filter(|s| *s > 0)
                .ok_or(ConfigError::Env { var: ENV_TIMEOUT, value: raw })?;
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Time budget for waiting on a generation job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub max_wait: Duration,
    pub interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        PollPolicy {
            max_wait: DEFAULT_MAX_WAIT,
            interval: DEFAULT_INTERVAL,
        }
    }
}

impl PollPolicy {
    pub fn new(max_wait: Duration, interval: Duration) -> Self {
        PollPolicy { max_wait, interval }
    }

    pub fn with_max_wait_secs(mut self, secs: u64) -> Self {
        self.max_wait = Duration::from_secs(secs);
        self
    }

    /// Upper bound on status calls: `ceil(max_wait / interval) + 1`.
    pub fn max_polls(&self) -> u64 {
        let interval = self.interval.as_nanos().max(1);
        let rounds = self.max_wait.as_nanos().div_ceil(interval);
        u64::try_from(rounds).unwrap_or(u64::MAX).saturating_add(1)
    }
}
