//! Probe configuration, built once from the command line and passed explicitly.

use std::fmt;
use std::time::Duration;

use plantpro::ThresholdPolicy;

use crate::error::{ProbeError, ProbeResult};

pub const DEFAULT_PORT: u16 = 80;
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_ENCODING: &str = "utf-8";
pub const DEFAULT_USER: &str = "monitoring";
pub const DEFAULT_ATTEMPTS: u32 = 3;
pub const DEFAULT_BACKOFF_SECS: u64 = 3;

/// Environment variable consulted for the password when none is given.
pub const PASSWORD_ENV: &str = "PLANTPRO_PASSWORD";

/// Login credentials for the controller's web UI.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            user: DEFAULT_USER.to_string(),
            password: String::new(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// How often a whole run is attempted and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_ATTEMPTS,
            backoff: Duration::from_secs(DEFAULT_BACKOFF_SECS),
        }
    }
}

/// Everything one probe run needs.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    pub host: String,
    pub port: u16,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Encoding label used to decode response bodies.
    pub encoding: String,
    pub credentials: Credentials,
    pub policy: ThresholdPolicy,
    pub retry: RetryPolicy,
    /// Upper bound on sensor pages; `None` keeps paging until a page adds nothing.
    pub max_pages: Option<u32>,
}

impl ProbeConfig {
    /// A configuration with defaults for everything but the host.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            encoding: DEFAULT_ENCODING.to_string(),
            credentials: Credentials::default(),
            policy: ThresholdPolicy::default(),
            retry: RetryPolicy::default(),
            max_pages: None,
        }
    }

    /// `http://<host>:<port>` without a trailing slash.
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// Reject settings that can never produce a successful run.
    pub fn validate(&self) -> ProbeResult<()> {
        if self.host.trim().is_empty() {
            return Err(ProbeError::Config("host must not be empty".to_string()));
        }
        if self.timeout.is_zero() {
            return Err(ProbeError::Config("timeout must be positive".to_string()));
        }
        if self.retry.attempts == 0 {
            return Err(ProbeError::Config("retries must be at least 1".to_string()));
        }
        if self.max_pages == Some(0) {
            return Err(ProbeError::Config("max pages must be at least 1".to_string()));
        }
        if self.encoding.trim().is_empty() {
            return Err(ProbeError::Config("encoding must not be empty".to_string()));
        }
        Ok(())
    }
}
