//! Failure taxonomy for a probe run.

use plantpro::PlantProError;

/// Broad category of a failure, used to decide whether a retry makes sense.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Transport,
    Auth,
    Parse,
    Config,
}

/// All errors that can occur while probing a controller.
#[derive(thiserror::Error, Debug)]
pub enum ProbeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("POST {url} failed with status {status}")]
    Status { url: String, status: u16 },

    #[error("Login failed: {0}")]
    Auth(String),

    #[error("Parse error: {0}")]
    Parse(#[from] PlantProError),

    #[error("Sensor table still growing after {0} pages")]
    PageLimit(u32),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ProbeError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ProbeError::Http(_) | ProbeError::Status { .. } => FailureKind::Transport,
            ProbeError::Auth(_) => FailureKind::Auth,
            ProbeError::Parse(_) | ProbeError::PageLimit(_) => FailureKind::Parse,
            ProbeError::Config(_) => FailureKind::Config,
        }
    }

    /// Configuration errors repeat identically on every attempt.
    pub fn is_retryable(&self) -> bool {
        self.kind() != FailureKind::Config
    }
}

/// Returned when every attempt of a run failed.
#[derive(thiserror::Error, Debug)]
#[error("Check failed after {attempts} attempt(s): {last}")]
pub struct RetriesExhausted {
    pub attempts: u32,
    pub last: ProbeError,
}

pub type ProbeResult<T> = Result<T, ProbeError>;
