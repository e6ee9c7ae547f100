//! Error types shared by the controllers and the transport.
//!
//! Chat failures have no variant here: a failed chat turn is reported
//! as [`crate::chat::TurnOutcome::Degraded`], never as an error.

use thiserror::Error;

/// Failure of a single network round trip.
///
/// Each variant carries enough context to diagnose the failure without
/// needing to inspect the originating error directly.
#[derive(Debug, Error)]
pub enum TransportError {
    /// A TCP-level connection could not be established, or the request
    /// could not be sent.
    #[error("Connection failed to {url}: {detail}")]
    Connect { url: String, detail: String },
    /// The remote server replied with a non-2xx HTTP status code.
    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },
    /// Response body could not be parsed as the expected JSON structure.
    #[error("JSON parse error on field '{field}': {detail}")]
    Json { field: String, detail: String },
}

/// Failures of a quiz operation.
#[derive(Debug, Error)]
pub enum QuizError {
    /// Required input was missing or blank. No network call was made.
    #[error("{0}")]
    Validation(String),
    /// A submission is already in flight for this question.
    #[error("a submission is already in progress")]
    Busy,
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl QuizError {
    pub fn is_validation(&self) -> bool {
        matches!(self, QuizError::Validation(_))
    }
}

/// Failures while loading [`crate::config::PortalConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid TOML in config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}
