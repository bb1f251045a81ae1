use std::time::Duration;
use thiserror::Error;

/// Custom error types for the bot detection service.
///
/// Every variant here is a startup or wiring failure. Per-request signal
/// failures are [`SignalError`] and never leave the classifier.
#[derive(Error, Debug)]
pub enum BotError {
    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Settings that parsed but cannot be used
    #[error("Invalid setting `{key}`: {reason}")]
    InvalidSetting { key: &'static str, reason: String },

    /// The offline geolocation database could not be opened
    #[error("GeoIP database error: {0}")]
    GeoDatabase(#[from] maxminddb::MaxMindDBError),

    /// A configured user-agent pattern failed to compile
    #[error("Invalid user-agent pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// HTTP client construction errors
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Logging could not be initialized
    #[error("Logging initialization error: {0}")]
    Logging(#[from] tracing::subscriber::SetGlobalDefaultError),

    /// Metrics exporter could not be installed
    #[error("Metrics exporter error: {0}")]
    Metrics(String),

    /// Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for bot detection service operations
pub type BotResult<T> = Result<T, BotError>;

impl From<std::io::Error> for BotError {
    fn from(err: std::io::Error) -> Self {
        BotError::Internal(err.to_string())
    }
}

/// Why a single signal source could not produce a value.
///
/// All variants are folded into "signal unavailable" by the classifier.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignalError {
    /// The lookup did not finish within the configured bound
    #[error("lookup timed out after {0:?}")]
    Timeout(Duration),

    /// The client identity is not an IP address
    #[error("not an IP address: {0:?}")]
    InvalidAddress(String),

    /// The source has no record for this address
    #[error("no record for {0}")]
    NotFound(String),

    /// The source answered but the answer could not be used
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The source could not be reached or reported a failure
    #[error("lookup failed: {0}")]
    Lookup(String),

    /// The source is not configured
    #[error("signal source disabled")]
    Disabled,
}

/// Result type for a single signal lookup
pub type SignalResult<T> = Result<T, SignalError>;

impl From<reqwest::Error> for SignalError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            SignalError::MalformedResponse(err.to_string())
        } else {
            SignalError::Lookup(err.to_string())
        }
    }
}
