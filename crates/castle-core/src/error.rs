use thiserror::Error;

/// Transient failures of the optional external data feeds.
///
/// None of these are fatal: callers keep their last good value or fall back
/// to a neutral default.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AdapterError {
    #[error("http status {0}")]
    Status(u16),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("no address fields found")]
    NoPlaceName,
    #[error("geolocation permission denied")]
    Denied,
    #[error("geolocation timed out")]
    Timeout,
    #[error("geolocation unavailable")]
    Unavailable,
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<serde_json::Error> for AdapterError {
    fn from(e: serde_json::Error) -> Self {
        AdapterError::Malformed(e.to_string())
    }
}
