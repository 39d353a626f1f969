use thiserror::Error;

/// Tappd client error types.
///
/// Every failure of a call is terminal: the client never retries and never
/// returns partial results. Callers that want retry-on-timeout semantics
/// implement them on top.
#[derive(Error, Debug)]
pub enum TappdError {
    /// Connection, read, or write failure on the daemon socket.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The response was not fully received within the configured deadline.
    #[error("Request timed out after {0} ms")]
    Timeout(u64),

    /// The response body did not decode as the expected JSON.
    ///
    /// Never retried: a parse failure indicates a protocol mismatch
    /// between client and daemon, not a transient condition.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// The call was cancelled by the caller.
    #[error("Request aborted")]
    Aborted,

    /// The request payload could not be JSON-encoded.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The endpoint address could not be parsed.
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

impl From<serde_json::Error> for TappdError {
    fn from(err: serde_json::Error) -> Self {
        TappdError::Serialization(err.to_string())
    }
}

/// Result type alias for tappd client operations.
pub type Result<T> = std::result::Result<T, TappdError>;
