//! Failure taxonomy for API calls

use std::error::Error as StdError;
use std::io;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when calling the trade statistics API
#[derive(Debug, Error)]
pub enum FetchError {
    /// Server answered with a non-2xx status
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Response body is not the expected JSON
    #[error("Failed to parse JSON response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Call did not finish within its deadline
    #[error("Request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// No connectivity: flagged up front, or the host could not be resolved
    /// or routed to
    #[error("Network unavailable: {0}")]
    Offline(String),

    /// Any other transport failure, including a server refusing the connection
    #[error("Request failed: {0}")]
    Network(String),
}

impl FetchError {
    /// Classifies a transport error raised by reqwest
    pub(crate) fn from_transport(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            FetchError::Timeout(timeout)
        } else if err.is_connect()
            && io_error_kind(&err) != Some(io::ErrorKind::ConnectionRefused)
        {
            FetchError::Offline(err.to_string())
        } else {
            FetchError::Network(err.to_string())
        }
    }

    /// Short label used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Http { .. } => "http",
            FetchError::Parse(_) => "parse",
            FetchError::Timeout(_) => "timeout",
            FetchError::Offline(_) => "offline",
            FetchError::Network(_) => "network",
        }
    }

    /// Message suitable for a notification shown to an end user
    pub fn user_message(&self) -> String {
        match self {
            FetchError::Offline(_) => {
                "You appear to be offline. Check your connection and try again.".to_string()
            }
            FetchError::Timeout(_) => {
                "The server took too long to respond. Please try again.".to_string()
            }
            FetchError::Http { status, .. } if *status >= 500 => {
                format!("The trade data service is unavailable (HTTP {}).", status)
            }
            FetchError::Http { status, .. } => {
                format!("The request was rejected (HTTP {}).", status)
            }
            FetchError::Parse(_) => "Received unreadable data from the server.".to_string(),
            FetchError::Network(_) => {
                "Could not reach the trade data service. Please try again.".to_string()
            }
        }
    }
}

/// Kind of the first I/O error in the source chain
fn io_error_kind(err: &(dyn StdError + 'static)) -> Option<io::ErrorKind> {
    let mut source = err.source();
    while let Some(cause) = source {
        if let Some(io_err) = cause.downcast_ref::<io::Error>() {
            return Some(io_err.kind());
        }
        source = cause.source();
    }
    None
}
