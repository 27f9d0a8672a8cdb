use std::error::Error as StdError;
use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Could not open a connection; the only condition that is retried.
    #[error("connection refused: {0}")]
    ConnectionRefused(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("API error (status {status}): {body}")]
    Http { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(String),

    /// Shutdown was requested while waiting to retry.
    #[error("retry interrupted by shutdown")]
    Cancelled,
}

impl ApiError {
    pub fn is_connection_refused(&self) -> bool {
        matches!(self, ApiError::ConnectionRefused(_))
    }

    /// Classify a reqwest failure.
    pub fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            ApiError::Timeout(timeout)
        } else if err.is_connect() || has_refused_cause(&err) {
            ApiError::ConnectionRefused(describe(&err))
        } else {
            ApiError::Transport(describe(&err))
        }
    }
}

/// Walk the source chain looking for an I/O connection refusal.
pub fn has_refused_cause(err: &(dyn StdError + 'static)) -> bool {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(e) = current {
        if let Some(io) = e.downcast_ref::<std::io::Error>() {
            if io.kind() == std::io::ErrorKind::ConnectionRefused {
                return true;
            }
        }
        current = e.source();
    }
    false
}

/// The error and its causes on one line.
fn describe(err: &(dyn StdError + 'static)) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(e) = source {
        out.push_str(": ");
        out.push_str(&e.to_string());
        source = e.source();
    }
    out
}
