use std::path::PathBuf;

use http::StatusCode;
use thiserror::Error;

/// Error type produced by pluggable transports.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Everything that can go wrong while talking to the admin panel API.
///
/// Callers distinguish failures by message; `Http` displays exactly the
/// message the server supplied (or the generic status message).
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{message}")]
    Http { status: StatusCode, message: String },

    #[error(transparent)]
    Transport(BoxError),

    #[error("failed to parse response body: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("token storage failed: {0}")]
    Storage(#[from] StorageError),

    #[error("stored token cannot be sent as a header value")]
    InvalidToken(#[from] http::header::InvalidHeaderValue),
}

impl ApiError {
    /// HTTP status of the failed response, if the server answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when the server rejected the credentials or the bearer token.
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error at '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("storage file '{}' is not a JSON object of strings: {source}", path.display())]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
