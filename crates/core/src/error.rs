//! Unified error types for cachet.

use tokio_rusqlite::rusqlite;

/// Unified error types for the cachet worker.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Store operation failed.
    #[error("STORE_ERROR: {0}")]
    Store(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("STORE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// A URL could not be parsed or resolved against the origin.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// HTTP-level failure talking to the network.
    #[error("HTTP_ERROR: {0}")]
    HttpError(String),

    /// The network was unreachable (offline, DNS failure, timeout).
    #[error("NETWORK_UNREACHABLE: {0}")]
    NetworkUnreachable(String),

    /// An install-time preload fetch failed. Fatal to install.
    #[error("PRELOAD_FAILED: {path}: {reason}")]
    PreloadFailed { path: String, reason: String },

    /// A body that was expected to be JSON could not be parsed.
    #[error("INVALID_PAYLOAD: {0}")]
    InvalidPayload(String),
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Store(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Store(tokio_rusqlite::Error::Close(c)),
            _ => Error::Store(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Store(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Store(tokio_rusqlite::Error::Error(err))
    }
}
