//! Error types for the tilecrawl library.
//!
//! Per-tile failures (404s, transport errors, write errors) are logged and
//! swallowed inside the discovery engine; only setup failures around the
//! output directory and index file escape to the caller.

use std::fmt;

/// Main error type for tilecrawl operations
#[derive(Debug)]
pub enum Error {
    /// The server answered 404 for a tile; the coordinate does not exist
    TileMissing(String),

    /// Non-2xx response other than 404, or an HTTP protocol failure
    HttpError(String),

    /// Network connectivity issues (connect failures, timeouts)
    NetworkError(String),

    /// File I/O error
    IoError(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::TileMissing(name) => {
                write!(f, "tile {} does not exist (404)", name)
            }
            Error::HttpError(msg) => {
                write!(f, "HTTP error: {}", msg)
            }
            Error::NetworkError(msg) => {
                write!(f, "Network error: {}", msg)
            }
            Error::IoError(err) => {
                write!(f, "I/O error: {}", err)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            Error::NetworkError(err.to_string())
        } else {
            Error::HttpError(err.to_string())
        }
    }
}

/// Convenience result type for tilecrawl operations
pub type Result<T> = std::result::Result<T, Error>;
