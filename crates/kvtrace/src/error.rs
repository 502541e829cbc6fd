//! Error types for kvtrace

use std::fmt;

/// Result type alias for kvtrace operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for cache operations
#[derive(Debug)]
pub enum Error {
    /// The backing store could not be reached
    StoreUnavailable(String),

    /// The backing store rejected the operation (e.g. WRONGTYPE)
    Backend(String),

    /// A stored payload could not be decoded by a built-in transform
    Parse(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::StoreUnavailable(msg) => write!(f, "store unavailable: {}", msg),
            Error::Backend(msg) => write!(f, "store error: {}", msg),
            Error::Parse(msg) => write!(f, "parse error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl From<redis::RedisError> for Error {
    fn from(err: redis::RedisError) -> Self {
        if err.is_io_error() || err.is_connection_refusal() || err.is_timeout() {
            Error::StoreUnavailable(err.to_string())
        } else {
            Error::Backend(err.to_string())
        }
    }
}
