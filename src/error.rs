use thiserror::Error;

/// Errors raised by the cache itself.
///
/// Only construction can fail. Misses are reported through return values,
/// never through this type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    #[error("invalid cache configuration {input:?}: {reason}")]
    InvalidConfiguration { input: String, reason: &'static str },
}

impl CacheError {
    pub(crate) fn invalid(input: impl Into<String>, reason: &'static str) -> Self {
        CacheError::InvalidConfiguration {
            input: input.into(),
            reason,
        }
    }
}

/// Failures reported by a [`RemoteStore`](crate::RemoteStore).
///
/// These stop at the [`RemoteCache`](crate::RemoteCache) boundary and are
/// downgraded into misses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    #[error("connection to remote store failed: {0}")]
    Connection(String),
    #[error("remote store protocol error: {0}")]
    Protocol(String),
    #[error("remote store rejected the request: {0}")]
    Rejected(String),
}

pub type Result<T> = std::result::Result<T, CacheError>;
