//! Module: cache
//! Responsibility: the external key/value cache boundary used to persist
//! paging state between requests.
//! Does not own: payload format (see `paging::persist`) or retry policy.
//! Boundary: every call may fail fast; callers treat failure as a miss.

mod memory;

use thiserror::Error as ThisError;

// re-exports
pub use memory::MemoryCache;

///
/// CacheError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum CacheError {
    /// The cache service could not be reached or timed out.
    #[error("cache unavailable: {message}")]
    Unavailable { message: String },

    /// The cache service refused the operation (value too large, evicted, ...).
    #[error("cache rejected operation: {message}")]
    Rejected { message: String },
}

impl CacheError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }
}

///
/// CacheClient
///
/// Opaque key/value store shared by every request.
/// Writes are last-writer-wins; no transactional guarantee is expected.
///

pub trait CacheClient: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    fn set(&self, key: &str, value: Vec<u8>) -> Result<(), CacheError>;

    fn delete(&self, key: &str) -> Result<(), CacheError>;
}

///
/// CacheOp
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CacheOp {
    Get,
    Set,
    Delete,
}

impl CacheOp {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Set => "set",
            Self::Delete => "delete",
        }
    }
}
