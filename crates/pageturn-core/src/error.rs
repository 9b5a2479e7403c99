use crate::{
    cache::CacheError, config::ConfigError, paging::PagingError,
    query::QueryError, serialize::SerializeError,
};
use std::fmt;
use thiserror::Error as ThisError;

///
/// InternalError
///
/// Structured runtime error with a stable internal classification.
/// Not a stable API; intended for internal use and may change without notice.
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct InternalError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl InternalError {
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
        }
    }

    /// Construct a paging-origin usage error.
    pub(crate) fn paging_usage(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Usage, ErrorOrigin::Paging, message)
    }

    /// Construct a query-origin usage error.
    pub(crate) fn query_usage(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Usage, ErrorOrigin::Query, message)
    }

    /// Construct a query-origin unsupported error.
    pub(crate) fn query_unsupported(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Unsupported, ErrorOrigin::Query, message)
    }

    /// Construct a provider-origin internal error.
    pub(crate) fn provider_internal(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Internal, ErrorOrigin::Provider, message)
    }

    /// Construct a serialize-origin corruption error.
    pub(crate) fn serialize_corruption(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Corruption, ErrorOrigin::Serialize, message)
    }

    #[must_use]
    pub const fn is_usage(&self) -> bool {
        matches!(self.class, ErrorClass::Usage)
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.message)
    }
}

impl From<PagingError> for InternalError {
    fn from(err: PagingError) -> Self {
        match err {
            PagingError::InvalidPageSize { .. } | PagingError::InvalidPageNumber { .. } => {
                Self::paging_usage(err.to_string())
            }
            PagingError::Config(inner) => inner.into(),
            PagingError::Query(inner) => inner.into(),
        }
    }
}

impl From<QueryError> for InternalError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::Unsupported { .. } => Self::query_unsupported(err.to_string()),
            QueryError::InvalidFilter { .. } | QueryError::InvalidOrder { .. } => {
                Self::query_usage(err.to_string())
            }
            QueryError::Provider { .. } => Self::provider_internal(err.to_string()),
        }
    }
}

impl From<CacheError> for InternalError {
    fn from(err: CacheError) -> Self {
        let class = match err {
            CacheError::Unavailable { .. } => ErrorClass::Unavailable,
            CacheError::Rejected { .. } => ErrorClass::Internal,
        };

        Self::new(class, ErrorOrigin::Cache, err.to_string())
    }
}

impl From<SerializeError> for InternalError {
    fn from(err: SerializeError) -> Self {
        match err {
            SerializeError::Serialize(_) => {
                Self::new(ErrorClass::Internal, ErrorOrigin::Serialize, err.to_string())
            }
            SerializeError::Deserialize(_) | SerializeError::DeserializeSizeLimitExceeded { .. } => {
                Self::serialize_corruption(err.to_string())
            }
        }
    }
}

impl From<ConfigError> for InternalError {
    fn from(err: ConfigError) -> Self {
        Self::new(ErrorClass::Usage, ErrorOrigin::Config, err.to_string())
    }
}

///
/// ErrorClass
/// Internal error taxonomy for runtime classification.
/// Not a stable API; may change without notice.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    Usage,
    Unsupported,
    Unavailable,
    Corruption,
    Internal,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Usage => "usage",
            Self::Unsupported => "unsupported",
            Self::Unavailable => "unavailable",
            Self::Corruption => "corruption",
            Self::Internal => "internal",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Internal origin taxonomy for runtime classification.
/// Not a stable API; may change without notice.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Paging,
    Query,
    Provider,
    Cache,
    Serialize,
    Config,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Paging => "paging",
            Self::Query => "query",
            Self::Provider => "provider",
            Self::Cache => "cache",
            Self::Serialize => "serialize",
            Self::Config => "config",
        };
        write!(f, "{label}")
    }
}

///
/// TESTS
///
