use derive_more::Display;
use pageturn_core::{
    config::ConfigError,
    error::{ErrorClass, ErrorOrigin as CoreErrorOrigin, InternalError},
    paging::PagingError,
    query::QueryError,
};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// Error
/// Public error type with a stable kind + origin taxonomy.
///

#[derive(Debug, Deserialize, Serialize, ThisError)]
#[error("{message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            kind,
            origin,
            message: message.into(),
        }
    }
}

impl From<InternalError> for Error {
    fn from(err: InternalError) -> Self {
        Self::new(err.class.into(), err.origin.into(), err.message)
    }
}

impl From<PagingError> for Error {
    fn from(err: PagingError) -> Self {
        InternalError::from(err).into()
    }
}

impl From<QueryError> for Error {
    fn from(err: QueryError) -> Self {
        InternalError::from(err).into()
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        InternalError::from(err).into()
    }
}

///
/// ErrorKind
/// Public error taxonomy for callers.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ErrorKind {
    /// Invalid input from the caller (page number, page size, expressions).
    Usage,

    /// The query cannot perform the requested operation.
    Unsupported,

    /// A collaborator could not be reached.
    Unavailable,

    /// The caller cannot remediate this.
    Internal,
}

impl From<ErrorClass> for ErrorKind {
    fn from(class: ErrorClass) -> Self {
        match class {
            ErrorClass::Usage => Self::Usage,
            ErrorClass::Unsupported => Self::Unsupported,
            ErrorClass::Unavailable => Self::Unavailable,
            ErrorClass::Corruption | ErrorClass::Internal => Self::Internal,
        }
    }
}

///
/// ErrorOrigin
/// Public origin taxonomy for callers.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum ErrorOrigin {
    Paging,
    Query,
    Provider,
    Cache,
    Serialize,
    Config,
}

impl From<CoreErrorOrigin> for ErrorOrigin {
    fn from(origin: CoreErrorOrigin) -> Self {
        match origin {
            CoreErrorOrigin::Paging => Self::Paging,
            CoreErrorOrigin::Query => Self::Query,
            CoreErrorOrigin::Provider => Self::Provider,
            CoreErrorOrigin::Cache => Self::Cache,
            CoreErrorOrigin::Serialize => Self::Serialize,
            CoreErrorOrigin::Config => Self::Config,
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::{Error, ErrorKind, ErrorOrigin};
    use pageturn_core::{paging::PagingError, query::QueryError};

    #[test]
    fn invalid_page_number_is_a_paging_usage_error() {
        let err: Error = PagingError::InvalidPageNumber { page: 0 }.into();

        assert_eq!(err.kind, ErrorKind::Usage);
        assert_eq!(err.origin, ErrorOrigin::Paging);
        assert_eq!(err.to_string(), "page number must be positive, got 0");
    }

    #[test]
    fn provider_failure_is_internal() {
        let err: Error = PagingError::Query(QueryError::provider("timeout")).into();

        assert_eq!(err.kind, ErrorKind::Internal);
        assert_eq!(err.origin, ErrorOrigin::Provider);
    }

    #[test]
    fn error_serializes_with_kind_and_origin() {
        let err = Error::new(ErrorKind::Unsupported, ErrorOrigin::Query, "no filter");

        let json = serde_json::to_value(&err).expect("error should serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "kind": "Unsupported",
                "origin": "Query",
                "message": "no filter",
            })
        );
    }
}
