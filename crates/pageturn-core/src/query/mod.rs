//! Module: query
//! Responsibility: the ordered-query provider boundary and the query
//! definition vocabulary that identifies a query across requests.
//! Does not own: query execution (providers do) or paging state.

mod definition;
mod fingerprint;

use crate::{cursor::Cursor, key::EntityKey};
use thiserror::Error as ThisError;

// re-exports
pub use definition::{
    CompareOp, ComposedQuery, FilterClause, OrderClause, OrderDirection, QueryDefinition,
    RawStatement,
};
pub use fingerprint::QueryId;

///
/// QueryError
///

#[derive(Debug, Eq, PartialEq, ThisError)]
pub enum QueryError {
    #[error("operation '{operation}' is not supported by {query}")]
    Unsupported {
        operation: &'static str,
        query: String,
    },

    #[error("invalid filter expression '{expr}': {reason}")]
    InvalidFilter { expr: String, reason: &'static str },

    #[error("invalid order expression '{expr}'")]
    InvalidOrder { expr: String },

    #[error("query provider failed: {message}")]
    Provider { message: String },
}

impl QueryError {
    pub(crate) fn unsupported(operation: &'static str, definition: &QueryDefinition) -> Self {
        Self::Unsupported {
            operation,
            query: definition.label(),
        }
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider {
            message: message.into(),
        }
    }
}

///
/// QueryProvider
///
/// Ordered-query collaborator wrapped by `PagedQuery`.
///
/// A provider holds at most one pinned cursor. `cursor()` is only meaningful
/// immediately after a `fetch`; `with_cursor(None)` unpins it.
///
/// The composable mutators default to `QueryError::Unsupported`, which is the
/// right behavior for providers built from a pre-built statement.
///

pub trait QueryProvider {
    type Row;

    /// Fetch up to `limit` rows, skipping `offset` rows past the pinned cursor
    /// (or past the start when no cursor is pinned).
    fn fetch(&mut self, limit: u32, offset: u64) -> Result<Vec<Self::Row>, QueryError>;

    /// Count matching rows, scanning at most `limit` of them.
    fn count(&mut self, limit: u32) -> Result<u32, QueryError>;

    /// Resume position just past the last row returned by `fetch`.
    fn cursor(&self) -> Option<Cursor>;

    /// Pin (or with `None`, unpin) the position the next `fetch` starts from.
    fn with_cursor(&mut self, cursor: Option<Cursor>);

    /// Deterministic description of this query, used to derive its identity.
    fn definition(&self) -> QueryDefinition;

    fn filter(&mut self, _clause: FilterClause) -> Result<(), QueryError> {
        Err(QueryError::unsupported("filter", &self.definition()))
    }

    fn order(&mut self, _clause: OrderClause) -> Result<(), QueryError> {
        Err(QueryError::unsupported("order", &self.definition()))
    }

    fn ancestor(&mut self, _key: EntityKey) -> Result<(), QueryError> {
        Err(QueryError::unsupported("ancestor", &self.definition()))
    }
}
