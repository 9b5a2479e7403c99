//! Core runtime for pageturn: query definitions, cursor codec, cache boundary,
//! the cursor-cached `PagedQuery` facade and `PageLinks` navigation.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod cache;
pub mod config;
pub mod cursor;
pub mod error;
pub mod key;
pub mod links;
pub mod obs;
pub mod paging;
pub mod query;
pub mod serialize;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_support;

///
/// CONSTANTS
///

/// Default number of results counted before `page_count` stops scanning.
///
/// Providers are free to report an approximate count beyond this cap; page
/// counts derived from it are bounded accordingly.
pub const DEFAULT_COUNT_LIMIT: u32 = 1000;

/// Default cache namespace used to build paging cache keys.
pub const DEFAULT_NAMESPACE: &str = "pageturn";

///
/// Prelude
///
/// Prelude contains only paging vocabulary.
/// No errors, caches, or serializers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        cursor::Cursor,
        key::{EntityKey, KeyId},
        links::{PageLink, PageLinks},
        paging::PagedQuery,
        query::{CompareOp, FilterClause, OrderClause, OrderDirection, QueryProvider},
        value::Value,
    };
}
