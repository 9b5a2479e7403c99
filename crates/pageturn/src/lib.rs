//! pageturn: cursor-cached pagination over ordered query results.
//!
//! This is the public meta-crate. Downstream users depend on **pageturn** only.
//!
//! ## Crate layout
//! - `core`: runtime values, query definitions, cursors, cache boundary,
//!   `PagedQuery` and `PageLinks`.
//! - `error`: stable public error taxonomy.
//!
//! The `prelude` module mirrors the paging surface used by request handlers.

pub use pageturn_core as core;

pub mod error;

use std::path::Path;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use error::{Error, ErrorKind, ErrorOrigin};

/// Load paging settings from the `[paging]` table of a TOML file.
pub fn load_config(path: impl AsRef<Path>) -> Result<core::config::PagingConfig, Error> {
    Ok(core::config::PagingConfig::from_path(path)?)
}

/// Parse paging settings from TOML source.
pub fn parse_config(source: &str) -> Result<core::config::PagingConfig, Error> {
    Ok(core::config::PagingConfig::from_toml_str(source)?)
}

///
/// Prelude
///

pub mod prelude {
    pub use crate::core::{
        cache::{CacheClient, MemoryCache},
        config::PagingConfig,
        prelude::*,
    };
    pub use crate::error::Error;
}

///
/// TESTS
///
