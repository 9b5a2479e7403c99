//! Module: paging::persist
//! Responsibility: the versioned cache payload of a cursor table and the
//! restore lookup that classifies what the cache returned.
//! Does not own: when to persist or restore (`PagedQuery` decides).
//! Boundary: cache errors and malformed payloads never escape this module
//! as errors; they collapse into `CacheLookup`.

use crate::{
    cache::CacheClient,
    paging::table::{CursorTable, PageMarker},
    serialize::{self, SerializeError},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error as ThisError;
use tracing::{debug, warn};

const SNAPSHOT_VERSION: u8 = 1;

///
/// CursorSnapshot
///
/// Everything `PagedQuery` shares across requests for one query identity.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct CursorSnapshot {
    pub(crate) table: CursorTable,
    pub(crate) page_count: Option<u32>,
}

#[derive(Deserialize, Serialize)]
struct SnapshotWire {
    version: u8,
    page_cursors: BTreeMap<u32, PageMarker>,
    page_count: Option<u32>,
}

///
/// SnapshotDecodeError
///

#[derive(Debug, ThisError)]
pub(crate) enum SnapshotDecodeError {
    #[error(transparent)]
    Serialize(#[from] SerializeError),

    #[error("unsupported snapshot version {found}")]
    UnsupportedVersion { found: u8 },

    #[error("invalid marker for page {page}")]
    InvalidMarker { page: u32 },
}

impl CursorSnapshot {
    pub(crate) fn encode(&self) -> Result<Vec<u8>, SerializeError> {
        let wire = SnapshotWire {
            version: SNAPSHOT_VERSION,
            page_cursors: self.table.clone().into_markers(),
            page_count: self.page_count,
        };

        serialize::serialize(&wire)
    }

    pub(crate) fn decode(bytes: &[u8], max_bytes: usize) -> Result<Self, SnapshotDecodeError> {
        let wire: SnapshotWire = serialize::deserialize_bounded(bytes, max_bytes)?;
        if wire.version != SNAPSHOT_VERSION {
            return Err(SnapshotDecodeError::UnsupportedVersion {
                found: wire.version,
            });
        }

        let table = CursorTable::from_markers(wire.page_cursors)
            .map_err(|page| SnapshotDecodeError::InvalidMarker { page })?;

        Ok(Self {
            table,
            page_count: wire.page_count,
        })
    }
}

///
/// CacheLookup
///

#[derive(Debug)]
pub(crate) enum CacheLookup {
    Hit(CursorSnapshot),
    Miss,
    Unavailable,
}

/// Read and decode the snapshot stored under `key`.
pub(crate) fn lookup(cache: &dyn CacheClient, key: &str, max_bytes: usize) -> CacheLookup {
    let bytes = match cache.get(key) {
        Ok(Some(bytes)) => bytes,
        Ok(None) => {
            debug!(key, "no paging snapshot cached");
            return CacheLookup::Miss;
        }
        Err(err) => {
            warn!(key, error = %err, "paging cache unavailable on restore");
            return CacheLookup::Unavailable;
        }
    };

    match CursorSnapshot::decode(&bytes, max_bytes) {
        Ok(snapshot) => CacheLookup::Hit(snapshot),
        Err(err) => {
            warn!(key, error = %err, "discarding malformed paging snapshot");
            CacheLookup::Miss
        }
    }
}

///
/// TESTS
///
