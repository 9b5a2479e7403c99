//! Module: cursor
//! Responsibility: opaque resume cursor value.
//! Does not own: cursor semantics (those belong to the query provider).
//! Boundary: cursors cross the provider and the cache payload.

use derive_more::Deref;
use serde::{Deserialize, Serialize};

///
/// Cursor
///
/// Opaque resume position produced by a query provider after a fetch.
/// Only the provider that produced it can interpret the bytes.
///

#[derive(Clone, Debug, Deref, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Cursor(#[serde(with = "serde_bytes")] Vec<u8>);

impl Cursor {
    #[must_use]
    pub const fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::Cursor;
    use crate::serialize::{deserialize_bounded, serialize};

    #[test]
    fn cursor_persists_as_a_cbor_byte_string() {
        let cursor = Cursor::from_bytes(vec![0x0a, 0xff, 0x10]);

        let bytes = serialize(&cursor).expect("cursor should serialize");
        assert_eq!(bytes, vec![0x43, 0x0a, 0xff, 0x10]);

        let decoded: Cursor = deserialize_bounded(&bytes, 16).expect("cursor should decode");
        assert_eq!(decoded, cursor);
        assert_eq!(decoded.len(), 3);
    }
}
