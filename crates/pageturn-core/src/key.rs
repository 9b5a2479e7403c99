use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::fmt;

///
/// KeyId
///
/// Identifier of one entity within its kind: numeric id or string name.
///

#[derive(Clone, Debug, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum KeyId {
    #[display("{_0}")]
    Id(u64),
    #[display("'{_0}'")]
    Name(String),
}

impl From<u64> for KeyId {
    fn from(id: u64) -> Self {
        Self::Id(id)
    }
}

impl From<&str> for KeyId {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

///
/// KeySegment
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct KeySegment {
    pub kind: String,
    pub id: KeyId,
}

///
/// EntityKey
///
/// Hierarchical entity key: a path of `(kind, id)` segments from the root
/// entity down to the keyed entity. Used for ancestor filters.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct EntityKey {
    path: Vec<KeySegment>,
}

impl EntityKey {
    /// Build a root-level key.
    #[must_use]
    pub fn root(kind: impl Into<String>, id: impl Into<KeyId>) -> Self {
        Self::default().child(kind, id)
    }

    /// Extend this key with one child segment.
    #[must_use]
    pub fn child(mut self, kind: impl Into<String>, id: impl Into<KeyId>) -> Self {
        self.path.push(KeySegment {
            kind: kind.into(),
            id: id.into(),
        });
        self
    }

    #[must_use]
    pub fn path(&self) -> &[KeySegment] {
        &self.path
    }

    /// Kind of the keyed (last) segment.
    #[must_use]
    pub fn kind(&self) -> Option<&str> {
        self.path.last().map(|segment| segment.kind.as_str())
    }

    /// Return whether `self` is an ancestor of `other`.
    ///
    /// An entity counts as its own ancestor, so equal keys match.
    #[must_use]
    pub fn is_ancestor_of(&self, other: &Self) -> bool {
        !self.path.is_empty() && other.path.starts_with(&self.path)
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, segment) in self.path.iter().enumerate() {
            if idx > 0 {
                f.write_str("/")?;
            }
            write!(f, "{}:{}", segment.kind, segment.id)?;
        }

        Ok(())
    }
}

///
/// TESTS
///
