//! Deterministic query identity derived from the query definition.

use crate::{
    key::{EntityKey, KeyId},
    query::{CompareOp, ComposedQuery, OrderDirection, QueryDefinition, RawStatement},
    value::Value,
};
use sha2::{Digest, Sha256};
use std::fmt::{self, Write as _};

// Bump when the encoding below changes; old cache entries become unreachable.
const QUERY_ID_DOMAIN: &[u8] = b"pageturn:query-id:v2";

///
/// QueryId
///
/// Stable, deterministic identity of (query definition, page size).
/// Two equivalent definitions built in the same sequence hash identically,
/// across processes and restarts.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct QueryId([u8; 32]);

impl QueryId {
    #[must_use]
    pub fn compute(definition: &QueryDefinition, page_size: u32) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(QUERY_ID_DOMAIN);

        write_tag(&mut hasher, 0x01);
        hash_definition(&mut hasher, definition);

        write_tag(&mut hasher, 0x02);
        write_u32(&mut hasher, page_size);

        let digest = hasher.finalize();
        let mut out = [0u8; 32];
        out.copy_from_slice(&digest);

        Self(out)
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex digest, as used in cache keys.
    #[must_use]
    pub fn as_hex(&self) -> String {
        self.0.iter().fold(String::with_capacity(64), |mut out, byte| {
            let _ = write!(out, "{byte:02x}");
            out
        })
    }
}

impl fmt::Display for QueryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_hex())
    }
}

fn hash_definition(hasher: &mut Sha256, definition: &QueryDefinition) {
    match definition {
        QueryDefinition::Composed(query) => {
            write_tag(hasher, 0x10);
            hash_composed(hasher, query);
        }
        QueryDefinition::Raw(statement) => {
            write_tag(hasher, 0x11);
            hash_raw(hasher, statement);
        }
    }
}

fn hash_composed(hasher: &mut Sha256, query: &ComposedQuery) {
    write_str(hasher, query.kind());

    write_len(hasher, query.filters().len());
    for filter in query.filters() {
        write_str(hasher, &filter.field);
        write_tag(hasher, compare_op_tag(filter.op));
        write_value(hasher, &filter.value);
    }

    write_len(hasher, query.orders().len());
    for order in query.orders() {
        write_str(hasher, &order.field);
        write_tag(hasher, order_direction_tag(order.direction));
    }

    match query.ancestor() {
        None => write_tag(hasher, 0x00),
        Some(key) => {
            write_tag(hasher, 0x01);
            write_key(hasher, key);
        }
    }
}

fn hash_raw(hasher: &mut Sha256, statement: &RawStatement) {
    write_str(hasher, &statement.text);
    write_len(hasher, statement.params.len());
    for param in &statement.params {
        write_value(hasher, param);
    }
}

fn write_value(hasher: &mut Sha256, value: &Value) {
    match value {
        Value::Null => write_tag(hasher, 0x20),
        Value::Bool(v) => {
            write_tag(hasher, 0x21);
            write_tag(hasher, u8::from(*v));
        }
        Value::Int(v) => {
            write_tag(hasher, 0x22);
            hasher.update(v.to_be_bytes());
        }
        Value::Uint(v) => {
            write_tag(hasher, 0x23);
            hasher.update(v.to_be_bytes());
        }
        Value::Float(v) => {
            write_tag(hasher, 0x24);
            hasher.update(canonical_f64_bits(*v).to_be_bytes());
        }
        Value::Text(v) => {
            write_tag(hasher, 0x25);
            write_str(hasher, v);
        }
        Value::Key(key) => {
            write_tag(hasher, 0x26);
            write_key(hasher, key);
        }
        Value::List(items) => {
            write_tag(hasher, 0x27);
            write_len(hasher, items.len());
            for item in items {
                write_value(hasher, item);
            }
        }
    }
}

fn write_key(hasher: &mut Sha256, key: &EntityKey) {
    write_len(hasher, key.path().len());
    for segment in key.path() {
        write_str(hasher, &segment.kind);
        match &segment.id {
            KeyId::Id(id) => {
                write_tag(hasher, 0x01);
                hasher.update(id.to_be_bytes());
            }
            KeyId::Name(name) => {
                write_tag(hasher, 0x02);
                write_str(hasher, name);
            }
        }
    }
}

// -0.0 and every NaN payload collapse to one encoding each.
fn canonical_f64_bits(value: f64) -> u64 {
    if value.is_nan() {
        f64::NAN.to_bits()
    } else if value.to_bits() == (-0.0_f64).to_bits() {
        0.0_f64.to_bits()
    } else {
        value.to_bits()
    }
}

fn write_str(hasher: &mut Sha256, value: &str) {
    write_len(hasher, value.len());
    hasher.update(value.as_bytes());
}

fn write_u32(hasher: &mut Sha256, value: u32) {
    hasher.update(value.to_be_bytes());
}

// Length prefixes are always eight bytes wide.
fn write_len(hasher: &mut Sha256, len: usize) {
    hasher.update(u64::try_from(len).unwrap_or(u64::MAX).to_be_bytes());
}

fn write_tag(hasher: &mut Sha256, tag: u8) {
    hasher.update([tag]);
}

const fn compare_op_tag(op: CompareOp) -> u8 {
    match op {
        CompareOp::Eq => 0x01,
        CompareOp::Ne => 0x02,
        CompareOp::Lt => 0x03,
        CompareOp::Lte => 0x04,
        CompareOp::Gt => 0x05,
        CompareOp::Gte => 0x06,
        CompareOp::In => 0x07,
    }
}

const fn order_direction_tag(direction: OrderDirection) -> u8 {
    match direction {
        OrderDirection::Asc => 0x01,
        OrderDirection::Desc => 0x02,
    }
}

///
/// TESTS
///
