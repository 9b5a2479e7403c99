//! In-memory collaborators for paging tests: an ordered provider over sample
//! posts, a raw-statement provider, and a cache that can fail on demand.

use crate::{
    cache::{CacheClient, CacheError, MemoryCache},
    cursor::Cursor,
    key::EntityKey,
    query::{
        ComposedQuery, FilterClause, OrderClause, OrderDirection, QueryDefinition, QueryError,
        QueryProvider, RawStatement,
    },
    value::Value,
};
use std::{
    cell::Cell,
    cmp::Ordering,
    rc::Rc,
    sync::{
        Once,
        atomic::{AtomicBool, AtomicU64, Ordering as AtomicOrdering},
    },
};

static INIT: Once = Once::new();

/// Install a tracing subscriber for test output. Safe to call repeatedly.
pub(crate) fn init_tracing_for_tests() {
    INIT.call_once(|| {
        use tracing_subscriber::{filter::EnvFilter, fmt};

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_test_writer()
            .try_init();
    });
}

///
/// Post
///

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Post {
    pub(crate) id: u64,
    pub(crate) blog: u64,
    pub(crate) category: String,
    pub(crate) published: i64,
    pub(crate) title: String,
}

impl Post {
    pub(crate) fn key(&self) -> EntityKey {
        EntityKey::root("Blog", self.blog).child("Post", self.id)
    }

    fn field(&self, name: &str) -> Option<Value> {
        let value = match name {
            "id" => Value::from(self.id),
            "blog" => Value::from(self.blog),
            "category" => Value::from(self.category.as_str()),
            "published" => Value::from(self.published),
            "title" => Value::from(self.title.as_str()),
            _ => return None,
        };

        Some(value)
    }
}

/// `count` posts with ids `1..=count`, alternating between blogs 1 and 2 and
/// cycling through three categories.
pub(crate) fn sample_posts(count: u64) -> Vec<Post> {
    const CATEGORIES: [&str; 3] = ["rust", "go", "zig"];

    (1..=count)
        .map(|id| Post {
            id,
            blog: id % 2 + 1,
            category: CATEGORIES[usize::try_from(id % 3).unwrap_or(0)].to_string(),
            published: i64::try_from(id).unwrap_or(i64::MAX) * 10,
            title: format!("post {id}"),
        })
        .collect()
}

///
/// ScanStats
/// Work done by a `MemoryQuery`, shared with the test that created it.
///

#[derive(Debug, Default)]
pub(crate) struct ScanStats {
    fetches: Cell<u64>,
    counts: Cell<u64>,
    rows_skipped: Cell<u64>,
}

impl ScanStats {
    pub(crate) fn fetches(&self) -> u64 {
        self.fetches.get()
    }

    pub(crate) fn counts(&self) -> u64 {
        self.counts.get()
    }

    pub(crate) fn rows_skipped(&self) -> u64 {
        self.rows_skipped.get()
    }
}

///
/// MemoryQuery
///
/// Ordered provider over a fixed set of posts. Cursors encode the position
/// just past the last row returned, as big-endian `u64`.
///

pub(crate) struct MemoryQuery {
    rows: Rc<Vec<Post>>,
    query: ComposedQuery,
    pinned: Option<u64>,
    last_end: Option<u64>,
    stats: Rc<ScanStats>,
}

impl MemoryQuery {
    pub(crate) fn new(rows: Vec<Post>) -> Self {
        Self::shared(Rc::new(rows))
    }

    pub(crate) fn shared(rows: Rc<Vec<Post>>) -> Self {
        Self {
            rows,
            query: ComposedQuery::new("Post"),
            pinned: None,
            last_end: None,
            stats: Rc::new(ScanStats::default()),
        }
    }

    pub(crate) fn stats(&self) -> Rc<ScanStats> {
        Rc::clone(&self.stats)
    }

    pub(crate) const fn pinned(&self) -> Option<u64> {
        self.pinned
    }

    fn matching(&self) -> Vec<&Post> {
        let mut rows: Vec<&Post> = self
            .rows
            .iter()
            .filter(|post| self.query.filters().iter().all(|clause| satisfies(post, clause)))
            .filter(|post| {
                self.query
                    .ancestor()
                    .is_none_or(|ancestor| ancestor.is_ancestor_of(&post.key()))
            })
            .collect();

        rows.sort_by(|a, b| compare(a, b, self.query.orders()));
        rows
    }
}

fn satisfies(post: &Post, clause: &FilterClause) -> bool {
    post.field(&clause.field)
        .is_some_and(|value| clause.op.eval(&value, &clause.value))
}

fn compare(a: &Post, b: &Post, orders: &[OrderClause]) -> Ordering {
    for order in orders {
        let ord = match (a.field(&order.field), b.field(&order.field)) {
            (Some(left), Some(right)) => left.strict_order_cmp(&right).unwrap_or(Ordering::Equal),
            _ => Ordering::Equal,
        };
        let ord = match order.direction {
            OrderDirection::Asc => ord,
            OrderDirection::Desc => ord.reverse(),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }

    a.key().cmp(&b.key())
}

fn decode_position(cursor: &Cursor) -> Option<u64> {
    <[u8; 8]>::try_from(cursor.as_bytes())
        .ok()
        .map(u64::from_be_bytes)
}

impl QueryProvider for MemoryQuery {
    type Row = Post;

    fn fetch(&mut self, limit: u32, offset: u64) -> Result<Vec<Post>, QueryError> {
        let matching: Vec<Post> = self.matching().into_iter().cloned().collect();
        let len = matching.len() as u64;

        let start = self.pinned.unwrap_or(0).saturating_add(offset).min(len);
        let end = start.saturating_add(u64::from(limit)).min(len);

        self.stats.fetches.set(self.stats.fetches.get() + 1);
        self.stats
            .rows_skipped
            .set(self.stats.rows_skipped.get() + offset.min(len));
        self.last_end = Some(end);

        let (start, end) = (start as usize, end as usize);
        Ok(matching[start..end].to_vec())
    }

    fn count(&mut self, limit: u32) -> Result<u32, QueryError> {
        self.stats.counts.set(self.stats.counts.get() + 1);
        let total = u32::try_from(self.matching().len()).unwrap_or(u32::MAX);

        Ok(total.min(limit))
    }

    fn cursor(&self) -> Option<Cursor> {
        self.last_end
            .map(|end| Cursor::from_bytes(end.to_be_bytes().to_vec()))
    }

    fn with_cursor(&mut self, cursor: Option<Cursor>) {
        self.pinned = cursor.as_ref().and_then(decode_position);
    }

    fn definition(&self) -> QueryDefinition {
        QueryDefinition::Composed(self.query.clone())
    }

    fn filter(&mut self, clause: FilterClause) -> Result<(), QueryError> {
        self.query.push_filter(clause);
        Ok(())
    }

    fn order(&mut self, clause: OrderClause) -> Result<(), QueryError> {
        self.query.push_order(clause);
        Ok(())
    }

    fn ancestor(&mut self, key: EntityKey) -> Result<(), QueryError> {
        self.query.set_ancestor(key);
        Ok(())
    }
}

///
/// StatementQuery
/// Provider built from a pre-built statement; cannot be composed further.
///

pub(crate) struct StatementQuery {
    inner: MemoryQuery,
    statement: RawStatement,
}

impl StatementQuery {
    pub(crate) fn new(rows: Vec<Post>, text: &str) -> Self {
        Self {
            inner: MemoryQuery::new(rows),
            statement: RawStatement {
                text: text.to_string(),
                params: Vec::new(),
            },
        }
    }
}

impl QueryProvider for StatementQuery {
    type Row = Post;

    fn fetch(&mut self, limit: u32, offset: u64) -> Result<Vec<Post>, QueryError> {
        self.inner.fetch(limit, offset)
    }

    fn count(&mut self, limit: u32) -> Result<u32, QueryError> {
        self.inner.count(limit)
    }

    fn cursor(&self) -> Option<Cursor> {
        self.inner.cursor()
    }

    fn with_cursor(&mut self, cursor: Option<Cursor>) {
        self.inner.with_cursor(cursor);
    }

    fn definition(&self) -> QueryDefinition {
        QueryDefinition::Raw(self.statement.clone())
    }
}

///
/// FailingQuery
/// Provider whose fetches fail; records whether a cursor was left pinned.
///

pub(crate) struct FailingQuery {
    inner: MemoryQuery,
}

impl FailingQuery {
    pub(crate) fn new(rows: Vec<Post>) -> Self {
        Self {
            inner: MemoryQuery::new(rows),
        }
    }

    pub(crate) const fn pinned(&self) -> Option<u64> {
        self.inner.pinned()
    }
}

impl QueryProvider for FailingQuery {
    type Row = Post;

    fn fetch(&mut self, _limit: u32, _offset: u64) -> Result<Vec<Post>, QueryError> {
        Err(QueryError::provider("datastore timeout"))
    }

    fn count(&mut self, limit: u32) -> Result<u32, QueryError> {
        self.inner.count(limit)
    }

    fn cursor(&self) -> Option<Cursor> {
        None
    }

    fn with_cursor(&mut self, cursor: Option<Cursor>) {
        self.inner.with_cursor(cursor);
    }

    fn definition(&self) -> QueryDefinition {
        self.inner.definition()
    }
}

///
/// FlakyCache
///
/// `MemoryCache` that can be taken offline or made to return garbage, and
/// that counts the calls it receives.
///

#[derive(Debug, Default)]
pub(crate) struct FlakyCache {
    inner: MemoryCache,
    offline: AtomicBool,
    garbage: AtomicBool,
    gets: AtomicU64,
    sets: AtomicU64,
    deletes: AtomicU64,
}

impl FlakyCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn set_online(&self, online: bool) {
        self.offline.store(!online, AtomicOrdering::Relaxed);
    }

    pub(crate) fn set_garbage(&self, garbage: bool) {
        self.garbage.store(garbage, AtomicOrdering::Relaxed);
    }

    pub(crate) fn gets(&self) -> u64 {
        self.gets.load(AtomicOrdering::Relaxed)
    }

    pub(crate) fn sets(&self) -> u64 {
        self.sets.load(AtomicOrdering::Relaxed)
    }

    pub(crate) fn deletes(&self) -> u64 {
        self.deletes.load(AtomicOrdering::Relaxed)
    }

    pub(crate) fn contains_key(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    fn check_online(&self) -> Result<(), CacheError> {
        if self.offline.load(AtomicOrdering::Relaxed) {
            return Err(CacheError::unavailable("connection refused"));
        }

        Ok(())
    }
}

impl CacheClient for FlakyCache {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        self.gets.fetch_add(1, AtomicOrdering::Relaxed);
        self.check_online()?;

        if self.garbage.load(AtomicOrdering::Relaxed) {
            return Ok(Some(vec![0xde, 0xad, 0xbe, 0xef]));
        }

        self.inner.get(key)
    }

    fn set(&self, key: &str, value: Vec<u8>) -> Result<(), CacheError> {
        self.sets.fetch_add(1, AtomicOrdering::Relaxed);
        self.check_online()?;

        self.inner.set(key, value)
    }

    fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.deletes.fetch_add(1, AtomicOrdering::Relaxed);
        self.check_online()?;

        self.inner.delete(key)
    }
}
