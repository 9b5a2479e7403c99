//! Module: paging
//! Responsibility: page-by-page retrieval over a `QueryProvider`, resuming
//! from cached cursors and sharing the cursor table across requests.
//! Does not own: query execution, cursor encoding, or the cache service.
//! Boundary: the only place that decides between cursor and offset resumes.

mod persist;
mod table;


use crate::{
    cache::{CacheClient, CacheOp},
    config::{ConfigError, PagingConfig},
    key::EntityKey,
    obs::{NoopSink, PagingEvent, PagingSink},
    query::{FilterClause, OrderClause, QueryError, QueryId, QueryProvider},
    value::Value,
};
use persist::{CacheLookup, CursorSnapshot};
use std::sync::Arc;
use thiserror::Error as ThisError;
use tracing::{debug, warn};

// re-exports
pub use table::{CursorTable, PageMarker};

///
/// PagingError
///

#[derive(Debug, ThisError)]
pub enum PagingError {
    #[error("page size must be positive, got {size}")]
    InvalidPageSize { size: u32 },

    #[error("page number must be positive, got {page}")]
    InvalidPageNumber { page: u32 },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Query(#[from] QueryError),
}

///
/// PagedQuery
///
/// Paginator over one ordered query, for the lifetime of one request.
///
/// Each fetched page teaches the instance the cursor that resumes at the next
/// page. That table is written to the shared cache under the query's identity,
/// so a later request for the same query and page size can jump straight to a
/// deep page without skipping rows.
///
/// Mutating the query (`filter`, `order`, `ancestor`, `set_page_size`) changes
/// its identity and discards everything learned about the old one.
///
/// `page_count` is derived from `QueryProvider::count` bounded by
/// `PagingConfig::count_limit`; result sets larger than the limit report a
/// page count computed from the limit.
///

pub struct PagedQuery<Q: QueryProvider> {
    query: Q,
    page_size: u32,
    table: CursorTable,
    page_count: Option<u32>,
    query_id: Option<QueryId>,
    last_persisted: Option<CursorSnapshot>,
    restore_pending: bool,
    cache: Arc<dyn CacheClient>,
    sink: Arc<dyn PagingSink>,
    config: PagingConfig,
}

impl<Q: QueryProvider> PagedQuery<Q> {
    pub fn new(query: Q, page_size: u32, cache: Arc<dyn CacheClient>) -> Result<Self, PagingError> {
        validate_page_size(page_size)?;

        Ok(Self {
            query,
            page_size,
            table: CursorTable::default(),
            page_count: None,
            query_id: None,
            last_persisted: None,
            restore_pending: true,
            cache,
            sink: Arc::new(NoopSink),
            config: PagingConfig::default(),
        })
    }

    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn PagingSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Use `config` for cache keys, count limits and payload bounds.
    pub fn with_config(mut self, config: PagingConfig) -> Result<Self, PagingError> {
        config.validate()?;

        self.config = config;
        self.reset_state();

        Ok(self)
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    #[must_use]
    pub const fn query(&self) -> &Q {
        &self.query
    }

    #[must_use]
    pub fn into_query(self) -> Q {
        self.query
    }

    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    #[must_use]
    pub const fn config(&self) -> &PagingConfig {
        &self.config
    }

    /// What this instance currently knows about each page.
    #[must_use]
    pub const fn cursor_table(&self) -> &CursorTable {
        &self.table
    }

    /// Identity of the current query definition and page size.
    pub fn query_id(&mut self) -> QueryId {
        *self
            .query_id
            .get_or_insert_with(|| QueryId::compute(&self.query.definition(), self.page_size))
    }

    /// Cache key the cursor table is shared under.
    pub fn cache_key(&mut self) -> String {
        let id = self.query_id();

        self.config.cache_key(&id.as_hex())
    }

    // ------------------------------------------------------------------
    // Paging
    // ------------------------------------------------------------------

    /// Fetch page `page_number` (1-based).
    ///
    /// With `clear`, everything known about the query is discarded first and
    /// the cache is not consulted. Pages past the end are empty.
    pub fn fetch_page(&mut self, page_number: u32, clear: bool) -> Result<Vec<Q::Row>, PagingError> {
        if page_number == 0 {
            return Err(PagingError::InvalidPageNumber { page: page_number });
        }

        if clear {
            self.clear();
        } else {
            self.restore_if_pending();
        }

        let offset = self.pin_resume_point(page_number);
        let rows = match self.query.fetch(self.page_size, offset) {
            Ok(rows) => rows,
            Err(err) => {
                self.query.with_cursor(None);
                return Err(err.into());
            }
        };

        self.record_page(page_number, rows.len());
        self.query.with_cursor(None);
        self.persist_if_changed();

        Ok(rows)
    }

    /// Whether page `page_number` holds at least one row.
    ///
    /// Answered from the cursor table when it can be; otherwise falls back to
    /// `page_count`.
    pub fn has_page(&mut self, page_number: u32) -> Result<bool, PagingError> {
        if page_number == 0 {
            return Ok(false);
        }

        self.restore_if_pending();

        if self.table.proves_page_exists(page_number) {
            return Ok(true);
        }
        if self.table.proves_page_empty(page_number) {
            return Ok(false);
        }

        Ok(page_number <= self.page_count()?)
    }

    /// Number of pages, counting at most `PagingConfig::count_limit` rows.
    pub fn page_count(&mut self) -> Result<u32, PagingError> {
        self.restore_if_pending();

        if let Some(count) = self.page_count {
            return Ok(count);
        }

        let total = self.query.count(self.config.count_limit)?;
        self.sink.record(PagingEvent::CountCall);

        let pages = total.div_ceil(self.page_size);
        debug!(total, pages, "page count computed");

        self.page_count = Some(pages);
        self.persist_if_changed();

        Ok(pages)
    }

    /// Count matching rows. Does not touch the cursor table or the cache.
    pub fn count(&mut self, limit: u32) -> Result<u32, PagingError> {
        Ok(self.query.count(limit)?)
    }

    /// Fetch `limit` rows after `offset`, bypassing the cursor table.
    pub fn fetch(&mut self, limit: u32, offset: u64) -> Result<Vec<Q::Row>, PagingError> {
        self.query.with_cursor(None);
        let result = self.query.fetch(limit, offset);
        self.query.with_cursor(None);

        Ok(result?)
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    /// Add a filter such as `("published >", 10)`.
    pub fn filter(
        &mut self,
        expr: &str,
        value: impl Into<Value>,
    ) -> Result<&mut Self, PagingError> {
        let clause = FilterClause::parse(expr, value)?;
        self.query.filter(clause)?;
        self.reset_state();

        Ok(self)
    }

    /// Add a sort order: `"field"` ascending, `"-field"` descending.
    pub fn order(&mut self, expr: &str) -> Result<&mut Self, PagingError> {
        let clause = OrderClause::parse(expr)?;
        self.query.order(clause)?;
        self.reset_state();

        Ok(self)
    }

    /// Restrict results to descendants of `key`.
    pub fn ancestor(&mut self, key: EntityKey) -> Result<&mut Self, PagingError> {
        self.query.ancestor(key)?;
        self.reset_state();

        Ok(self)
    }

    /// Change the page size. A different size starts from a clean slate:
    /// the cached snapshot for the old size is deleted and nothing is
    /// restored until the query is mutated again.
    pub fn set_page_size(&mut self, page_size: u32) -> Result<(), PagingError> {
        validate_page_size(page_size)?;

        if page_size != self.page_size {
            self.clear();
            self.page_size = page_size;
        }

        Ok(())
    }

    /// Forget everything known about this query, locally and in the cache.
    ///
    /// Cache failures are logged and otherwise ignored. The instance will not
    /// consult the cache again until the query is mutated.
    pub fn clear(&mut self) {
        let key = self.cache_key();
        if let Err(err) = self.cache.delete(&key) {
            warn!(key = %key, error = %err, "failed to delete paging snapshot");
            self.sink.record(PagingEvent::CacheUnavailable {
                op: CacheOp::Delete,
            });
        }

        self.reset_state();
        self.restore_pending = false;
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Pin the cursor for `page_number` if one is known and return the
    /// offset to fetch with.
    fn pin_resume_point(&mut self, page_number: u32) -> u64 {
        if let Some(cursor) = self.table.cursor_for(page_number).cloned() {
            debug!(page = page_number, "resuming page from cursor");
            self.query.with_cursor(Some(cursor));
            self.sink.record(PagingEvent::CursorQuery { page: page_number });

            return 0;
        }

        self.query.with_cursor(None);

        if page_number == 1 {
            self.sink.record(PagingEvent::FirstPageQuery);

            return 0;
        }

        let offset = u64::from(self.page_size) * u64::from(page_number - 1);
        debug!(page = page_number, offset, "no cursor for page, skipping rows");
        self.sink.record(PagingEvent::OffsetQuery {
            page: page_number,
            offset,
        });

        offset
    }

    fn record_page(&mut self, page_number: u32, len: usize) {
        if len == 0 {
            self.table.record_empty_page(page_number);
            return;
        }

        if len < self.page_size as usize {
            self.table.record_partial_page(page_number);
            return;
        }

        match self.query.cursor() {
            Some(cursor) => self.table.record_full_page(page_number, cursor),
            None => debug!(page = page_number, "provider returned no cursor after full page"),
        }
    }

    fn snapshot(&self) -> CursorSnapshot {
        CursorSnapshot {
            table: self.table.clone(),
            page_count: self.page_count,
        }
    }

    fn restore_if_pending(&mut self) {
        if !self.restore_pending {
            return;
        }
        self.restore_pending = false;

        let key = self.cache_key();
        match persist::lookup(self.cache.as_ref(), &key, self.config.max_snapshot_bytes) {
            CacheLookup::Hit(snapshot) => {
                debug!(key = %key, pages = snapshot.table.len(), "restored paging snapshot");
                self.table = snapshot.table.clone();
                self.page_count = snapshot.page_count;
                self.last_persisted = Some(snapshot);
                self.sink.record(PagingEvent::Restore);
            }
            CacheLookup::Miss => self.sink.record(PagingEvent::RestoreMiss),
            CacheLookup::Unavailable => self.sink.record(PagingEvent::CacheUnavailable {
                op: CacheOp::Get,
            }),
        }
    }

    fn persist_if_changed(&mut self) {
        let snapshot = self.snapshot();
        if self.last_persisted.as_ref() == Some(&snapshot) {
            return;
        }

        let bytes = match snapshot.encode() {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(error = %err, "failed to encode paging snapshot");
                return;
            }
        };

        let key = self.cache_key();
        match self.cache.set(&key, bytes) {
            Ok(()) => {
                debug!(key = %key, "persisted paging snapshot");
                self.last_persisted = Some(snapshot);
                self.sink.record(PagingEvent::Persist);
            }
            Err(err) => {
                warn!(key = %key, error = %err, "failed to persist paging snapshot");
                self.sink.record(PagingEvent::CacheUnavailable { op: CacheOp::Set });
            }
        }
    }

    // The new definition's entry may still be restored.
    fn reset_state(&mut self) {
        self.table = CursorTable::default();
        self.page_count = None;
        self.query_id = None;
        self.last_persisted = None;
        self.restore_pending = true;
    }
}

fn validate_page_size(page_size: u32) -> Result<(), PagingError> {
    if page_size == 0 {
        return Err(PagingError::InvalidPageSize { size: page_size });
    }

    Ok(())
}
