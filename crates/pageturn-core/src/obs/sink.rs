//! Paging sink boundary.
//!
//! `PagedQuery` reports what it did (which resume strategy, counts, cache
//! traffic) as `PagingEvent`s. Production wiring defaults to `NoopSink`;
//! `CounterSink` keeps totals for tests and diagnostics endpoints.

use crate::cache::CacheOp;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

///
/// PagingEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PagingEvent {
    /// Page fetched by resuming from a cached cursor.
    CursorQuery { page: u32 },

    /// Page fetched by skipping `offset` rows.
    OffsetQuery { page: u32, offset: u64 },

    /// Page 1 fetched from the start of the result set.
    FirstPageQuery,

    /// Provider count issued to compute the page count.
    CountCall,

    /// Cursor snapshot written to the cache.
    Persist,

    /// Cursor snapshot adopted from the cache.
    Restore,

    /// Cache consulted but held no usable snapshot.
    RestoreMiss,

    /// Cache call failed; paging continued without it.
    CacheUnavailable { op: CacheOp },
}

///
/// PagingSink
///

pub trait PagingSink: Send + Sync {
    fn record(&self, event: PagingEvent);
}

///
/// NoopSink
///

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl PagingSink for NoopSink {
    fn record(&self, _event: PagingEvent) {}
}

///
/// PagingReport
/// Point-in-time totals collected by a `CounterSink`.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct PagingReport {
    pub cursor_queries: u64,
    pub offset_queries: u64,
    pub page1_queries: u64,
    pub rows_offset: u64,
    pub count_calls: u64,
    pub persists: u64,
    pub restores: u64,
    pub restore_misses: u64,
    pub cache_failures: u64,
}

///
/// CounterSink
///

#[derive(Debug, Default)]
pub struct CounterSink {
    cursor_queries: AtomicU64,
    offset_queries: AtomicU64,
    page1_queries: AtomicU64,
    rows_offset: AtomicU64,
    count_calls: AtomicU64,
    persists: AtomicU64,
    restores: AtomicU64,
    restore_misses: AtomicU64,
    cache_failures: AtomicU64,
}

impl CounterSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn report(&self) -> PagingReport {
        PagingReport {
            cursor_queries: load(&self.cursor_queries),
            offset_queries: load(&self.offset_queries),
            page1_queries: load(&self.page1_queries),
            rows_offset: load(&self.rows_offset),
            count_calls: load(&self.count_calls),
            persists: load(&self.persists),
            restores: load(&self.restores),
            restore_misses: load(&self.restore_misses),
            cache_failures: load(&self.cache_failures),
        }
    }

    /// Reset all counters (useful between test phases).
    pub fn reset(&self) {
        for counter in [
            &self.cursor_queries,
            &self.offset_queries,
            &self.page1_queries,
            &self.rows_offset,
            &self.count_calls,
            &self.persists,
            &self.restores,
            &self.restore_misses,
            &self.cache_failures,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

impl PagingSink for CounterSink {
    fn record(&self, event: PagingEvent) {
        match event {
            PagingEvent::CursorQuery { .. } => bump(&self.cursor_queries, 1),
            PagingEvent::OffsetQuery { offset, .. } => {
                bump(&self.offset_queries, 1);
                bump(&self.rows_offset, offset);
            }
            PagingEvent::FirstPageQuery => bump(&self.page1_queries, 1),
            PagingEvent::CountCall => bump(&self.count_calls, 1),
            PagingEvent::Persist => bump(&self.persists, 1),
            PagingEvent::Restore => bump(&self.restores, 1),
            PagingEvent::RestoreMiss => bump(&self.restore_misses, 1),
            PagingEvent::CacheUnavailable { .. } => bump(&self.cache_failures, 1),
        }
    }
}

fn bump(counter: &AtomicU64, delta: u64) {
    // saturate rather than wrap
    let _ = counter.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
        Some(current.saturating_add(delta))
    });
}

fn load(counter: &AtomicU64) -> u64 {
    counter.load(Ordering::Relaxed)
}

///
/// TESTS
///
