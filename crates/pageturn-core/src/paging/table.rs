//! Module: paging::table
//! Responsibility: what is known about each page of one query.
//! Does not own: how cursors are produced or how the table is persisted.

use crate::cursor::Cursor;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

///
/// PageMarker
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum PageMarker {
    /// Cursor that resumes the result set at the start of this page.
    Resume(Cursor),

    /// A fetch of this page returned no rows.
    Empty,
}

///
/// CursorTable
///
/// Sparse map from 1-based page number to `PageMarker`.
///
/// Invariants:
/// - page 1 never carries a `Resume` marker (it starts at offset 0);
/// - a `Resume` marker at page `k` means page `k - 1` was a full page;
/// - an `Empty` marker at page `k` means pages `k..` held no rows when
///   last fetched, so no marker is kept beyond it.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CursorTable {
    markers: BTreeMap<u32, PageMarker>,
}

impl CursorTable {
    /// Build a table from persisted markers, rejecting any that break the
    /// table invariants. Returns the offending page on failure.
    pub(crate) fn from_markers(markers: BTreeMap<u32, PageMarker>) -> Result<Self, u32> {
        let mut empty_seen = None;

        for (&page, marker) in &markers {
            if page == 0 || empty_seen.is_some() {
                return Err(page);
            }
            match marker {
                PageMarker::Resume(_) if page == 1 => return Err(page),
                PageMarker::Resume(_) => {}
                PageMarker::Empty => empty_seen = Some(page),
            }
        }

        Ok(Self { markers })
    }

    pub(crate) fn into_markers(self) -> BTreeMap<u32, PageMarker> {
        self.markers
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    #[must_use]
    pub fn marker(&self, page: u32) -> Option<&PageMarker> {
        self.markers.get(&page)
    }

    /// Cursor that resumes at `page`, if one is known.
    #[must_use]
    pub fn cursor_for(&self, page: u32) -> Option<&Cursor> {
        match self.markers.get(&page) {
            Some(PageMarker::Resume(cursor)) => Some(cursor),
            _ => None,
        }
    }

    /// Whether a cursor recorded beyond `page` proves `page` was full.
    #[must_use]
    pub fn proves_page_exists(&self, page: u32) -> bool {
        let Some(next) = page.checked_add(1) else {
            return false;
        };

        self.markers
            .range(next..)
            .any(|(_, marker)| matches!(marker, PageMarker::Resume(_)))
    }

    /// Whether an `Empty` marker at or below `page` proves `page` is empty.
    #[must_use]
    pub fn proves_page_empty(&self, page: u32) -> bool {
        self.markers
            .range(..=page)
            .any(|(_, marker)| matches!(marker, PageMarker::Empty))
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &PageMarker)> {
        self.markers.iter().map(|(page, marker)| (*page, marker))
    }

    /// `page` came back full: `cursor` resumes at `page + 1`.
    ///
    /// If a different marker was recorded for `page + 1`, the result set has
    /// shifted since, and every marker past it is stale.
    pub(crate) fn record_full_page(&mut self, page: u32, cursor: Cursor) {
        self.clear_empty_at(page);

        let Some(next) = page.checked_add(1) else {
            return;
        };

        let shifted = match self.markers.get(&next) {
            Some(PageMarker::Resume(existing)) => *existing != cursor,
            Some(PageMarker::Empty) => true,
            None => false,
        };
        if shifted {
            self.truncate_after(next);
        }

        self.markers.insert(next, PageMarker::Resume(cursor));
    }

    /// `page` came back partially filled: it is the last page.
    ///
    /// Nothing is recorded for `page + 1`; the next page stays unknown until
    /// it is fetched or counted.
    pub(crate) fn record_partial_page(&mut self, page: u32) {
        self.clear_empty_at(page);
        self.truncate_after(page);
    }

    /// `page` came back empty.
    pub(crate) fn record_empty_page(&mut self, page: u32) {
        self.truncate_after(page);
        self.markers.insert(page, PageMarker::Empty);
    }

    fn clear_empty_at(&mut self, page: u32) {
        if matches!(self.markers.get(&page), Some(PageMarker::Empty)) {
            self.markers.remove(&page);
        }
    }

    fn truncate_after(&mut self, page: u32) {
        if let Some(next) = page.checked_add(1) {
            drop(self.markers.split_off(&next));
        }
    }
}

///
/// TESTS
///
