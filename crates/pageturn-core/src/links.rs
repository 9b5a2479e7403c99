//! Page navigation links: a window of numbered pages around the current one,
//! with optional previous/next links.

use crate::config::{DEFAULT_LINK_WINDOW, PagingConfig};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

const PREV_LABEL: &str = "Prev";
const NEXT_LABEL: &str = "Next";

///
/// PageLink
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PageLink {
    pub label: String,
    pub url: String,
    pub page: u32,
}

///
/// PageLinks
///
/// Navigation for page `page` of `page_count`. URLs are built by appending
/// `page_field=<n>` to `url_root`.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PageLinks {
    pub page: u32,
    pub page_count: u32,
    pub url_root: String,
    pub page_field: String,
    pub page_range: u32,
}

impl PageLinks {
    #[must_use]
    pub fn new(
        page: u32,
        page_count: u32,
        url_root: impl Into<String>,
        page_field: impl Into<String>,
    ) -> Self {
        Self {
            page,
            page_count,
            url_root: url_root.into(),
            page_field: page_field.into(),
            page_range: DEFAULT_LINK_WINDOW,
        }
    }

    /// Number of numbered links around the current page (rounded down to
    /// an even count).
    #[must_use]
    pub const fn with_page_range(mut self, page_range: u32) -> Self {
        self.page_range = page_range;
        self
    }

    #[must_use]
    pub const fn with_config(self, config: &PagingConfig) -> Self {
        self.with_page_range(config.link_window)
    }

    /// `Prev` (if not on the first page), the numbered window, then `Next`
    /// (if not on the last page).
    #[must_use]
    pub fn get_links(&self) -> Vec<PageLink> {
        let mut links = Vec::new();

        if self.page > 1 {
            links.push(self.link(PREV_LABEL.to_string(), self.page - 1));
        }

        for page in self.window() {
            links.push(self.link(page.to_string(), page));
        }

        if self.page < self.page_count {
            links.push(self.link(NEXT_LABEL.to_string(), self.page + 1));
        }

        links
    }

    /// Numbered pages to show. Starts `page_range / 2` pages before the
    /// current page and always reaches it, clipped at `page_count`.
    fn window(&self) -> RangeInclusive<u32> {
        let half = self.page_range / 2;
        let width = half * 2;

        let start = if self.page <= half {
            1
        } else {
            self.page - half
        };
        let end = start
            .saturating_add(width.saturating_sub(1))
            .max(self.page)
            .min(self.page_count);

        start..=end
    }

    fn link(&self, label: String, page: u32) -> PageLink {
        let separator = if self.url_root.contains('?') { '&' } else { '?' };

        PageLink {
            label,
            url: format!("{}{separator}{}={page}", self.url_root, self.page_field),
            page,
        }
    }
}

///
/// TESTS
///
