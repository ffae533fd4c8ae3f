//! Page-number pagination with clamping.
//!
//! A missing or non-numeric page token selects the first page. A numeric
//! token below 1 or past the end selects the last page. There is always at
//! least one page, even for an empty sequence.

use std::num::IntErrorKind;

use serde::Serialize;

/// Posts shown per list page unless configured otherwise.
pub const DEFAULT_PAGE_SIZE: u64 = 3;

/// Splits a sequence of known length into fixed-size pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    count: u64,
    per_page: u64,
}

/// One resolved page of a [`Paginator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Page {
    /// 1-based page number.
    pub number: u64,
    pub num_pages: u64,
    /// Total number of items across all pages.
    pub count: u64,
    pub per_page: u64,
}

impl Paginator {
    /// `per_page` of zero is treated as one.
    pub fn new(count: u64, per_page: u64) -> Self {
        Self {
            count,
            per_page: per_page.max(1),
        }
    }

    pub fn num_pages(&self) -> u64 {
        self.count.div_ceil(self.per_page).max(1)
    }

    /// Resolve a raw page token to a page, clamping invalid values.
    pub fn page(&self, token: Option<&str>) -> Page {
        let num_pages = self.num_pages();
        let number = match token.map(|t| t.trim().parse::<i64>()) {
            None => 1,
            Some(Ok(n)) if n >= 1 && (n as u64) <= num_pages => n as u64,
            Some(Ok(n)) => {
                tracing::debug!(requested = n, num_pages, "Page out of range, using last page");
                num_pages
            }
            // Integers too large for i64 are still past the end.
            Some(Err(e))
                if matches!(e.kind(), IntErrorKind::PosOverflow | IntErrorKind::NegOverflow) =>
            {
                tracing::debug!(token = ?token, num_pages, "Page out of range, using last page");
                num_pages
            }
            Some(Err(_)) => {
                tracing::debug!(token = ?token, "Page token is not an integer, using first page");
                1
            }
        };

        Page {
            number,
            num_pages,
            count: self.count,
            per_page: self.per_page,
        }
    }
}

impl Page {
    /// Index of the first item on this page.
    pub fn offset(&self) -> u64 {
        (self.number - 1) * self.per_page
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }
}
