//! Pagination and sorting types for list endpoints.

use serde::{Deserialize, Serialize};

/// Hard upper bound on `per_page`.
pub const MAX_PER_PAGE: u64 = 100;

/// Request parameters for paginated queries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page number (1-indexed).
    pub page: u64,
    /// Number of items per page.
    pub per_page: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 20,
        }
    }
}

impl PageRequest {
    /// Builds a request from optional query values, clamping to `1..=MAX_PER_PAGE`.
    #[must_use]
    pub fn from_query(page: Option<u64>, per_page: Option<u64>, default_per_page: u64) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page
                .unwrap_or(default_per_page)
                .clamp(1, MAX_PER_PAGE),
        }
    }

    /// Calculates the offset for database queries.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.per_page)
    }

    /// Returns the limit for database queries.
    #[must_use]
    pub const fn limit(&self) -> u64 {
        self.per_page
    }
}

/// Pagination metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    /// Total number of items across all pages.
    pub total: u64,
    /// Items per page.
    pub per_page: u64,
    /// Current page number.
    pub current_page: u64,
    /// Last page number (at least 1).
    pub last_page: u64,
    /// 1-based index of the first item on this page, if any.
    pub from: Option<u64>,
    /// 1-based index of the last item on this page, if any.
    pub to: Option<u64>,
}

impl PageMeta {
    /// Computes metadata for a page holding `count` items.
    #[must_use]
    pub fn new(request: PageRequest, total: u64, count: u64) -> Self {
        let last_page = total.div_ceil(request.per_page).max(1);
        let (from, to) = if count == 0 {
            (None, None)
        } else {
            let first = request.offset() + 1;
            (Some(first), Some(first + count - 1))
        };

        Self {
            total,
            per_page: request.per_page,
            current_page: request.page,
            last_page,
            from,
            to,
        }
    }
}

/// Response wrapper for paginated data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T> {
    /// The items in the current page.
    pub data: Vec<T>,
    /// Pagination metadata.
    pub pagination: PageMeta,
}

impl<T> PageResponse<T> {
    /// Creates a new paginated response.
    #[must_use]
    pub fn new(data: Vec<T>, request: PageRequest, total: u64) -> Self {
        let pagination = PageMeta::new(request, total, data.len() as u64);
        Self { data, pagination }
    }

    /// Maps every item, keeping the metadata.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageResponse<U> {
        PageResponse {
            data: self.data.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Ascending.
    Asc,
    /// Descending.
    #[default]
    Desc,
}

impl SortOrder {
    /// Parses a user-supplied direction; anything but `asc` is descending.
    #[must_use]
    pub fn parse(value: Option<&str>, default: Self) -> Self {
        match value.map(str::to_ascii_lowercase).as_deref() {
            Some("asc") => Self::Asc,
            Some("desc") => Self::Desc,
            _ => default,
        }
    }
}

/// Resolves a requested sort column against a whitelist.
///
/// Unknown columns fall back to `None` so the caller applies its default order.
#[must_use]
pub fn whitelisted_sort<'a>(requested: Option<&str>, allowed: &[&'a str]) -> Option<&'a str> {
    let requested = requested?;
    allowed.iter().copied().find(|column| *column == requested)
}
