//! Pagination primitives shared by every list and search operation.

use serde::{Deserialize, Serialize};

/// A normalised page request.
///
/// Both fields are optional on the wire; [`PageRequest::normalize`] applies
/// the defaults (page 1, 20 per page, capped at 100).
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageRequest {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl PageRequest {
    /// Creates a request for a specific page.
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: Some(page),
            per_page: Some(per_page),
        }
    }

    /// Returns `(page, per_page)` with defaults applied and bounds enforced.
    pub fn normalize(&self) -> (u32, u32) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(20).clamp(1, 100);
        (page, per_page)
    }

    /// Number of records to skip for this page.
    pub fn offset(&self) -> u64 {
        let (page, per_page) = self.normalize();
        u64::from(page - 1) * u64::from(per_page)
    }

    /// Number of records on a full page.
    pub fn limit(&self) -> u64 {
        let (_, per_page) = self.normalize();
        u64::from(per_page)
    }
}

/// One page of results plus the metadata needed to render pagination.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
}

impl<T> Page<T> {
    /// Wraps an already-paged slice of results.
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        let (page, per_page) = request.normalize();
        Self {
            items,
            total,
            page,
            per_page,
        }
    }

    /// Pages an in-memory result set, recording the pre-slice total.
    pub fn from_unpaged(all: Vec<T>, request: PageRequest) -> Self {
        let total = all.len() as u64;
        let (page, per_page) = request.normalize();
        let items = all
            .into_iter()
            .skip(request.offset() as usize)
            .take(per_page as usize)
            .collect();
        Self {
            items,
            total,
            page,
            per_page,
        }
    }

    /// Maps the page content while keeping the metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
        }
    }
}
