//! Pagination utilities for the service layer.
//!
//! Provides a simple `Pagination` struct, input normalization, and the
//! `Paged<T>` list response shared by every module.

use serde::{Deserialize, Serialize};

/// Pagination parameters
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct Pagination {
    /// 1-based page index
    pub page: u32,
    /// items per page
    pub per_page: u32,
}

impl Pagination {
    /// Clamp to sane defaults; returns (0-based page index, per_page) as `u64`.
    pub fn normalize(self) -> (u64, u64) {
        let page = if self.page == 0 { 1 } else { self.page };
        let per_page = self.per_page.clamp(1, 100);
        ((page - 1) as u64, per_page as u64)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self { page: 1, per_page: 20 }
    }
}

/// One page of results plus pagination metadata.
#[derive(Clone, Debug, Serialize)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u64,
}

impl<T> Paged<T> {
    /// Assemble a page; `opts` should be the same value used for the query.
    pub fn new(items: Vec<T>, total: u64, opts: Pagination) -> Self {
        let (page_idx, per_page) = opts.normalize();
        Self {
            items,
            total,
            page: (page_idx + 1) as u32,
            per_page: per_page as u32,
            total_pages: total_pages(total, per_page),
        }
    }
}

/// `ceil(total / per_page)`; zero rows means zero pages.
pub fn total_pages(total: u64, per_page: u64) -> u64 {
    total.div_ceil(per_page)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_clamps_zero_to_defaults() {
        let (idx, per) = Pagination { page: 0, per_page: 0 }.normalize();
        assert_eq!(idx, 0);
        assert_eq!(per, 1);
    }

    #[test]
    fn normalize_clamps_upper_bound() {
        let (idx, per) = Pagination { page: 5, per_page: 1000 }.normalize();
        assert_eq!(idx, 4);
        assert_eq!(per, 100);
    }

    #[test]
    fn default_values_are_sane() {
        let d = Pagination::default();
        assert_eq!(d.page, 1);
        assert_eq!(d.per_page, 20);
    }

    #[test]
    fn total_pages_is_ceiling() {
        assert_eq!(total_pages(0, 20), 0);
        assert_eq!(total_pages(1, 20), 1);
        assert_eq!(total_pages(20, 20), 1);
        assert_eq!(total_pages(21, 20), 2);
        assert_eq!(total_pages(100, 7), 15);
    }

    #[test]
    fn paged_metadata_matches_inputs() {
        let page = Paged::new(vec![1, 2, 3], 43, Pagination { page: 2, per_page: 3 });
        assert_eq!(page.page, 2);
        assert_eq!(page.per_page, 3);
        assert_eq!(page.total, 43);
        assert_eq!(page.total_pages, 15);
        assert!(page.items.len() <= page.per_page as usize);
    }
}
