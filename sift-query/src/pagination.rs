//! Paging window for the paging facet of a specification.
//!
//! ```rust
//! use sift_query::Pagination;
//!
//! let page_3 = Pagination::page(3, 25);
//! assert_eq!(page_3.skip, Some(50));
//! assert_eq!(page_3.take, Some(25));
//!
//! assert!(Pagination::new().is_empty());
//! ```

/// Skip/take window applied after criteria and ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pagination {
    /// Number of records to skip.
    pub skip: Option<u64>,
    /// Maximum number of records to take.
    pub take: Option<u64>,
}

impl Pagination {
    /// Create a new pagination with no limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of records to skip.
    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    /// Set the maximum number of records to take.
    pub fn take(mut self, take: u64) -> Self {
        self.take = Some(take);
        self
    }

    /// Check if pagination is specified.
    pub fn is_empty(&self) -> bool {
        self.skip.is_none() && self.take.is_none()
    }

    /// Get pagination for the first N records.
    pub fn first(n: u64) -> Self {
        Self::new().take(n)
    }

    /// Get pagination for a page (1-indexed).
    pub fn page(page: u64, page_size: u64) -> Self {
        let skip = page.saturating_sub(1) * page_size;
        Self::new().skip(skip).take(page_size)
    }

    /// Apply the window to an in-process row set.
    pub fn apply<T>(&self, rows: Vec<T>) -> Vec<T> {
        let skip = self.skip.map_or(0, |n| n as usize);
        let iter = rows.into_iter().skip(skip);
        match self.take {
            Some(take) => iter.take(take as usize).collect(),
            None => iter.collect(),
        }
    }
}
