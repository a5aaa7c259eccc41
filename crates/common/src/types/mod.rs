use serde::Serialize;

use crate::pagination::Pagination;

#[derive(Serialize, Debug)]
pub struct Health {
    pub status: &'static str,
}

/// Envelope for paginated listings.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
}

impl<T> Page<T> {
    /// Wrap one fetched page, echoing the normalized request parameters.
    pub fn new(items: Vec<T>, opts: Pagination, total: u64) -> Self {
        let (idx, per_page) = opts.normalize();
        Self { items, page: idx as u32 + 1, per_page: per_page as u32, total }
    }
}
