//! Query-string pagination shared by services and handlers.

use serde::Deserialize;

/// `?page=&per_page=`; both optional.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
pub struct Pagination {
    /// 1-based
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

fn default_page() -> u32 { 1 }
fn default_per_page() -> u32 { 20 }

pub const MAX_PER_PAGE: u32 = 100;

impl Pagination {
    /// 0-based page index plus a page size clamped to `1..=MAX_PER_PAGE`.
    pub fn normalize(self) -> (u64, u64) {
        let idx = self.page.saturating_sub(1);
        let per_page = self.per_page.clamp(1, MAX_PER_PAGE);
        (idx as u64, per_page as u64)
    }
}

impl Default for Pagination {
    fn default() -> Self { Self { page: default_page(), per_page: default_per_page() } }
}
