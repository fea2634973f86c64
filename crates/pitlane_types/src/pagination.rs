use serde::{Deserialize, Serialize};

/// Pagination block returned alongside list responses
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Pagination {
    #[serde(default)]
    pub page: u32,

    #[serde(default)]
    pub limit: u32,

    #[serde(default)]
    pub pages: u32,

    #[serde(default)]
    pub total: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    pub page: u32,
    pub limit: u32,
}

impl PageQuery {
    pub fn new(page: u32, limit: u32) -> Self {
        PageQuery { page, limit }
    }
}

/// One fetched page of list items
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub total_pages: u32,
    pub total: Option<u64>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, page: u32, total_pages: u32) -> Self {
        Page {
            items,
            page,
            total_pages,
            total: None,
        }
    }

    pub fn is_last(&self) -> bool {
        self.page >= self.total_pages
    }

    /// Whether another page can follow this one.
    ///
    /// A short page always ends the list. A full page only continues it while
    /// the server-reported page count has not been reached.
    pub fn has_more(&self, page_size: u32) -> bool {
        self.items.len() >= page_size as usize && !self.is_last()
    }
}
