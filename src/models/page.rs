use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Zero-based page selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub size: i64,
}

impl PageRequest {
    pub fn new(page: Option<i64>, size: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(0).max(0),
            size: size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> i64 {
        self.page.saturating_mul(self.size)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: i64,
    pub total_pages: i64,
    pub size: i64,
    pub number: i64,
    pub number_of_elements: i64,
    pub first: bool,
    pub last: bool,
    pub empty: bool,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: &PageRequest, total_elements: i64) -> Self {
        let total_pages = (total_elements + request.size - 1) / request.size;

        Self {
            total_elements,
            total_pages,
            size: request.size,
            number: request.page,
            number_of_elements: content.len() as i64,
            first: request.page == 0,
            last: request.page.saturating_add(1) >= total_pages,
            empty: content.is_empty(),
            content,
        }
    }
}
