/// Page number requested when a query starts.
pub const FIRST_PAGE: u32 = 1;

/// Computes the page after `pagination`, if the server reported one.
pub type NextPageFn = fn(&Pagination) -> Option<u32>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_count: u64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
    pub limit: u32,
}

/// One server batch of items. Items keep the order the server returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, pagination: Pagination) -> Self {
        Self { items, pagination }
    }
}

/// Default next-page rule: `current_page + 1` while the server says there is more.
pub fn next_page_param(pagination: &Pagination) -> Option<u32> {
    pagination
        .has_next_page
        .then(|| pagination.current_page.saturating_add(1))
}
