use crate::Resource;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListViewModel {
    pub resource: Resource,
    pub columns: Vec<&'static str>,
    pub rows: Vec<RowView>,
    /// Index of the row to observe for "load more"; the last row.
    pub sentinel_row: Option<usize>,
    pub filters: Vec<(String, String)>,
    pub page_size: u32,
    pub loaded_count: usize,
    pub total_count: Option<u64>,
    pub current_page: Option<u32>,
    pub total_pages: Option<u32>,
    pub has_next_page: bool,
    pub is_loading: bool,
    pub is_fetching_next_page: bool,
    /// An error stopped automatic loading; only a retry resumes it.
    pub is_halted: bool,
    pub empty_message: Option<String>,
    pub error_banner: Option<String>,
    pub validation_message: Option<String>,
    pub reset_key: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowView {
    pub id: String,
    /// One display string per column; missing fields render as `-`.
    pub cells: Vec<String>,
}
