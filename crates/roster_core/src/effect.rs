use crate::PageRequest;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FetchPage(PageRequest),
    /// The query key changed: scroll the list to the top and re-arm the
    /// visibility trigger with `reset_key`.
    ScrollToTop { reset_key: u64 },
}
