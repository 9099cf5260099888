use crate::{Page, PageRequest, QueryError, Record};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// The list surface became visible to the user.
    Mounted,
    /// The list surface went away; accumulated rows are dropped.
    Unmounted,
    /// User edited a filter or the search box. An empty value clears it.
    FilterChanged { name: String, value: String },
    /// User picked a different page size.
    PageSizeChanged(u32),
    /// The visibility trigger asked for more rows.
    SentinelTriggered,
    /// Engine finished a page request, after its own retries.
    PageLoaded {
        request: PageRequest,
        result: Result<Page<Record>, QueryError>,
    },
    /// User clicked Retry on the error banner.
    RetryClicked,
    /// User closed the error banner.
    ErrorDismissed,
    /// UI tick; prunes stale cache entries.
    Tick,
    NoOp,
}
