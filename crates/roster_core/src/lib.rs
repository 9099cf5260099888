//! Roster core: pure pagination, caching and visibility state machines plus
//! the list consumer's update function and view model.
mod cache;
mod effect;
mod error;
mod filters;
mod msg;
mod page;
mod paged;
mod query_key;
mod resource;
mod state;
mod update;
mod view_model;
pub mod visibility;

pub use cache::{QueryCache, DEFAULT_STALE_TIME};
pub use effect::Effect;
pub use error::{QueryError, QueryErrorKind, ValidationError, GENERIC_ERROR_MESSAGE};
pub use filters::{parse_filter_assignment, validate_filter, validate_page_size, MAX_PAGE_SIZE};
pub use msg::Msg;
pub use page::{next_page_param, NextPageFn, Page, Pagination, FIRST_PAGE};
pub use paged::{PageRequest, PagedList, Received};
pub use query_key::QueryKey;
pub use resource::{Record, Resource};
pub use state::{Clock, ListState};
pub use update::update;
pub use view_model::{ListViewModel, RowView};
