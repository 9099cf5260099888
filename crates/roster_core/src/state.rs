use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use engine_logging::engine_info;

use crate::view_model::{ListViewModel, RowView};
use crate::visibility::LoadGate;
use crate::filters::validate_filter;
use crate::{
    Effect, PagedList, QueryCache, QueryKey, Record, Resource, ValidationError,
    DEFAULT_STALE_TIME,
};

/// Source of "now" for cache freshness.
pub type Clock = Arc<dyn Fn() -> Instant + Send + Sync>;

/// State of one list consumer: the current query, its accumulated rows, the
/// query cache and what the user should see about errors.
#[derive(Clone)]
pub struct ListState {
    list: PagedList<Record>,
    cache: QueryCache<Record>,
    clock: Clock,
    mounted: bool,
    reset_key: u64,
    banner: Option<String>,
    validation_error: Option<ValidationError>,
    dirty: bool,
}

impl ListState {
    pub fn new(resource: Resource, page_size: u32) -> Self {
        Self {
            list: PagedList::new(QueryKey::new(resource, page_size)),
            cache: QueryCache::new(DEFAULT_STALE_TIME),
            clock: Arc::new(Instant::now),
            mounted: false,
            reset_key: 0,
            banner: None,
            validation_error: None,
            dirty: false,
        }
    }

    pub fn with_stale_time(mut self, stale_time: Duration) -> Self {
        self.cache = QueryCache::new(stale_time);
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Applies an initial filter before the list is mounted.
    pub fn with_filter(mut self, name: &str, value: &str) -> Result<Self, ValidationError> {
        let value = validate_filter(self.resource(), name, value)?;
        let key = self.list.key().clone().with_filter(name, value);
        self.list.reset(key);
        Ok(self)
    }

    pub fn key(&self) -> &QueryKey {
        self.list.key()
    }

    pub fn resource(&self) -> Resource {
        self.list.key().resource()
    }

    pub fn list(&self) -> &PagedList<Record> {
        &self.list
    }

    pub fn cache(&self) -> &QueryCache<Record> {
        &self.cache
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn reset_key(&self) -> u64 {
        self.reset_key
    }

    pub fn validation_error(&self) -> Option<&ValidationError> {
        self.validation_error.as_ref()
    }

    /// What the visibility trigger needs to know about this list.
    pub fn load_gate(&self) -> LoadGate {
        LoadGate {
            has_next: self.list.has_next_page(),
            is_loading: self.list.in_flight().is_some(),
        }
    }

    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn now(&self) -> Instant {
        (self.clock)()
    }

    pub(crate) fn list_mut(&mut self) -> &mut PagedList<Record> {
        &mut self.list
    }

    pub(crate) fn cache_mut(&mut self) -> &mut QueryCache<Record> {
        &mut self.cache
    }

    pub(crate) fn set_mounted(&mut self, mounted: bool) {
        self.mounted = mounted;
    }

    pub(crate) fn set_banner(&mut self, banner: Option<String>) {
        self.banner = banner;
    }

    pub(crate) fn set_validation_error(&mut self, error: Option<ValidationError>) {
        self.validation_error = error;
    }

    /// Restores fresh cached pages for the current key, else requests page one.
    pub(crate) fn load_current_key(&mut self) -> Vec<Effect> {
        let now = self.now();
        if let Some(pages) = self.cache.fresh(self.list.key(), now) {
            if self.list.restore(pages) {
                engine_info!(
                    "Restored {} cached page(s) for {}",
                    self.list.pages().len(),
                    self.list.key()
                );
                return Vec::new();
            }
        }
        self.list.start().map(Effect::FetchPage).into_iter().collect()
    }

    /// Switches to `key`, discarding accumulated rows. No-op for an equal key.
    pub(crate) fn switch_key(&mut self, key: QueryKey) -> Vec<Effect> {
        if &key == self.list.key() {
            return Vec::new();
        }
        engine_info!("Query changed: {} -> {}", self.list.key(), key);
        self.list.reset(key);
        self.reset_key += 1;
        self.banner = None;
        self.mark_dirty();

        let mut effects = vec![Effect::ScrollToTop {
            reset_key: self.reset_key,
        }];
        if self.mounted {
            effects.extend(self.load_current_key());
        }
        effects
    }

    pub fn view(&self) -> ListViewModel {
        let resource = self.resource();
        let columns = resource.columns();
        let rows: Vec<RowView> = self
            .list
            .items()
            .map(|record| RowView {
                id: record.id.clone(),
                cells: columns
                    .iter()
                    .map(|column| record.field(column).unwrap_or("-").to_string())
                    .collect(),
            })
            .collect();
        let pagination = self.list.last_pagination();
        let empty_message = (self.list.has_settled()
            && rows.is_empty()
            && self.list.error().is_none())
        .then(|| resource.empty_message());

        ListViewModel {
            resource,
            columns: columns.to_vec(),
            sentinel_row: rows.len().checked_sub(1),
            loaded_count: rows.len(),
            rows,
            filters: self
                .key()
                .filters()
                .iter()
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect(),
            page_size: self.key().limit(),
            total_count: pagination.map(|p| p.total_count),
            current_page: pagination.map(|p| p.current_page),
            total_pages: pagination.map(|p| p.total_pages),
            has_next_page: self.list.has_next_page(),
            is_loading: self.list.is_loading(),
            is_fetching_next_page: self.list.is_fetching_next_page(),
            is_halted: self.list.error().is_some(),
            empty_message,
            error_banner: self.banner.clone(),
            validation_message: self.validation_error.as_ref().map(ToString::to_string),
            reset_key: self.reset_key,
        }
    }
}

impl Default for ListState {
    fn default() -> Self {
        Self::new(Resource::Students, 10)
    }
}

impl fmt::Debug for ListState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListState")
            .field("list", &self.list)
            .field("cached_keys", &self.cache.len())
            .field("mounted", &self.mounted)
            .field("reset_key", &self.reset_key)
            .field("banner", &self.banner)
            .field("validation_error", &self.validation_error)
            .field("dirty", &self.dirty)
            .finish()
    }
}
