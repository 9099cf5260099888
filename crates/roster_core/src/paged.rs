use engine_logging::{engine_debug, engine_warn};

use crate::page::{next_page_param, NextPageFn, Page, Pagination, FIRST_PAGE};
use crate::{QueryError, QueryErrorKind, QueryKey};

/// A request for one page, stamped with the list generation that issued it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub key: QueryKey,
    pub page: u32,
    pub generation: u64,
}

/// What [`PagedList::receive`] did with a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Received {
    Appended { page: u32, items: usize },
    Failed,
    /// The response belonged to an abandoned key, an old generation, or a page
    /// that was not in flight. State is untouched.
    Discarded,
}

/// Accumulated pages for one query key.
///
/// At most one page is in flight at a time, so pages are requested and
/// appended in strictly increasing order. An error halts automatic fetching
/// until [`PagedList::retry`] is called; pages already loaded stay in place.
#[derive(Debug, Clone)]
pub struct PagedList<T> {
    key: QueryKey,
    generation: u64,
    initial_page: u32,
    next_page: NextPageFn,
    pages: Vec<Page<T>>,
    in_flight: Option<u32>,
    error: Option<QueryError>,
}

impl<T> PagedList<T> {
    pub fn new(key: QueryKey) -> Self {
        Self {
            key,
            generation: 0,
            initial_page: FIRST_PAGE,
            next_page: next_page_param,
            pages: Vec::new(),
            in_flight: None,
            error: None,
        }
    }

    pub fn with_next_page(mut self, next_page: NextPageFn) -> Self {
        self.next_page = next_page;
        self
    }

    pub fn with_initial_page(mut self, page: u32) -> Self {
        self.initial_page = page;
        self
    }

    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Requests the initial page if nothing has been loaded or requested yet.
    pub fn start(&mut self) -> Option<PageRequest> {
        if !self.pages.is_empty() || self.in_flight.is_some() || self.error.is_some() {
            return None;
        }
        Some(self.issue(self.initial_page))
    }

    /// Requests the page after the last loaded one.
    ///
    /// Returns `None` without touching state while a page is in flight, when
    /// the server reported no further page, or while halted by an error.
    pub fn fetch_next_page(&mut self) -> Option<PageRequest> {
        if self.in_flight.is_some() || self.error.is_some() {
            return None;
        }
        let last = self.pages.last()?;
        let page = (self.next_page)(&last.pagination)?;
        Some(self.issue(page))
    }

    /// Clears a halting error and re-requests the page that failed.
    pub fn retry(&mut self) -> Option<PageRequest> {
        if self.in_flight.is_some() || self.error.is_none() {
            return None;
        }
        let page = match self.pages.last() {
            None => self.initial_page,
            Some(last) => (self.next_page)(&last.pagination)?,
        };
        self.error = None;
        Some(self.issue(page))
    }

    fn issue(&mut self, page: u32) -> PageRequest {
        self.in_flight = Some(page);
        engine_debug!("Requesting page {} for {} (gen {})", page, self.key, self.generation);
        PageRequest {
            key: self.key.clone(),
            page,
            generation: self.generation,
        }
    }

    pub fn receive(
        &mut self,
        request: &PageRequest,
        result: Result<Page<T>, QueryError>,
    ) -> Received {
        if request.generation != self.generation
            || request.key != self.key
            || self.in_flight != Some(request.page)
        {
            engine_debug!(
                "Discarding page {} for {} (gen {}, current gen {})",
                request.page,
                request.key,
                request.generation,
                self.generation
            );
            return Received::Discarded;
        }
        self.in_flight = None;

        match result {
            Ok(page) => {
                if let Some(last) = self.pages.last() {
                    if page.pagination.current_page <= last.pagination.current_page {
                        engine_warn!(
                            "Rejecting page {} for {}: not after page {}",
                            page.pagination.current_page,
                            self.key,
                            last.pagination.current_page
                        );
                        // Asking again would get the same answer; halt like any failure.
                        self.error = Some(QueryError::new(QueryErrorKind::Decode, None));
                        return Received::Failed;
                    }
                }
                let received = Received::Appended {
                    page: page.pagination.current_page,
                    items: page.items.len(),
                };
                self.pages.push(page);
                received
            }
            Err(err) => {
                engine_warn!("Page {} for {} failed: {}", request.page, self.key, err);
                self.error = Some(err);
                Received::Failed
            }
        }
    }

    /// Drops everything accumulated and switches to `key`.
    ///
    /// The generation is bumped even when the key is unchanged so a response
    /// still in flight is discarded when it arrives.
    pub fn reset(&mut self, key: QueryKey) {
        self.key = key;
        self.generation += 1;
        self.pages.clear();
        self.in_flight = None;
        self.error = None;
    }

    /// Seeds an empty, idle list with cached pages. Returns false if the list
    /// already holds or awaits data.
    pub fn restore(&mut self, pages: Vec<Page<T>>) -> bool {
        if !self.pages.is_empty() || self.in_flight.is_some() || pages.is_empty() {
            return false;
        }
        self.pages = pages;
        self.error = None;
        true
    }

    pub fn pages(&self) -> &[Page<T>] {
        &self.pages
    }

    pub fn items(&self) -> impl Iterator<Item = &T> + '_ {
        self.pages.iter().flat_map(|page| page.items.iter())
    }

    pub fn item_count(&self) -> usize {
        self.pages.iter().map(|page| page.items.len()).sum()
    }

    pub fn last_pagination(&self) -> Option<&Pagination> {
        self.pages.last().map(|page| &page.pagination)
    }

    pub fn has_next_page(&self) -> bool {
        self.last_pagination()
            .and_then(|pagination| (self.next_page)(pagination))
            .is_some()
    }

    /// True while the initial page is in flight.
    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some() && self.pages.is_empty()
    }

    pub fn is_fetching_next_page(&self) -> bool {
        self.in_flight.is_some() && !self.pages.is_empty()
    }

    pub fn in_flight(&self) -> Option<u32> {
        self.in_flight
    }

    pub fn error(&self) -> Option<&QueryError> {
        self.error.as_ref()
    }

    /// True once a page has been received for this generation, or a failure
    /// ended the first request.
    pub fn has_settled(&self) -> bool {
        !self.pages.is_empty() || self.error.is_some()
    }
}
