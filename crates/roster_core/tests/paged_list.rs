use std::sync::Once;

use pretty_assertions::assert_eq;
use roster_core::{
    Page, PageRequest, PagedList, Pagination, QueryError, QueryErrorKind, QueryKey, Received,
    Resource,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

fn key() -> QueryKey {
    QueryKey::new(Resource::Students, 10)
}

/// Serves `total` numbered items in pages of `limit`.
fn server_page(page: u32, limit: u32, total: u32) -> Page<u32> {
    let total_pages = total.div_ceil(limit);
    let start = (page - 1) * limit;
    let end = (start + limit).min(total);
    Page::new(
        (start..end).collect(),
        Pagination {
            current_page: page,
            total_pages,
            total_count: u64::from(total),
            has_next_page: page < total_pages,
            has_prev_page: page > 1,
            limit,
        },
    )
}

fn serve(list: &mut PagedList<u32>, request: &PageRequest, total: u32) -> Received {
    list.receive(request, Ok(server_page(request.page, 10, total)))
}

fn server_error() -> QueryError {
    QueryError::new(
        QueryErrorKind::Server { status: 500 },
        Some("Database unavailable".to_string()),
    )
}

#[test]
fn twenty_five_items_load_in_three_pages() {
    init_logging();
    let mut list = PagedList::new(key());
    let mut fetched = Vec::new();

    let mut next = list.start();
    while let Some(request) = next {
        fetched.push(request.page);
        assert!(matches!(serve(&mut list, &request, 25), Received::Appended { .. }));
        next = list.fetch_next_page();
    }

    assert_eq!(fetched, vec![1, 2, 3]);
    assert_eq!(list.item_count(), 25);
    assert_eq!(list.items().copied().collect::<Vec<_>>(), (0..25).collect::<Vec<_>>());
    assert!(!list.has_next_page());
    assert_eq!(list.pages()[2].items.len(), 5);
}

#[test]
fn fetch_next_page_is_noop_while_in_flight() {
    init_logging();
    let mut list = PagedList::new(key());
    let first = list.start().expect("initial request");
    serve(&mut list, &first, 25);

    let second = list.fetch_next_page().expect("page 2");
    assert!(list.is_fetching_next_page());
    assert_eq!(list.fetch_next_page(), None);
    assert_eq!(list.start(), None);
    assert_eq!(list.in_flight(), Some(2));
    assert_eq!(list.item_count(), 10);

    serve(&mut list, &second, 25);
    assert!(!list.is_fetching_next_page());
}

#[test]
fn fetch_next_page_is_noop_without_next_page() {
    init_logging();
    let mut list = PagedList::new(key());
    let first = list.start().expect("initial request");
    serve(&mut list, &first, 4);

    assert!(!list.has_next_page());
    assert_eq!(list.fetch_next_page(), None);
    assert_eq!(list.in_flight(), None);
    assert_eq!(list.item_count(), 4);
}

#[test]
fn nothing_to_fetch_next_before_first_page() {
    let mut list: PagedList<u32> = PagedList::new(key());
    assert!(!list.has_next_page());
    assert_eq!(list.fetch_next_page(), None);
    assert!(!list.is_loading());
}

#[test]
fn reset_restarts_from_page_one() {
    init_logging();
    let mut list = PagedList::new(key());
    let mut next = list.start();
    for _ in 0..2 {
        let request = next.expect("request");
        serve(&mut list, &request, 100);
        next = list.fetch_next_page();
    }
    assert_eq!(list.item_count(), 20);

    let filtered = key().with_filter("search", "asha");
    list.reset(filtered.clone());
    assert_eq!(list.item_count(), 0);
    assert_eq!(list.key(), &filtered);

    let request = list.start().expect("restart");
    assert_eq!(request.page, 1);
    assert_eq!(request.key, filtered);
}

#[test]
fn response_for_abandoned_key_is_discarded() {
    init_logging();
    let mut list = PagedList::new(key());
    let stale = list.start().expect("initial request");

    list.reset(key().with_filter("status", "approved"));
    let fresh = list.start().expect("restart");

    assert_eq!(serve(&mut list, &stale, 25), Received::Discarded);
    assert_eq!(list.item_count(), 0);
    assert!(list.is_loading());

    assert!(matches!(serve(&mut list, &fresh, 25), Received::Appended { page: 1, items: 10 }));
}

#[test]
fn same_key_reset_still_discards_in_flight_page() {
    init_logging();
    let mut list = PagedList::new(key());
    let stale = list.start().expect("initial request");
    list.reset(key());
    assert_eq!(serve(&mut list, &stale, 25), Received::Discarded);
}

#[test]
fn repeated_page_is_not_appended_twice() {
    init_logging();
    let mut list = PagedList::new(key());
    let first = list.start().expect("initial request");
    serve(&mut list, &first, 25);

    let second = list.fetch_next_page().expect("page 2");
    // Server answers page 2 with page 1's payload.
    let result = list.receive(&second, Ok(server_page(1, 10, 25)));
    assert_eq!(result, Received::Failed);
    assert_eq!(list.item_count(), 10);
    assert_eq!(list.in_flight(), None);
    assert_eq!(
        list.error().map(|err| err.kind),
        Some(QueryErrorKind::Decode)
    );

    // The list halts instead of asking for page 2 again on every trigger.
    for _ in 0..5 {
        assert_eq!(list.fetch_next_page(), None);
    }

    let retry = list.retry().expect("manual retry");
    assert_eq!(retry.page, 2);
    assert_eq!(serve(&mut list, &retry, 25), Received::Appended { page: 2, items: 10 });
    assert_eq!(list.item_count(), 20);
}

#[test]
fn error_on_page_two_keeps_page_one_and_retry_appends() {
    init_logging();
    let mut list = PagedList::new(key());
    let first = list.start().expect("initial request");
    serve(&mut list, &first, 25);

    let second = list.fetch_next_page().expect("page 2");
    assert_eq!(list.receive(&second, Err(server_error())), Received::Failed);
    assert_eq!(list.item_count(), 10);
    assert_eq!(list.error(), Some(&server_error()));

    // Automatic fetching is halted.
    assert_eq!(list.fetch_next_page(), None);

    let retry = list.retry().expect("manual retry");
    assert_eq!(retry.page, 2);
    assert_eq!(list.error(), None);
    serve(&mut list, &retry, 25);

    assert_eq!(list.item_count(), 20);
    assert_eq!(
        list.pages()
            .iter()
            .map(|page| page.pagination.current_page)
            .collect::<Vec<_>>(),
        vec![1, 2]
    );
}

#[test]
fn retry_after_first_page_failure_targets_page_one() {
    init_logging();
    let mut list: PagedList<u32> = PagedList::new(key());
    let first = list.start().expect("initial request");
    list.receive(&first, Err(server_error()));

    assert!(list.has_settled());
    assert_eq!(list.start(), None);
    assert_eq!(list.retry().map(|request| request.page), Some(1));
    assert_eq!(list.retry(), None);
}

#[test]
fn custom_next_page_rule_is_used() {
    init_logging();
    let mut list = PagedList::new(key())
        .with_initial_page(0)
        .with_next_page(|pagination| {
            (pagination.current_page + 1 < pagination.total_pages)
                .then_some(pagination.current_page + 1)
        });
    let first = list.start().expect("initial request");
    assert_eq!(first.page, 0);

    let page = Page::new(
        vec![1, 2],
        Pagination {
            current_page: 0,
            total_pages: 2,
            ..Pagination::default()
        },
    );
    list.receive(&first, Ok(page));
    assert_eq!(list.fetch_next_page().map(|request| request.page), Some(1));
}
