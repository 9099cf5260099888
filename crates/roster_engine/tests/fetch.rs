use std::time::Duration;

use pretty_assertions::assert_eq;
use roster_core::{QueryKey, Resource};
use roster_engine::{
    fetch_with_retry, ApiContext, FailureKind, FetchSettings, PageFetcher, ReqwestPageFetcher,
    RetryPolicy,
};
use serde_json::{json, Value};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn page_body(resource: &str, page: u32, names: &[&str], has_next: bool) -> Value {
    let items: Vec<Value> = names
        .iter()
        .enumerate()
        .map(|(i, name)| json!({"_id": format!("{resource}-{page}-{i}"), "name": name}))
        .collect();
    json!({
        "success": true,
        "data": {
            resource: items,
            "pagination": {
                "currentPage": page,
                "totalPages": 3,
                "totalCount": 25,
                "hasNextPage": has_next,
                "hasPrevPage": page > 1,
                "limit": 10
            }
        }
    })
}

fn fetcher(server: &MockServer, context: impl FnOnce(ApiContext) -> ApiContext) -> ReqwestPageFetcher {
    let base = format!("{}/api", server.uri());
    let context = context(ApiContext::new(&base).expect("base url"));
    ReqwestPageFetcher::new(FetchSettings::default(), context).expect("client")
}

#[tokio::test]
async fn students_are_fetched_with_query_params_and_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/students"))
        .and(query_param("page", "2"))
        .and(query_param("limit", "10"))
        .and(query_param("search", "asha"))
        .and(header("authorization", "Bearer secret-token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(page_body("students", 2, &["Asha", "Ashok"], true)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = fetcher(&server, |context| context.with_token("secret-token"));
    let key = QueryKey::new(Resource::Students, 10).with_filter("search", "asha");

    let page = fetcher.fetch_page(&key, 2).await.expect("page");
    assert_eq!(page.pagination.current_page, 2);
    assert!(page.pagination.has_next_page);
    let names: Vec<_> = page.items.iter().filter_map(|r| r.field("name")).collect();
    assert_eq!(names, vec!["Asha", "Ashok"]);
    assert_eq!(page.items[0].id, "students-2-0");
}

#[tokio::test]
async fn bills_are_posted_as_json_with_center_scope() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/bills/list"))
        .and(body_json(json!({
            "page": 1,
            "limit": 10,
            "status": "unpaid",
            "centerId": "C-42"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body("bills", 1, &["B-1"], false)))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = fetcher(&server, |context| context.with_center("C-42"));
    let key = QueryKey::new(Resource::Bills, 10).with_filter("status", "unpaid");

    let page = fetcher.fetch_page(&key, 1).await.expect("page");
    assert_eq!(page.items.len(), 1);
    assert!(!page.pagination.has_next_page);
}

#[tokio::test]
async fn server_error_carries_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/centers"))
        .respond_with(
            ResponseTemplate::new(403).set_body_json(json!({"success": false, "message": "Access denied"})),
        )
        .mount(&server)
        .await;

    let fetcher = fetcher(&server, |context| context);
    let err = fetcher
        .fetch_page(&QueryKey::new(Resource::Centers, 10), 1)
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(403));
    assert_eq!(err.server_message.as_deref(), Some("Access denied"));
}

#[tokio::test]
async fn unexpected_shape_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/students"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"rows": []}})))
        .mount(&server)
        .await;

    let fetcher = fetcher(&server, |context| context);
    let err = fetcher
        .fetch_page(&QueryKey::new(Resource::Students, 10), 1)
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Decode);
}

#[tokio::test]
async fn slow_server_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/students"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_json(page_body("students", 1, &[], false)),
        )
        .mount(&server)
        .await;

    let context = ApiContext::new(&format!("{}/api", server.uri())).unwrap();
    let settings = FetchSettings {
        request_timeout: Duration::from_millis(50),
        ..FetchSettings::default()
    };
    let fetcher = ReqwestPageFetcher::new(settings, context).unwrap();
    let err = fetcher
        .fetch_page(&QueryKey::new(Resource::Students, 10), 1)
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/students"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body("students", 1, &["A"; 20], false)))
        .mount(&server)
        .await;

    let context = ApiContext::new(&format!("{}/api", server.uri())).unwrap();
    let settings = FetchSettings {
        max_bytes: 64,
        ..FetchSettings::default()
    };
    let fetcher = ReqwestPageFetcher::new(settings, context).unwrap();
    let err = fetcher
        .fetch_page(&QueryKey::new(Resource::Students, 10), 1)
        .await
        .unwrap_err();
    assert!(matches!(err.kind, FailureKind::TooLarge { max_bytes: 64, .. }));
}

#[tokio::test]
async fn server_failure_is_retried_then_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/students"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/students"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body("students", 1, &["Asha"], false)))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = fetcher(&server, |context| context);
    let policy = RetryPolicy {
        max_retries: 1,
        backoff: Duration::from_millis(5),
    };
    let page = fetch_with_retry(&fetcher, &policy, &QueryKey::new(Resource::Students, 10), 1)
        .await
        .expect("retried page");
    assert_eq!(page.items.len(), 1);
}

#[tokio::test]
async fn client_error_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/students"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Token expired"})))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = fetcher(&server, |context| context.with_token("old"));
    let policy = RetryPolicy {
        max_retries: 2,
        backoff: Duration::from_millis(5),
    };
    let err = fetch_with_retry(&fetcher, &policy, &QueryKey::new(Resource::Students, 10), 1)
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(401));
    assert_eq!(err.server_message.as_deref(), Some("Token expired"));
}
