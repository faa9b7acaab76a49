//! Integration tests for GoogleTrendsClient using wiremock
//!
//! These tests validate the wire protocol against a mock trends server.

mod common;

use common::{explore_body, multiline_body, ranked, related_body, DAY, MAY_1};
use tendencia::models::{QueryRequest, Timeframe};
use tendencia::trends::{self, GoogleTrendsClient, QueryOutcome, TrendsApi};
use tendencia::utils::error::{FetchError, QueryError};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn json_response(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "application/json; charset=utf-8")
}

fn request(keywords: &[&str]) -> QueryRequest {
    QueryRequest::new(
        keywords.iter().map(|k| k.to_string()).collect(),
        Timeframe::LastYear,
        "MX",
    )
}

async fn mount_cookie_page(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/explore/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .mount(server)
        .await;
}

async fn mount_explore(server: &MockServer, keywords: &[&str]) {
    Mock::given(method("POST"))
        .and(path("/api/explore"))
        .respond_with(json_response(explore_body(keywords)))
        .mount(server)
        .await;
}

fn client(server: &MockServer) -> GoogleTrendsClient {
    GoogleTrendsClient::with_base_url(&server.uri(), "es-ES", 360).unwrap()
}

/// Test a complete query against the mock server
#[tokio::test]
async fn test_query_success() {
    let server = MockServer::start().await;
    mount_cookie_page(&server).await;
    mount_explore(&server, &["air fryer", "sneakers"]).await;

    Mock::given(method("GET"))
        .and(path("/api/widgetdata/multiline"))
        .and(query_param("token", "ts-token"))
        .and(query_param("tz", "360"))
        .respond_with(json_response(multiline_body(&[
            (MAY_1 + DAY, vec![40, 12], false),
            (MAY_1, vec![50, 20], false),
            (MAY_1 + 2 * DAY, vec![65, 31], true),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let top = ranked(12);
    Mock::given(method("GET"))
        .and(path("/api/widgetdata/relatedsearches"))
        .and(query_param("token", "rq-0"))
        .respond_with(json_response(related_body(Some(&top))))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/widgetdata/relatedsearches"))
        .and(query_param("token", "rq-1"))
        .respond_with(json_response(related_body(None)))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let outcome = trends::query(&client, &request(&["air fryer", "sneakers"]))
        .await
        .expect("query should succeed");

    let QueryOutcome::Data { table, related } = outcome else {
        panic!("expected data, got {outcome:?}");
    };

    assert_eq!(table.columns(), ["air fryer", "sneakers"]);
    assert_eq!(table.len(), 3);
    assert_eq!(table.rows()[0].date, common::may(1));
    assert_eq!(table.column("air fryer").unwrap(), vec![50, 40, 65]);
    assert!(table.rows()[2].is_partial);
    assert!(!table.rows()[0].is_partial);

    assert_eq!(related.keywords().collect::<Vec<_>>(), vec!["air fryer"]);
    assert_eq!(related.get("air fryer").unwrap().len(), 10);
    assert_eq!(related.get("air fryer").unwrap()[0].query, "related 0");
    assert!(!related.contains("sneakers"));
}

/// Test the explore call carries locale, timezone and the comparison items
#[tokio::test]
async fn test_explore_request_parameters() {
    let server = MockServer::start().await;
    mount_cookie_page(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/explore"))
        .and(query_param("hl", "es-ES"))
        .and(query_param("tz", "360"))
        .and(query_param(
            "req",
            r#"{"comparisonItem":[{"keyword":"air fryer","time":"today 12-m","geo":"MX"}],"category":0,"property":""}"#,
        ))
        .respond_with(json_response(explore_body(&["air fryer"])))
        .expect(1)
        .mount(&server)
        .await;

    let payload = client(&server)
        .build_payload(&request(&["air fryer"]))
        .await
        .expect("payload should build");

    assert_eq!(payload.timeseries.token, "ts-token");
    assert_eq!(payload.related.len(), 1);
    assert_eq!(payload.related[0].related_keyword(), "air fryer");
}

/// Test that a failing cookie page does not stop the query
#[tokio::test]
async fn test_cookie_priming_is_best_effort() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/explore/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    mount_explore(&server, &["air fryer"]).await;

    let result = client(&server).build_payload(&request(&["air fryer"])).await;
    assert!(result.is_ok(), "payload should build: {:?}", result.err());
}

/// Test an empty timeline ends the query without related lookups
#[tokio::test]
async fn test_empty_timeline_is_no_data() {
    let server = MockServer::start().await;
    mount_cookie_page(&server).await;
    mount_explore(&server, &["zzzz"]).await;

    Mock::given(method("GET"))
        .and(path("/api/widgetdata/multiline"))
        .respond_with(json_response(multiline_body(&[])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/widgetdata/relatedsearches"))
        .respond_with(json_response(related_body(None)))
        .expect(0)
        .mount(&server)
        .await;

    let outcome = trends::query(&client(&server), &request(&["zzzz"])).await.unwrap();
    assert_eq!(outcome, QueryOutcome::NoData);
}

/// Test 429 surfaces as a rate limit error without retry
#[tokio::test]
async fn test_rate_limit_no_retry() {
    let server = MockServer::start().await;
    mount_cookie_page(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/explore"))
        .respond_with(ResponseTemplate::new(429))
        .expect(1)
        .mount(&server)
        .await;

    let result = client(&server).build_payload(&request(&["air fryer"])).await;
    assert!(matches!(
        result,
        Err(QueryError::Fetch(FetchError::RateLimit))
    ));
}

/// Test server errors on the widget call
#[tokio::test]
async fn test_server_error() {
    let server = MockServer::start().await;
    mount_cookie_page(&server).await;
    mount_explore(&server, &["air fryer"]).await;

    Mock::given(method("GET"))
        .and(path("/api/widgetdata/multiline"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let result = trends::query(&client(&server), &request(&["air fryer"])).await;
    match result {
        Err(QueryError::Fetch(FetchError::ServerError(status))) => assert_eq!(status, 500),
        other => panic!("expected server error, got {other:?}"),
    }
}

/// Test an HTML page in place of JSON is rejected
#[tokio::test]
async fn test_html_response_rejected() {
    let server = MockServer::start().await;
    mount_cookie_page(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/explore"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("<html>consent</html>", "text/html"),
        )
        .mount(&server)
        .await;

    let result = client(&server).build_payload(&request(&["air fryer"])).await;
    match result {
        Err(QueryError::Fetch(FetchError::UnexpectedContentType(ct))) => {
            assert!(ct.starts_with("text/html"))
        }
        other => panic!("expected content type error, got {other:?}"),
    }
}

/// Test an explore answer without the timeseries widget
#[tokio::test]
async fn test_missing_timeseries_widget() {
    let server = MockServer::start().await;
    mount_cookie_page(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/explore"))
        .respond_with(json_response(")]}'\n{\"widgets\":[]}".to_string()))
        .mount(&server)
        .await;

    let result = client(&server).build_payload(&request(&["air fryer"])).await;
    assert!(matches!(result, Err(QueryError::MissingWidget("TIMESERIES"))));
}

/// Test a timeline whose rows do not match the keyword count
#[tokio::test]
async fn test_malformed_timeline() {
    let server = MockServer::start().await;
    mount_cookie_page(&server).await;
    mount_explore(&server, &["a", "b"]).await;

    Mock::given(method("GET"))
        .and(path("/api/widgetdata/multiline"))
        .respond_with(json_response(multiline_body(&[(MAY_1, vec![1], false)])))
        .mount(&server)
        .await;

    let result = trends::query(&client(&server), &request(&["a", "b"])).await;
    assert!(matches!(result, Err(QueryError::MalformedResponse(_))));
}
