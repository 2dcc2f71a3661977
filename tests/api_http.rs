// tests/api_http.rs
//
// HTTP-level tests for the dashboard Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET /health
// - GET /api/summary before and after a refresh
// - GET /api/refresh populating the snapshot
// - GET /api/releases

use std::sync::Arc;

use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value as Json;
use tower::ServiceExt as _; // for `oneshot`

use disclosure_monitor::api::{create_router, AppState};
use disclosure_monitor::monitor::{Monitor, Windows};
use disclosure_monitor::sources::press::PressReleaseAdapter;

const BODY_LIMIT: usize = 1024 * 1024; // 1MB, safe for tests
const BUSINESSWIRE_XML: &str = include_str!("fixtures/press_businesswire.xml");

/// Router over a fixture-backed monitor: no summarizer, press feed only.
fn test_router() -> Router {
    let monitor = Monitor::new().with_releases(Box::new(
        PressReleaseAdapter::new("ServiceNow").with_feed_fixture("Business Wire", BUSINESSWIRE_XML),
    ));
    let state = AppState::new(Arc::new(monitor), Windows::uniform(36_500));
    create_router(state)
}

async fn get_json(app: Router, uri: &str) -> Json {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("build request");
    let resp = app.oneshot(req).await.expect("oneshot");
    assert_eq!(resp.status(), StatusCode::OK, "GET {uri} should be 200");
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("parse json")
}

#[tokio::test]
async fn health_returns_200_and_ok_body() {
    let app = test_router();

    let req = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .expect("build GET /health");

    let resp = app.oneshot(req).await.expect("oneshot /health");
    assert_eq!(resp.status(), StatusCode::OK, "health should be 200");

    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body");
    let text = String::from_utf8(bytes.to_vec()).expect("utf8");
    assert_eq!(text.trim(), "OK", "health body should be 'OK'");
}

#[tokio::test]
async fn summary_before_first_refresh_is_empty() {
    let app = test_router();

    let v = get_json(app, "/api/summary").await;
    assert_eq!(v["version"], 0);
    assert_eq!(v["total_filings"], 0);
    assert_eq!(v["total_releases"], 0);
    assert_eq!(v["total_articles"], 0);
    assert!(v["last_updated"].is_null());
}

#[tokio::test]
async fn refresh_populates_the_snapshot() {
    let app = test_router();

    let v = get_json(app.clone(), "/api/refresh").await;
    assert_eq!(v["status"], "success");
    assert_eq!(
        v["message"],
        "Fetched 0 filings, 2 press releases, and 0 news articles"
    );
    assert_eq!(v["version"], 1);

    // Subsequent reads see the refreshed snapshot.
    let releases = get_json(app.clone(), "/api/releases").await;
    assert_eq!(releases["releases"].as_array().map(Vec::len), Some(2));
    assert!(!releases["last_updated"].is_null());

    let summary = get_json(app, "/api/summary").await;
    assert_eq!(summary["total_releases"], 2);
    // Fixture descriptions seed the summaries even without a summarizer.
    assert_eq!(summary["releases_with_summaries"], 2);
    assert_eq!(summary["version"], 1);
}
