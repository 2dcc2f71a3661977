// tests/metrics_http.rs
//
// The /metrics route must render pipeline series after a run.

use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use tower::ServiceExt as _;

use disclosure_monitor::metrics::Metrics;
use disclosure_monitor::monitor::{Monitor, Windows};

#[tokio::test]
async fn metrics_endpoint_renders_pipeline_series() {
    let metrics = Metrics::init();

    // A run with no sources configured still stamps the last-run gauge.
    let monitor = Monitor::new();
    let _ = monitor.run(Windows::default()).await;

    let app = metrics.router();
    let req = Request::builder()
        .method("GET")
        .uri("/metrics")
        .body(Body::empty())
        .expect("build GET /metrics");

    let resp = app.oneshot(req).await.expect("oneshot /metrics");
    assert_eq!(resp.status(), StatusCode::OK);

    let bytes = body::to_bytes(resp.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    let text = String::from_utf8(bytes.to_vec()).expect("utf8");
    assert!(
        text.contains("monitor_last_run_ts"),
        "exposition output missing last-run gauge:\n{text}"
    );
}
