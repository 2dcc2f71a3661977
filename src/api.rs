// src/api.rs
use std::sync::{Arc, RwLock};

use axum::{extract::State, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use tower_http::cors::CorsLayer;

use crate::monitor::{Monitor, RunResult, Windows};
use crate::sources::types::Record;

/// Immutable, version-stamped view of the latest run. Replaced wholesale on
/// refresh; readers clone the inner `Arc` and never see a partial update.
#[derive(Debug, Default)]
pub struct Snapshot {
    pub version: u64,
    pub result: Option<RunResult>,
}

#[derive(Clone)]
pub struct AppState {
    monitor: Arc<Monitor>,
    windows: Windows,
    snapshot: Arc<RwLock<Arc<Snapshot>>>,
}

impl AppState {
    pub fn new(monitor: Arc<Monitor>, windows: Windows) -> Self {
        Self {
            monitor,
            windows,
            snapshot: Arc::new(RwLock::new(Arc::new(Snapshot::default()))),
        }
    }

    fn load(&self) -> Arc<Snapshot> {
        self.snapshot.read().expect("rwlock poisoned").clone()
    }

    fn store(&self, result: RunResult) -> u64 {
        let mut guard = self.snapshot.write().expect("rwlock poisoned");
        let version = guard.version + 1;
        *guard = Arc::new(Snapshot {
            version,
            result: Some(result),
        });
        version
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/api/refresh", get(refresh))
        .route("/api/filings", get(get_filings))
        .route("/api/releases", get(get_releases))
        .route("/api/articles", get(get_articles))
        .route("/api/summary", get(get_summary))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(serde::Serialize)]
struct RefreshResp {
    status: &'static str,
    message: String,
    last_updated: DateTime<Utc>,
    version: u64,
}

async fn refresh(State(state): State<AppState>) -> Json<RefreshResp> {
    tracing::info!("dashboard refresh requested");
    let result = state.monitor.run(state.windows).await;
    let message = format!(
        "Fetched {} filings, {} press releases, and {} news articles",
        result.filings.len(),
        result.releases.len(),
        result.articles.len()
    );
    let last_updated = result.timestamp;
    let version = state.store(result);
    Json(RefreshResp {
        status: "success",
        message,
        last_updated,
        version,
    })
}

#[derive(serde::Serialize)]
struct FilingsResp {
    filings: Vec<Record>,
    last_updated: Option<DateTime<Utc>>,
}

async fn get_filings(State(state): State<AppState>) -> Json<FilingsResp> {
    let snap = state.load();
    Json(FilingsResp {
        filings: snap
            .result
            .as_ref()
            .map(|r| r.filings.clone())
            .unwrap_or_default(),
        last_updated: snap.result.as_ref().map(|r| r.timestamp),
    })
}

#[derive(serde::Serialize)]
struct ReleasesResp {
    releases: Vec<Record>,
    last_updated: Option<DateTime<Utc>>,
}

async fn get_releases(State(state): State<AppState>) -> Json<ReleasesResp> {
    let snap = state.load();
    Json(ReleasesResp {
        releases: snap
            .result
            .as_ref()
            .map(|r| r.releases.clone())
            .unwrap_or_default(),
        last_updated: snap.result.as_ref().map(|r| r.timestamp),
    })
}

#[derive(serde::Serialize)]
struct ArticlesResp {
    articles: Vec<Record>,
    last_updated: Option<DateTime<Utc>>,
}

async fn get_articles(State(state): State<AppState>) -> Json<ArticlesResp> {
    let snap = state.load();
    Json(ArticlesResp {
        articles: snap
            .result
            .as_ref()
            .map(|r| r.articles.clone())
            .unwrap_or_default(),
        last_updated: snap.result.as_ref().map(|r| r.timestamp),
    })
}

#[derive(serde::Serialize)]
struct SummaryResp {
    total_filings: usize,
    total_releases: usize,
    total_articles: usize,
    filings_with_summaries: usize,
    releases_with_summaries: usize,
    articles_with_summaries: usize,
    last_updated: Option<DateTime<Utc>>,
    version: u64,
}

async fn get_summary(State(state): State<AppState>) -> Json<SummaryResp> {
    let snap = state.load();
    let (filings, releases, articles) = snap
        .result
        .as_ref()
        .map(|r| {
            (
                r.filings.as_slice(),
                r.releases.as_slice(),
                r.articles.as_slice(),
            )
        })
        .unwrap_or((&[], &[], &[]));

    Json(SummaryResp {
        total_filings: filings.len(),
        total_releases: releases.len(),
        total_articles: articles.len(),
        filings_with_summaries: with_summaries(filings),
        releases_with_summaries: with_summaries(releases),
        articles_with_summaries: with_summaries(articles),
        last_updated: snap.result.as_ref().map(|r| r.timestamp),
        version: snap.version,
    })
}

fn with_summaries(records: &[Record]) -> usize {
    records.iter().filter(|r| r.summary.is_some()).count()
}
