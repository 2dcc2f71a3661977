// src/monitor.rs
//
// Orchestration core: drives the three source adapters in sequence, applies
// the top-N enrichment policy, and assembles the timestamped RunResult.
// No failure here is fatal; a broken source contributes an empty list.
use chrono::{DateTime, Utc};
use metrics::{counter, gauge};
use std::sync::Arc;

use crate::content::{ContentFetcher, ContentSource};
use crate::sources::ensure_metrics_described;
use crate::sources::types::{Record, SourceAdapter};
use crate::summarize::Summarizer;

/// Sentinel placed in `summary` when full text could not be retrieved and
/// the provider supplied no description.
pub const CONTENT_UNAVAILABLE: &str = "content unavailable";

/// Per-source recency windows in days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Windows {
    pub filings_days: i64,
    pub releases_days: i64,
    pub articles_days: i64,
}

impl Default for Windows {
    fn default() -> Self {
        Self {
            filings_days: 90,
            releases_days: 60,
            articles_days: 30,
        }
    }
}

impl Windows {
    /// Same window for every source.
    pub fn uniform(days: i64) -> Self {
        Self {
            filings_days: days,
            releases_days: days,
            articles_days: days,
        }
    }

    /// Named presets exposed on the CLI.
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "week" => Some(Self::uniform(7)),
            "month" => Some(Self::uniform(30)),
            "quarter" => Some(Self::uniform(90)),
            "year" => Some(Self::uniform(365)),
            _ => None,
        }
    }
}

/// How many records per source get the full-text + summary treatment.
#[derive(Debug, Clone, Copy)]
pub struct EnrichPolicy {
    pub filings_top: usize,
    pub releases_top: usize,
    pub articles_top: usize,
}

impl Default for EnrichPolicy {
    fn default() -> Self {
        Self {
            filings_top: 3,
            releases_top: 5,
            articles_top: 5,
        }
    }
}

/// Complete output of one orchestration pass. Handed to presentation
/// read-only; never persisted.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RunResult {
    pub timestamp: DateTime<Utc>,
    pub filings: Vec<Record>,
    pub releases: Vec<Record>,
    pub articles: Vec<Record>,
}

pub struct Monitor {
    filings: Option<Box<dyn SourceAdapter>>,
    releases: Option<Box<dyn SourceAdapter>>,
    articles: Option<Box<dyn SourceAdapter>>,
    fetcher: Box<dyn ContentSource>,
    summarizer: Option<Arc<dyn Summarizer>>,
    policy: EnrichPolicy,
}

impl Default for Monitor {
    fn default() -> Self {
        Self::new()
    }
}

impl Monitor {
    pub fn new() -> Self {
        Self {
            filings: None,
            releases: None,
            articles: None,
            fetcher: Box::new(ContentFetcher::new()),
            summarizer: None,
            policy: EnrichPolicy::default(),
        }
    }

    pub fn with_filings(mut self, adapter: Box<dyn SourceAdapter>) -> Self {
        self.filings = Some(adapter);
        self
    }

    pub fn with_releases(mut self, adapter: Box<dyn SourceAdapter>) -> Self {
        self.releases = Some(adapter);
        self
    }

    pub fn with_articles(mut self, adapter: Box<dyn SourceAdapter>) -> Self {
        self.articles = Some(adapter);
        self
    }

    pub fn with_content_source(mut self, fetcher: Box<dyn ContentSource>) -> Self {
        self.fetcher = fetcher;
        self
    }

    /// Enrichment runs only when a summarizer is configured.
    pub fn with_summarizer(mut self, summarizer: Arc<dyn Summarizer>) -> Self {
        self.summarizer = Some(summarizer);
        self
    }

    pub fn with_policy(mut self, policy: EnrichPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// One full pass: each source is fetched and enriched to completion
    /// before the next begins; no source blocks another on failure.
    pub async fn run(&self, windows: Windows) -> RunResult {
        ensure_metrics_described();
        let timestamp = Utc::now();

        let filings = self
            .process(self.filings.as_deref(), windows.filings_days, self.policy.filings_top)
            .await;
        let releases = self
            .process(self.releases.as_deref(), windows.releases_days, self.policy.releases_top)
            .await;
        let articles = self
            .process(self.articles.as_deref(), windows.articles_days, self.policy.articles_top)
            .await;

        gauge!("monitor_last_run_ts").set(timestamp.timestamp().max(0) as f64);
        tracing::info!(
            filings = filings.len(),
            releases = releases.len(),
            articles = articles.len(),
            "monitor run complete"
        );

        RunResult {
            timestamp,
            filings,
            releases,
            articles,
        }
    }

    async fn process(
        &self,
        adapter: Option<&dyn SourceAdapter>,
        window_days: i64,
        top_n: usize,
    ) -> Vec<Record> {
        let Some(adapter) = adapter else {
            return Vec::new();
        };

        let mut records = match adapter.fetch(window_days).await {
            Ok(v) => {
                tracing::info!(source = adapter.name(), count = v.len(), "source fetched");
                v
            }
            Err(e) => {
                tracing::warn!(error = ?e, source = adapter.name(), "source fetch failed");
                counter!("source_errors_total").increment(1);
                return Vec::new();
            }
        };

        if let Some(summarizer) = &self.summarizer {
            self.enrich(&mut records, top_n, summarizer.as_ref()).await;
        }
        records
    }

    /// Enrich the first `top_n` records in adapter-returned order. Content
    /// misses keep a provider-supplied summary when present, else get the
    /// sentinel. A summarizer error becomes a visible string in `summary`.
    async fn enrich(&self, records: &mut [Record], top_n: usize, summarizer: &dyn Summarizer) {
        for rec in records.iter_mut().take(top_n) {
            // A successful generated summary is never redone or overwritten.
            if rec.content_fetched == Some(true) && rec.summary.is_some() {
                continue;
            }

            match self.fetcher.fetch_content(&rec.url).await {
                Some(content) => {
                    let summary = match summarizer
                        .summarize(&content, &rec.category, &rec.company)
                        .await
                    {
                        Ok(s) => {
                            counter!("enrich_summaries_total").increment(1);
                            s
                        }
                        Err(e) => {
                            tracing::warn!(error = ?e, title = %rec.title, "summarization failed");
                            format!("Error generating summary: {e:#}")
                        }
                    };
                    rec.summary = Some(summary);
                    rec.content_fetched = Some(true);
                }
                None => {
                    counter!("enrich_content_miss_total").increment(1);
                    if rec.summary.as_deref().map_or(true, str::is_empty) {
                        rec.summary = Some(CONTENT_UNAVAILABLE.to_string());
                    }
                    rec.content_fetched = Some(false);
                }
            }
        }
    }
}
