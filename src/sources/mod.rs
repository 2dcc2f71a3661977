// src/sources/mod.rs
pub mod edgar;
pub mod news;
pub mod press;
pub mod types;

use chrono::{Duration, NaiveDate};
use metrics::{describe_counter, describe_gauge, describe_histogram};
use once_cell::sync::OnceCell;
use std::collections::HashSet;

use crate::sources::types::Record;

/// One-time metrics registration (so series show up on /metrics).
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("source_records_total", "Records parsed from sources.");
        describe_counter!(
            "source_kept_total",
            "Records kept after window filter + dedup."
        );
        describe_counter!("source_dedup_total", "Records removed as title duplicates.");
        describe_counter!("source_errors_total", "Source fetch/parse errors.");
        describe_histogram!("source_parse_ms", "Source parse time in milliseconds.");
        describe_counter!(
            "enrich_summaries_total",
            "Generated summaries attached to records."
        );
        describe_counter!(
            "enrich_content_miss_total",
            "Enrichment attempts where full text could not be retrieved."
        );
        describe_gauge!("monitor_last_run_ts", "Unix ts of the last pipeline run.");
    });
}

/// Normalize a feed/page text fragment: decode HTML entities, strip tags,
/// collapse whitespace, trim.
pub fn normalize_fragment(s: &str) -> String {
    let mut out = html_escape::decode_html_entities(s).to_string();

    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, " ").to_string();

    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();

    out.trim().to_string()
}

/// One step in the ordered date-derivation chain. Strategies are evaluated
/// in sequence; the first confident hit wins. `resolve_date` falls back to
/// `today` when the whole chain defers, so a record date is never absent.
#[derive(Debug, Clone, Copy)]
pub enum DateHint<'a> {
    /// Structured publish date, `YYYY-MM-DD`.
    Iso(&'a str),
    /// RFC3339 timestamp (e.g. NewsAPI `publishedAt`).
    Rfc3339(&'a str),
    /// First 10 characters of a raw timestamp, read as `YYYY-MM-DD`.
    TimestampPrefix(&'a str),
    /// Bare year extracted from free text, pinned to Jan 1.
    /// Low confidence; only used on explicitly opted-in paths.
    YearInText(&'a str),
}

impl DateHint<'_> {
    /// A confident date, or `None` to defer to the next strategy.
    pub fn try_date(&self) -> Option<NaiveDate> {
        match self {
            DateHint::Iso(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok(),
            DateHint::Rfc3339(s) => chrono::DateTime::parse_from_rfc3339(s.trim())
                .ok()
                .map(|dt| dt.date_naive()),
            DateHint::TimestampPrefix(s) => {
                let prefix: String = s.trim().chars().take(10).collect();
                NaiveDate::parse_from_str(&prefix, "%Y-%m-%d").ok()
            }
            DateHint::YearInText(s) => {
                static RE_YEAR: OnceCell<regex::Regex> = OnceCell::new();
                let re = RE_YEAR.get_or_init(|| regex::Regex::new(r"\b(20\d{2})\b").unwrap());
                let year: i32 = re.captures(s)?.get(1)?.as_str().parse().ok()?;
                NaiveDate::from_ymd_opt(year, 1, 1)
            }
        }
    }
}

/// Walk the fallback chain in order; `today` is the stand-in of last resort.
pub fn resolve_date(chain: &[DateHint<'_>], today: NaiveDate) -> NaiveDate {
    chain.iter().find_map(DateHint::try_date).unwrap_or(today)
}

/// Inclusive recency check: a record dated exactly `today - window_days`
/// is retained.
pub fn within_window(date: NaiveDate, today: NaiveDate, window_days: i64) -> bool {
    date >= today - Duration::days(window_days)
}

/// Drop records whose title was already seen, keeping first occurrence.
/// Returns the survivors and the number of duplicates removed.
pub fn dedup_by_title(records: Vec<Record>) -> (Vec<Record>, usize) {
    let mut seen: HashSet<String> = HashSet::new();
    let mut kept = Vec::with_capacity(records.len());
    let mut dropped = 0usize;
    for rec in records {
        if seen.insert(rec.title.clone()) {
            kept.push(rec);
        } else {
            dropped += 1;
        }
    }
    (kept, dropped)
}
