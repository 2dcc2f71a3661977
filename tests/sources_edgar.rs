// tests/sources_edgar.rs
//
// Fixture-driven tests for the EDGAR submissions parser: form-type filter,
// archive URL construction, title fallback, and malformed-row skipping.

use disclosure_monitor::sources::edgar::EdgarAdapter;
use disclosure_monitor::sources::types::{Category, SourceAdapter};

const SUBMISSIONS_JSON: &str = include_str!("fixtures/edgar_submissions.json");

// Fixture dates are fixed; a century-scale window keeps them in range.
const WIDE_WINDOW: i64 = 36_500;

fn adapter() -> EdgarAdapter {
    EdgarAdapter::from_fixture(
        SUBMISSIONS_JSON,
        "1373715",
        "ServiceNow",
        vec!["10-K".into(), "10-Q".into(), "8-K".into()],
    )
}

#[tokio::test]
async fn tracked_form_types_survive_and_others_are_filtered() {
    let records = adapter().fetch(WIDE_WINDOW).await.expect("fixture parse ok");

    // Fixture rows: 8-K (kept), S-8 (untracked form), 10-Q (kept),
    // 10-K with an unparseable filingDate (skipped), 8-K past the end of the
    // parallel arrays (skipped as ragged).
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].category, Category::Filing("8-K".into()));
    assert_eq!(records[1].category, Category::Filing("10-Q".into()));
}

#[tokio::test]
async fn archive_urls_use_bare_cik_and_compact_accession() {
    let records = adapter().fetch(WIDE_WINDOW).await.expect("fixture parse ok");

    assert_eq!(
        records[0].url,
        "https://www.sec.gov/Archives/edgar/data/1373715/000137371526000042/now-20260715.htm"
    );
}

#[tokio::test]
async fn missing_description_falls_back_to_form_and_date() {
    let records = adapter().fetch(WIDE_WINDOW).await.expect("fixture parse ok");

    assert_eq!(records[0].title, "Q2 2026 earnings release");
    // The 10-Q row has an empty primaryDocDescription.
    assert_eq!(records[1].title, "10-Q filed 2026-07-25");
}

#[tokio::test]
async fn garbage_body_is_a_hard_error() {
    let a = EdgarAdapter::from_fixture("not json", "1373715", "ServiceNow", vec!["8-K".into()]);
    assert!(a.fetch(WIDE_WINDOW).await.is_err());
}
