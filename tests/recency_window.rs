// tests/recency_window.rs
//
// Window filtering against "today": records on the boundary stay, records
// one day past it go. The fixture body is built at test time so the dates
// track the wall clock.

use chrono::{Duration, Utc};

use disclosure_monitor::sources::edgar::EdgarAdapter;
use disclosure_monitor::sources::types::SourceAdapter;

fn submissions_with_ages(ages_days: &[i64]) -> String {
    let today = Utc::now().date_naive();
    let dates: Vec<String> = ages_days
        .iter()
        .map(|n| format!("\"{}\"", (today - Duration::days(*n)).format("%Y-%m-%d")))
        .collect();
    let n = ages_days.len();
    let quoted = |prefix: &str| -> String {
        (0..n)
            .map(|i| format!("\"{prefix}{i}\""))
            .collect::<Vec<_>>()
            .join(",")
    };
    format!(
        r#"{{"filings":{{"recent":{{
            "form":[{forms}],
            "filingDate":[{dates}],
            "accessionNumber":[{accessions}],
            "primaryDocument":[{docs}],
            "primaryDocDescription":[{descs}]
        }}}}}}"#,
        forms = (0..n).map(|_| "\"8-K\"".to_string()).collect::<Vec<_>>().join(","),
        dates = dates.join(","),
        accessions = quoted("0001373715-26-00000"),
        docs = quoted("doc"),
        descs = quoted("desc"),
    )
}

#[tokio::test]
async fn records_older_than_the_window_are_dropped() {
    let body = submissions_with_ages(&[5, 40, 95]);
    let adapter = EdgarAdapter::from_fixture(&body, "1373715", "ServiceNow", vec!["8-K".into()]);

    let records = adapter.fetch(90).await.expect("fixture parse ok");
    assert_eq!(records.len(), 2, "95-day-old filing must be excluded");
}

#[tokio::test]
async fn the_window_boundary_is_inclusive() {
    let body = submissions_with_ages(&[90, 91]);
    let adapter = EdgarAdapter::from_fixture(&body, "1373715", "ServiceNow", vec!["8-K".into()]);

    let records = adapter.fetch(90).await.expect("fixture parse ok");
    assert_eq!(records.len(), 1, "exactly-90-days-old stays, 91 goes");
}
