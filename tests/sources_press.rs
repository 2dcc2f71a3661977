// tests/sources_press.rs
//
// Press release merging: multiple feeds, cross-feed title dedup, date-desc
// ordering, and the opt-in IR-page scrape with its bare-year dates.

use chrono::NaiveDate;

use disclosure_monitor::sources::press::PressReleaseAdapter;
use disclosure_monitor::sources::types::{Category, SourceAdapter};

const BUSINESSWIRE_XML: &str = include_str!("fixtures/press_businesswire.xml");
const PRNEWSWIRE_XML: &str = include_str!("fixtures/press_prnewswire.xml");
const IR_PAGE_HTML: &str = include_str!("fixtures/ir_page.html");

const WIDE_WINDOW: i64 = 36_500;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

#[tokio::test]
async fn feeds_merge_dedup_and_sort_newest_first() {
    let adapter = PressReleaseAdapter::new("ServiceNow")
        .with_feed_fixture("Business Wire", BUSINESSWIRE_XML)
        .with_feed_fixture("PR Newswire", PRNEWSWIRE_XML);

    let records = adapter.fetch(WIDE_WINDOW).await.expect("fixture parse ok");

    // 3 + 2 fixture items, minus one broken pubDate, minus one cross-feed
    // duplicate of the quarterly results title.
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].title, "ServiceNow Named a Leader in Workflow Automation");
    assert_eq!(records[0].date, d(2026, 8, 10));
    assert_eq!(records[1].date, d(2026, 8, 5));
    assert_eq!(records[2].date, d(2026, 7, 22));

    // Duplicate resolution keeps the first feed's copy.
    assert_eq!(records[2].source_label, "Business Wire");
}

#[tokio::test]
async fn earnings_titles_classify_and_descriptions_seed_summaries() {
    let adapter =
        PressReleaseAdapter::new("ServiceNow").with_feed_fixture("Business Wire", BUSINESSWIRE_XML);

    let records = adapter.fetch(WIDE_WINDOW).await.expect("fixture parse ok");

    let earnings = records
        .iter()
        .find(|r| r.title.contains("Financial Results"))
        .expect("quarterly results entry present");
    assert_eq!(earnings.category, Category::Earnings);
    // Embedded markup and entities are normalized away.
    assert_eq!(
        earnings.summary.as_deref(),
        Some("Subscription revenues of $3.2 billion, up 21% year over year.")
    );

    let general = records
        .iter()
        .find(|r| r.title.contains("Dublin"))
        .expect("office entry present");
    assert_eq!(general.category, Category::General);
}

#[tokio::test]
async fn one_broken_feed_does_not_sink_the_other() {
    let adapter = PressReleaseAdapter::new("ServiceNow")
        .with_feed_fixture("Broken", "<rss><channel><item><title>x")
        .with_feed_fixture("PR Newswire", PRNEWSWIRE_XML);

    let records = adapter.fetch(WIDE_WINDOW).await.expect("degraded fetch ok");
    assert_eq!(records.len(), 2);
}

#[tokio::test]
async fn ir_page_links_get_bare_year_dates_and_earnings_category() {
    let adapter =
        PressReleaseAdapter::new("ServiceNow").with_ir_page_fixture("ServiceNow IR", IR_PAGE_HTML);

    let records = adapter.fetch(WIDE_WINDOW).await.expect("fixture parse ok");

    // Only hrefs mentioning financial/quarter/earnings qualify.
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.category == Category::Earnings));
    assert!(records
        .iter()
        .any(|r| r.title == "Second Quarter 2026 Financial Results" && r.date == d(2026, 1, 1)));
    assert!(records
        .iter()
        .any(|r| r.url == "https://ir.servicenow.com/earnings/q1-2026"));
}
