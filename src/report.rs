// src/report.rs
use crate::monitor::RunResult;
use crate::sources::types::Record;

const RULE: &str = "------------------------------------------------------------";
const BANNER: &str = "============================================================";

/// Terminal rendering of a run; shows the top few records per source.
pub fn print_summary(result: &RunResult) {
    println!("\n{BANNER}");
    println!("DISCLOSURE MONITOR - SUMMARY");
    println!("{BANNER}");

    print_section("SEC FILINGS", &result.filings, "No recent SEC filings found.");
    print_section(
        "PRESS RELEASES",
        &result.releases,
        "No recent press releases found.",
    );
    print_section(
        "NEWS ARTICLES",
        &result.articles,
        "No recent news articles found.",
    );

    println!("\n{BANNER}");
}

fn print_section(heading: &str, records: &[Record], empty_msg: &str) {
    println!("\n{heading}");
    println!("{RULE}");
    if records.is_empty() {
        println!("{empty_msg}");
        return;
    }
    for rec in records.iter().take(5) {
        println!("\n{} - {}", rec.date, rec.title);
        println!("  Category: {} | Source: {}", rec.category.as_str(), rec.source_label);
        if !rec.url.is_empty() {
            println!("  {}", rec.url);
        }
        if let Some(summary) = &rec.summary {
            for line in summary.lines() {
                println!("    {line}");
            }
        }
    }
}
