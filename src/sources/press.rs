// src/sources/press.rs
//
// Press releases come from one or more syndication feeds, merged into a
// single list. Contract: dedup by title across feeds, then sort by date
// descending. The IR-page path is a known-imprecise heuristic (bare-year
// dates) and stays behind an explicit opt-in.
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use metrics::{counter, histogram};
use once_cell::sync::OnceCell;
use quick_xml::de::from_str;
use serde::Deserialize;
use time::{format_description::well_known::Rfc2822, OffsetDateTime, UtcOffset};
use tokio::time::Duration;

use crate::sources::types::{Category, Record, SourceAdapter};
use crate::sources::{dedup_by_title, normalize_fragment, resolve_date, within_window, DateHint};

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
}

fn parse_rfc2822_date(ts: &str) -> Option<NaiveDate> {
    let dt = OffsetDateTime::parse(ts, &Rfc2822)
        .ok()?
        .to_offset(UtcOffset::UTC);
    NaiveDate::from_ymd_opt(dt.year(), u8::from(dt.month()) as u32, dt.day() as u32)
}

const EARNINGS_KEYWORDS: &[&str] = &[
    "earnings",
    "financial results",
    "quarter",
    "q1",
    "q2",
    "q3",
    "q4",
];

/// Earnings vs general, keyed on the release title.
pub fn classify_release(title: &str) -> Category {
    let t = title.to_lowercase();
    if EARNINGS_KEYWORDS.iter().any(|k| t.contains(k)) {
        Category::Earnings
    } else {
        Category::General
    }
}

enum Payload {
    Http(String),
    Fixture(String),
}

struct Feed {
    label: String,
    payload: Payload,
}

struct IrPage {
    label: String,
    payload: Payload,
}

/// Merges press releases from configured feeds (plus the optional IR page).
pub struct PressReleaseAdapter {
    company: String,
    feeds: Vec<Feed>,
    ir_page: Option<IrPage>,
    client: reqwest::Client,
}

impl PressReleaseAdapter {
    pub fn new(company: &str) -> Self {
        let client = reqwest::Client::builder()
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .timeout(Duration::from_secs(10))
            .build()
            .expect("reqwest client");
        Self {
            company: company.to_string(),
            feeds: Vec::new(),
            ir_page: None,
            client,
        }
    }

    pub fn with_feed(mut self, label: &str, url: &str) -> Self {
        self.feeds.push(Feed {
            label: label.to_string(),
            payload: Payload::Http(url.to_string()),
        });
        self
    }

    pub fn with_feed_fixture(mut self, label: &str, xml: &str) -> Self {
        self.feeds.push(Feed {
            label: label.to_string(),
            payload: Payload::Fixture(xml.to_string()),
        });
        self
    }

    /// Opt into the IR-page scrape. Dates there are bare-year guesses.
    pub fn with_ir_page(mut self, label: &str, url: &str) -> Self {
        self.ir_page = Some(IrPage {
            label: label.to_string(),
            payload: Payload::Http(url.to_string()),
        });
        self
    }

    pub fn with_ir_page_fixture(mut self, label: &str, html: &str) -> Self {
        self.ir_page = Some(IrPage {
            label: label.to_string(),
            payload: Payload::Fixture(html.to_string()),
        });
        self
    }

    async fn load(&self, payload: &Payload) -> Result<String> {
        match payload {
            Payload::Fixture(body) => Ok(body.clone()),
            Payload::Http(url) => {
                let resp = self
                    .client
                    .get(url)
                    .send()
                    .await
                    .context("press http get()")?
                    .error_for_status()
                    .context("press http status")?;
                resp.text().await.context("press http .text()")
            }
        }
    }

    fn parse_feed(
        &self,
        label: &str,
        xml: &str,
        today: NaiveDate,
        window_days: i64,
    ) -> Result<Vec<Record>> {
        let t0 = std::time::Instant::now();
        let xml_clean = scrub_html_entities_for_xml(xml);
        let rss: Rss = from_str(&xml_clean).context("parsing press rss xml")?;

        let mut out = Vec::with_capacity(rss.channel.item.len());
        for it in rss.channel.item {
            let title = normalize_fragment(it.title.as_deref().unwrap_or_default());
            if title.is_empty() {
                continue;
            }

            let Some(date) = it.pub_date.as_deref().and_then(parse_rfc2822_date) else {
                tracing::warn!(feed = label, title = %title, "unparseable pubDate, skipping entry");
                continue;
            };
            if !within_window(date, today, window_days) {
                continue;
            }

            let summary = it
                .description
                .as_deref()
                .map(normalize_fragment)
                .filter(|s| !s.is_empty());

            let category = classify_release(&title);
            let mut rec = Record::new(
                title,
                date,
                it.link.unwrap_or_default(),
                label,
                category,
                self.company.clone(),
            );
            rec.summary = summary;
            out.push(rec);
        }

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("source_parse_ms").record(ms);
        counter!("source_records_total").increment(out.len() as u64);
        Ok(out)
    }

    /// Harvest quarterly-results links from the IR page. Dates here come from
    /// the `YearInText` strategy (pinned to Jan 1) or default to today.
    fn parse_ir_page(
        &self,
        label: &str,
        base_url: &str,
        html: &str,
        today: NaiveDate,
        window_days: i64,
    ) -> Vec<Record> {
        static RE_LINK: OnceCell<regex::Regex> = OnceCell::new();
        let re = RE_LINK.get_or_init(|| {
            regex::Regex::new(r#"(?is)<a[^>]+href\s*=\s*"([^"]*(?:financial|quarter|earnings)[^"]*)"[^>]*>(.*?)</a>"#)
                .unwrap()
        });

        let mut out = Vec::new();
        for cap in re.captures_iter(html) {
            let href = cap.get(1).map(|m| m.as_str()).unwrap_or_default();
            let title = normalize_fragment(cap.get(2).map(|m| m.as_str()).unwrap_or_default());
            if title.is_empty() || href.is_empty() {
                continue;
            }

            let url = if href.starts_with('/') {
                format!("{}{}", site_origin(base_url), href)
            } else {
                href.to_string()
            };

            let date = resolve_date(&[DateHint::YearInText(&title)], today);
            if !within_window(date, today, window_days) {
                continue;
            }

            out.push(Record::new(
                title,
                date,
                url,
                label,
                Category::Earnings,
                self.company.clone(),
            ));
        }
        counter!("source_records_total").increment(out.len() as u64);
        out
    }
}

#[async_trait]
impl SourceAdapter for PressReleaseAdapter {
    async fn fetch(&self, window_days: i64) -> Result<Vec<Record>> {
        let today = Utc::now().date_naive();
        let mut all = Vec::new();

        for feed in &self.feeds {
            let body = match self.load(&feed.payload).await {
                Ok(b) => b,
                Err(e) => {
                    tracing::warn!(error = ?e, feed = %feed.label, "press feed fetch failed");
                    counter!("source_errors_total").increment(1);
                    continue;
                }
            };
            match self.parse_feed(&feed.label, &body, today, window_days) {
                Ok(mut v) => all.append(&mut v),
                Err(e) => {
                    tracing::warn!(error = ?e, feed = %feed.label, "press feed parse failed");
                    counter!("source_errors_total").increment(1);
                }
            }
        }

        if let Some(page) = &self.ir_page {
            let base_url = match &page.payload {
                Payload::Http(url) => url.as_str(),
                Payload::Fixture(_) => "",
            };
            match self.load(&page.payload).await {
                Ok(html) => {
                    let mut v = self.parse_ir_page(&page.label, base_url, &html, today, window_days);
                    all.append(&mut v);
                }
                Err(e) => {
                    tracing::warn!(error = ?e, page = %page.label, "ir page fetch failed");
                    counter!("source_errors_total").increment(1);
                }
            }
        }

        let (mut unique, dropped) = dedup_by_title(all);
        counter!("source_dedup_total").increment(dropped as u64);

        // Return contract: newest first.
        unique.sort_by(|a, b| b.date.cmp(&a.date));
        counter!("source_kept_total").increment(unique.len() as u64);
        Ok(unique)
    }

    fn name(&self) -> &'static str {
        "Press Releases"
    }
}

/// Wire services embed typographic entities in their RSS that strict XML
/// parsers reject. Replace the ones seen in practice; the five XML built-ins
/// (&amp; &lt; &gt; &quot; &apos;) must pass through untouched.
fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&trade;", "(TM)")
        .replace("&reg;", "(R)")
}

/// "https://host/path" -> "https://host"
fn site_origin(url: &str) -> String {
    if let Some(scheme_end) = url.find("://") {
        let rest = &url[scheme_end + 3..];
        if let Some(slash) = rest.find('/') {
            return url[..scheme_end + 3 + slash].to_string();
        }
    }
    url.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn earnings_keywords_classify_as_earnings() {
        assert_eq!(
            classify_release("ServiceNow Reports Second Quarter 2026 Financial Results"),
            Category::Earnings
        );
        assert_eq!(
            classify_release("Q3 earnings call scheduled"),
            Category::Earnings
        );
        assert_eq!(
            classify_release("ServiceNow Opens New Office"),
            Category::General
        );
    }

    #[test]
    fn rfc2822_dates_convert_to_naive_dates() {
        let d = parse_rfc2822_date("Tue, 18 Aug 2026 14:30:00 GMT").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2026, 8, 18).unwrap());
        assert!(parse_rfc2822_date("not a date").is_none());
    }

    #[test]
    fn entity_scrub_fixes_typographic_entities_only() {
        let raw = "Now&nbsp;Platform&trade; &ndash; Xanadu&reg; release";
        assert_eq!(
            scrub_html_entities_for_xml(raw),
            "Now Platform(TM) - Xanadu(R) release"
        );
        // XML built-ins stay for the parser to decode.
        let xml = "<title>R&amp;D &lt;update&gt;</title>";
        assert_eq!(scrub_html_entities_for_xml(xml), xml);
    }

    #[test]
    fn site_origin_keeps_scheme_and_host() {
        assert_eq!(
            site_origin("https://www.servicenow.com/company/investor-relations.html"),
            "https://www.servicenow.com"
        );
        assert_eq!(site_origin("https://host"), "https://host");
    }
}
