// src/sources/news.rs
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::{Duration as Days, NaiveDate, Utc};
use metrics::{counter, histogram};
use serde::Deserialize;
use tokio::time::Duration;

use crate::sources::types::{Category, Record, SourceAdapter};
use crate::sources::{normalize_fragment, resolve_date, within_window, DateHint};

const BASE_URL: &str = "https://newsapi.org/v2/everything";
const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Deserialize)]
struct NewsResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Vec<ApiArticle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiArticle {
    #[serde(default)]
    source: ApiSource,
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    author: Option<String>,
    published_at: Option<String>,
    url_to_image: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiSource {
    name: Option<String>,
}

enum Mode {
    Http { client: reqwest::Client, api_key: String },
    Fixture(String),
}

/// Fetches news articles from the NewsAPI `everything` search.
pub struct NewsAdapter {
    company: String,
    keywords: Vec<String>,
    language: String,
    sort_by: String,
    page_size: u32,
    mode: Mode,
}

impl NewsAdapter {
    pub fn new(
        company: &str,
        api_key: &str,
        keywords: Vec<String>,
        language: &str,
        sort_by: &str,
        page_size: u32,
    ) -> Self {
        let client = reqwest::Client::builder()
            .user_agent("disclosure-monitor/0.1")
            .timeout(Duration::from_secs(10))
            .build()
            .expect("reqwest client");
        Self {
            company: company.to_string(),
            keywords,
            language: language.to_string(),
            sort_by: sort_by.to_string(),
            page_size: page_size.min(MAX_PAGE_SIZE),
            mode: Mode::Http {
                client,
                api_key: api_key.to_string(),
            },
        }
    }

    pub fn from_fixture(company: &str, keywords: Vec<String>, json: &str) -> Self {
        Self {
            company: company.to_string(),
            keywords,
            language: "en".to_string(),
            sort_by: "publishedAt".to_string(),
            page_size: 50,
            mode: Mode::Fixture(json.to_string()),
        }
    }

    /// Single search query, keywords OR-joined; defaults to the company name.
    fn query(&self) -> String {
        if self.keywords.is_empty() {
            self.company.clone()
        } else {
            self.keywords.join(" OR ")
        }
    }

    fn parse_response(&self, body: &str, today: NaiveDate, window_days: i64) -> Result<Vec<Record>> {
        let t0 = std::time::Instant::now();
        let data: NewsResponse = serde_json::from_str(body).context("parsing newsapi json")?;

        if data.status != "ok" {
            bail!(
                "newsapi error: {}",
                data.message.as_deref().unwrap_or("unknown error")
            );
        }

        let mut out = Vec::with_capacity(data.articles.len());
        for art in data.articles {
            let title = normalize_fragment(art.title.as_deref().unwrap_or_default());
            if title.is_empty() {
                continue;
            }

            let raw_ts = art.published_at.as_deref().unwrap_or_default();
            let date = resolve_date(
                &[DateHint::Rfc3339(raw_ts), DateHint::TimestampPrefix(raw_ts)],
                today,
            );
            if !within_window(date, today, window_days) {
                continue;
            }

            let mut rec = Record::new(
                title,
                date,
                art.url.unwrap_or_default(),
                art.source.name.as_deref().unwrap_or("Unknown"),
                Category::General,
                self.company.clone(),
            );
            rec.summary = art
                .description
                .as_deref()
                .map(normalize_fragment)
                .filter(|s| !s.is_empty());
            rec.author = art.author.filter(|a| !a.is_empty());
            rec.image_url = art.url_to_image.filter(|u| !u.is_empty());
            out.push(rec);
        }

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("source_parse_ms").record(ms);
        counter!("source_records_total").increment(out.len() as u64);
        Ok(out)
    }
}

#[async_trait]
impl SourceAdapter for NewsAdapter {
    async fn fetch(&self, window_days: i64) -> Result<Vec<Record>> {
        let today = Utc::now().date_naive();
        match &self.mode {
            Mode::Fixture(body) => self.parse_response(body, today, window_days),
            Mode::Http { client, api_key } => {
                if api_key.is_empty() {
                    bail!("no api key available for newsapi");
                }

                let from = (today - Days::days(window_days)).format("%Y-%m-%d").to_string();
                let to = today.format("%Y-%m-%d").to_string();
                let query = self.query();
                tracing::info!(query = %query, from = %from, to = %to, "fetching news articles");

                let resp = client
                    .get(BASE_URL)
                    .query(&[
                        ("q", query.as_str()),
                        ("from", from.as_str()),
                        ("to", to.as_str()),
                        ("language", self.language.as_str()),
                        ("sortBy", self.sort_by.as_str()),
                        ("pageSize", &self.page_size.to_string()),
                        ("apiKey", api_key.as_str()),
                    ])
                    .send()
                    .await
                    .context("newsapi http get()")?
                    .error_for_status()
                    .context("newsapi http status")?;

                let body = resp.text().await.context("newsapi http .text()")?;
                self.parse_response(&body, today, window_days)
            }
        }
    }

    fn name(&self) -> &'static str {
        "News Articles"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_are_or_joined() {
        let a = NewsAdapter::from_fixture(
            "ServiceNow",
            vec!["ServiceNow".into(), "NOW stock".into()],
            "{}",
        );
        assert_eq!(a.query(), "ServiceNow OR NOW stock");

        let b = NewsAdapter::from_fixture("ServiceNow", vec![], "{}");
        assert_eq!(b.query(), "ServiceNow");
    }

    #[tokio::test]
    async fn non_ok_status_is_an_error() {
        let body = r#"{"status":"error","message":"apiKeyInvalid"}"#;
        let a = NewsAdapter::from_fixture("ServiceNow", vec![], body);
        let err = a.fetch(30).await.unwrap_err();
        assert!(err.to_string().contains("apiKeyInvalid"));
    }
}
