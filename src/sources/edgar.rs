// src/sources/edgar.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use metrics::{counter, histogram};
use serde::Deserialize;
use tokio::sync::Mutex;
use tokio::time::{sleep, Duration, Instant};

use crate::sources::types::{Category, Record, SourceAdapter};
use crate::sources::{within_window, DateHint};

const BASE_URL: &str = "https://data.sec.gov";
/// SEC fair-access guideline is 10 requests/second; keep calls 100ms apart.
const REQUEST_SPACING: Duration = Duration::from_millis(100);

/// The submissions index returns parallel arrays indexed by position.
#[derive(Debug, Deserialize)]
struct Submissions {
    filings: FilingsBlock,
}

#[derive(Debug, Deserialize)]
struct FilingsBlock {
    recent: RecentFilings,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecentFilings {
    #[serde(default)]
    form: Vec<String>,
    #[serde(default)]
    filing_date: Vec<String>,
    #[serde(default)]
    accession_number: Vec<String>,
    #[serde(default)]
    primary_document: Vec<String>,
    #[serde(default)]
    primary_doc_description: Vec<String>,
}

enum Mode {
    Http { client: reqwest::Client },
    Fixture(String),
}

/// Fetches SEC filings from the EDGAR submissions index.
pub struct EdgarAdapter {
    cik: String,
    company: String,
    form_types: Vec<String>,
    mode: Mode,
    last_request: Mutex<Option<Instant>>,
}

impl EdgarAdapter {
    /// `email` lands in the User-Agent; EDGAR requires identifying contact info.
    pub fn new(cik: &str, company: &str, email: &str, form_types: Vec<String>) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(format!("{company} Monitor Tool ({email})"))
            .timeout(Duration::from_secs(10))
            .build()
            .expect("reqwest client");
        Self {
            cik: format_cik(cik),
            company: company.to_string(),
            form_types,
            mode: Mode::Http { client },
            last_request: Mutex::new(None),
        }
    }

    pub fn from_fixture(json: &str, cik: &str, company: &str, form_types: Vec<String>) -> Self {
        Self {
            cik: format_cik(cik),
            company: company.to_string(),
            form_types,
            mode: Mode::Fixture(json.to_string()),
            last_request: Mutex::new(None),
        }
    }

    /// Space consecutive EDGAR calls at least `REQUEST_SPACING` apart.
    async fn pace(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < REQUEST_SPACING {
                sleep(REQUEST_SPACING - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }

    fn parse_submissions(&self, body: &str, today: NaiveDate, window_days: i64) -> Result<Vec<Record>> {
        let t0 = std::time::Instant::now();
        let data: Submissions = serde_json::from_str(body).context("parsing edgar submissions json")?;
        let recent = data.filings.recent;

        let mut out = Vec::new();
        for (i, form) in recent.form.iter().enumerate() {
            if !self.form_types.iter().any(|t| t == form) {
                continue;
            }

            // Parallel arrays can be ragged on malformed payloads; skip the
            // record rather than abort the batch.
            let (Some(date_str), Some(accession), Some(primary_doc)) = (
                recent.filing_date.get(i),
                recent.accession_number.get(i),
                recent.primary_document.get(i),
            ) else {
                tracing::warn!(index = i, form = %form, "edgar row missing parallel fields, skipping");
                continue;
            };

            let Some(filing_date) = DateHint::Iso(date_str).try_date() else {
                tracing::warn!(index = i, date = %date_str, "edgar row has unparseable filingDate, skipping");
                continue;
            };
            if !within_window(filing_date, today, window_days) {
                continue;
            }

            let description = recent
                .primary_doc_description
                .get(i)
                .cloned()
                .unwrap_or_default();
            let title = if description.is_empty() {
                format!("{form} filed {date_str}")
            } else {
                description
            };

            let accession_compact = accession.replace('-', "");
            let cik_num = self.cik.trim_start_matches('0');
            let url = format!(
                "https://www.sec.gov/Archives/edgar/data/{cik_num}/{accession_compact}/{primary_doc}"
            );

            out.push(Record::new(
                title,
                filing_date,
                url,
                "SEC EDGAR",
                Category::Filing(form.clone()),
                self.company.clone(),
            ));
        }

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("source_parse_ms").record(ms);
        counter!("source_records_total").increment(out.len() as u64);
        Ok(out)
    }
}

#[async_trait]
impl SourceAdapter for EdgarAdapter {
    async fn fetch(&self, window_days: i64) -> Result<Vec<Record>> {
        let today = Utc::now().date_naive();
        match &self.mode {
            Mode::Fixture(body) => self.parse_submissions(body, today, window_days),
            Mode::Http { client } => {
                self.pace().await;
                let url = format!("{BASE_URL}/submissions/CIK{}.json", self.cik);
                tracing::info!(url = %url, "fetching edgar submissions");
                let resp = client
                    .get(&url)
                    .send()
                    .await
                    .context("edgar http get()")?
                    .error_for_status()
                    .context("edgar http status")?;
                let body = resp.text().await.context("edgar http .text()")?;
                self.parse_submissions(&body, today, window_days)
            }
        }
    }

    fn name(&self) -> &'static str {
        "SEC EDGAR"
    }
}

/// Zero-pad the CIK to 10 digits; tolerates a leading "CIK" prefix.
pub fn format_cik(cik: &str) -> String {
    let digits = cik.trim().trim_start_matches("CIK");
    format!("{digits:0>10}")
}
