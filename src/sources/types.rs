// src/sources/types.rs
use anyhow::Result;
use chrono::NaiveDate;

/// Classification used to pick a summarization template.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Earnings,
    General,
    /// Raw filing form type, e.g. "10-K", "8-K".
    #[serde(untagged)]
    Filing(String),
}

impl Category {
    pub fn as_str(&self) -> &str {
        match self {
            Category::Earnings => "earnings",
            Category::General => "general",
            Category::Filing(tag) => tag,
        }
    }
}

/// One normalized disclosure/news item, regardless of origin.
///
/// `summary` may carry a provider-supplied description straight out of
/// normalization; enrichment replaces it at most once with generated prose.
/// `content_fetched` is set only by the enrichment step.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Record {
    pub title: String,
    pub date: NaiveDate,
    pub url: String,
    pub source_label: String,
    pub category: Category,
    pub company: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_fetched: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Record {
    /// Bare record with the required fields; optionals start absent.
    pub fn new(
        title: impl Into<String>,
        date: NaiveDate,
        url: impl Into<String>,
        source_label: impl Into<String>,
        category: Category,
        company: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            date,
            url: url.into(),
            source_label: source_label.into(),
            category,
            company: company.into(),
            summary: None,
            content_fetched: None,
            author: None,
            image_url: None,
        }
    }
}

#[async_trait::async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Fetch and normalize records no older than `window_days` days.
    /// Partial upstream failures degrade to whatever parsed; a hard failure
    /// is reported as `Err` and treated as an empty batch by the caller.
    async fn fetch(&self, window_days: i64) -> Result<Vec<Record>>;
    fn name(&self) -> &'static str;
}
