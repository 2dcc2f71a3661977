// src/summarize.rs
//
// Prompt routing + the LLM collaborator. The pipeline decides *when* to call
// this; failures are surfaced by the caller as visible strings, never raised.
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::time::Duration;

use crate::sources::types::Category;

/// Inputs longer than this are truncated before the provider call.
pub const MAX_CONTENT_CHARS: usize = 50_000;
const TRUNCATION_MARKER: &str = "\n\n[Content truncated...]";

const ANTHROPIC_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    AnnualReport,
    QuarterlyReport,
    CurrentReport,
    PressRelease,
    Earnings,
    General,
}

/// Map a category tag to a prompt template. Earnings outranks the
/// press/release keywords; anything unmatched falls back to General.
pub fn route_template(tag: &str) -> PromptKind {
    let t = tag.to_ascii_uppercase().replace('_', "-");
    match t.as_str() {
        "10-K" => PromptKind::AnnualReport,
        "10-Q" => PromptKind::QuarterlyReport,
        "8-K" => PromptKind::CurrentReport,
        _ if t.contains("EARNING") => PromptKind::Earnings,
        _ if t.contains("PRESS") || t.contains("RELEASE") => PromptKind::PressRelease,
        _ => PromptKind::General,
    }
}

fn template(kind: PromptKind) -> &'static str {
    match kind {
        PromptKind::AnnualReport => {
            "You are analyzing a 10-K annual report for {company}.\n\n\
             Provide a concise executive summary (3-5 bullet points) covering:\n\
             - Key financial highlights (revenue, earnings, growth)\n\
             - Major business developments or strategic initiatives\n\
             - Significant risks or challenges mentioned\n\
             - Forward-looking statements or guidance\n\n\
             Content to summarize:\n{content}\n\n\
             Format your response as clear, actionable bullet points."
        }
        PromptKind::QuarterlyReport => {
            "You are analyzing a 10-Q quarterly report for {company}.\n\n\
             Provide a concise summary (3-5 bullet points) covering:\n\
             - Quarterly financial performance (revenue, earnings, YoY/QoQ growth)\n\
             - Key business developments this quarter\n\
             - Notable risks or challenges\n\
             - Any guidance or forward-looking statements\n\n\
             Content to summarize:\n{content}\n\n\
             Format your response as clear, actionable bullet points."
        }
        PromptKind::CurrentReport => {
            "You are analyzing an 8-K current report for {company}.\n\n\
             Provide a concise summary (2-4 bullet points) of:\n\
             - The main event or announcement\n\
             - Financial impact (if disclosed)\n\
             - Strategic significance\n\
             - Key implications for the company\n\n\
             Content to summarize:\n{content}\n\n\
             Format your response as clear, actionable bullet points."
        }
        PromptKind::PressRelease => {
            "You are analyzing a press release from {company}.\n\n\
             Provide a concise summary (2-4 bullet points) covering:\n\
             - Main announcement or news\n\
             - Key figures or metrics (if any)\n\
             - Strategic importance\n\
             - Implications for the company's business\n\n\
             Content to summarize:\n{content}\n\n\
             Format your response as clear, actionable bullet points."
        }
        PromptKind::Earnings => {
            "You are analyzing an earnings announcement for {company}.\n\n\
             Provide a concise summary (4-6 bullet points) covering:\n\
             - Revenue and earnings results vs. expectations\n\
             - YoY and QoQ growth rates\n\
             - Key business metrics and highlights\n\
             - Forward guidance\n\
             - Notable concerns or risks\n\n\
             Content to summarize:\n{content}\n\n\
             Format your response as clear, actionable bullet points."
        }
        PromptKind::General => {
            "You are analyzing content about {company}.\n\n\
             Provide a concise summary (3-5 bullet points) of the key \
             information and its significance.\n\n\
             Content to summarize:\n{content}\n\n\
             Format your response as clear, actionable bullet points."
        }
    }
}

/// Cap the content length, appending a visible marker when cut.
pub fn truncate_content(content: &str) -> String {
    if content.chars().count() <= MAX_CONTENT_CHARS {
        return content.to_string();
    }
    tracing::warn!(chars = content.chars().count(), "content too long, truncating");
    let mut out: String = content.chars().take(MAX_CONTENT_CHARS).collect();
    out.push_str(TRUNCATION_MARKER);
    out
}

pub fn build_prompt(category: &Category, company: &str, content: &str) -> String {
    let kind = route_template(category.as_str());
    template(kind)
        .replace("{company}", company)
        .replace("{content}", &truncate_content(content))
}

#[async_trait]
pub trait Summarizer: Send + Sync {
    /// One synchronous request/response, no internal retry.
    async fn summarize(&self, content: &str, category: &Category, company: &str)
        -> Result<String>;
    fn name(&self) -> &'static str;
}

/// Anthropic messages API provider.
pub struct ClaudeSummarizer {
    http: reqwest::Client,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl ClaudeSummarizer {
    pub fn new(api_key: &str, model: &str, max_tokens: u32) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("disclosure-monitor/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(15))
            .build()
            .expect("reqwest client");
        Self {
            http,
            api_key: api_key.to_string(),
            model: model.to_string(),
            max_tokens,
        }
    }
}

#[async_trait]
impl Summarizer for ClaudeSummarizer {
    async fn summarize(
        &self,
        content: &str,
        category: &Category,
        company: &str,
    ) -> Result<String> {
        if self.api_key.is_empty() {
            bail!("no anthropic api key configured");
        }

        #[derive(Serialize)]
        struct Msg<'a> {
            role: &'a str,
            content: &'a str,
        }
        #[derive(Serialize)]
        struct Req<'a> {
            model: &'a str,
            max_tokens: u32,
            messages: Vec<Msg<'a>>,
        }
        #[derive(Deserialize)]
        struct Resp {
            content: Vec<Block>,
        }
        #[derive(Deserialize)]
        struct Block {
            text: String,
        }

        let prompt = build_prompt(category, company, content);
        tracing::info!(
            category = category.as_str(),
            chars = prompt.len(),
            "generating summary"
        );

        let req = Req {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: vec![Msg {
                role: "user",
                content: &prompt,
            }],
        };

        let resp = self
            .http
            .post(ANTHROPIC_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&req)
            .send()
            .await
            .context("anthropic http post()")?;

        if !resp.status().is_success() {
            bail!("anthropic api returned status {}", resp.status());
        }

        let body: Resp = resp.json().await.context("anthropic response json")?;
        let text = body
            .content
            .first()
            .map(|b| b.text.trim().to_string())
            .unwrap_or_default();
        if text.is_empty() {
            bail!("anthropic response had no text content");
        }
        Ok(text)
    }

    fn name(&self) -> &'static str {
        "claude"
    }
}

/// Deterministic provider for tests/local runs.
pub struct MockSummarizer {
    pub reply: String,
}

#[async_trait]
impl Summarizer for MockSummarizer {
    async fn summarize(
        &self,
        _content: &str,
        _category: &Category,
        _company: &str,
    ) -> Result<String> {
        Ok(self.reply.clone())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filing_tags_route_to_their_templates() {
        assert_eq!(route_template("10-K"), PromptKind::AnnualReport);
        assert_eq!(route_template("10-Q"), PromptKind::QuarterlyReport);
        assert_eq!(route_template("8-K"), PromptKind::CurrentReport);
        assert_eq!(route_template("10_k"), PromptKind::AnnualReport);
    }

    #[test]
    fn earnings_outranks_press_release_keywords() {
        assert_eq!(route_template("earnings"), PromptKind::Earnings);
        assert_eq!(
            route_template("earnings_press_release"),
            PromptKind::Earnings
        );
        assert_eq!(route_template("press_release"), PromptKind::PressRelease);
    }

    #[test]
    fn unmatched_tags_fall_back_to_general() {
        assert_eq!(route_template("general"), PromptKind::General);
        assert_eq!(route_template("S-1"), PromptKind::General);
    }

    #[test]
    fn long_content_gets_a_truncation_marker() {
        let long = "x".repeat(MAX_CONTENT_CHARS + 10);
        let out = truncate_content(&long);
        assert!(out.ends_with(TRUNCATION_MARKER));
        assert_eq!(
            out.chars().count(),
            MAX_CONTENT_CHARS + TRUNCATION_MARKER.chars().count()
        );

        let short = "short content";
        assert_eq!(truncate_content(short), short);
    }

    #[test]
    fn prompt_carries_company_and_content() {
        let p = build_prompt(
            &Category::Filing("8-K".into()),
            "ServiceNow",
            "Acquisition announced.",
        );
        assert!(p.contains("8-K current report for ServiceNow"));
        assert!(p.contains("Acquisition announced."));
    }
}
