// src/config.rs
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_CONFIG_PATH: &str = "MONITOR_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/monitor.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Lands in the EDGAR User-Agent; the SEC requires identifying contact info.
    pub contact_email: String,
    pub company: CompanyConfig,
    pub sources: SourcesConfig,
    pub enrichment: EnrichmentConfig,
    pub secrets: SecretsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CompanyConfig {
    pub name: String,
    pub ticker: String,
    pub cik: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub filings: FilingsConfig,
    pub releases: ReleasesConfig,
    pub articles: ArticlesConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilingsConfig {
    pub enabled: bool,
    pub types: Vec<String>,
    pub window_days: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReleasesConfig {
    pub enabled: bool,
    pub window_days: i64,
    pub feeds: Vec<FeedConfig>,
    pub ir_page: IrPageConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    pub label: String,
    pub url: String,
}

/// Known-imprecise path (bare-year dates); off unless explicitly enabled.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IrPageConfig {
    pub enabled: bool,
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ArticlesConfig {
    pub enabled: bool,
    pub window_days: i64,
    pub keywords: Vec<String>,
    pub language: String,
    pub sort_by: String,
    pub page_size: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EnrichmentConfig {
    pub enabled: bool,
    pub model: String,
    pub max_tokens: u32,
    pub filings_top: usize,
    pub releases_top: usize,
    pub articles_top: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SecretsConfig {
    /// Try the 1Password CLI before environment variables.
    pub use_vault: bool,
    pub anthropic_item: String,
    pub newsapi_item: String,
    /// Static last-resort values; normally left empty.
    pub anthropic_api_key: String,
    pub news_api_key: String,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            contact_email: "your-email@example.com".to_string(),
            company: CompanyConfig::default(),
            sources: SourcesConfig::default(),
            enrichment: EnrichmentConfig::default(),
            secrets: SecretsConfig::default(),
        }
    }
}

impl Default for CompanyConfig {
    fn default() -> Self {
        Self {
            name: "ServiceNow".to_string(),
            ticker: "NOW".to_string(),
            cik: "0001373715".to_string(),
        }
    }
}

impl Default for FilingsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            types: vec!["10-K".to_string(), "10-Q".to_string(), "8-K".to_string()],
            window_days: 90,
        }
    }
}

impl Default for ReleasesConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            window_days: 60,
            feeds: Vec::new(),
            ir_page: IrPageConfig::default(),
        }
    }
}

impl Default for ArticlesConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            window_days: 30,
            keywords: Vec::new(),
            language: "en".to_string(),
            sort_by: "publishedAt".to_string(),
            page_size: 50,
        }
    }
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model: "claude-sonnet-4-5-20250929".to_string(),
            max_tokens: 1000,
            filings_top: 3,
            releases_top: 5,
            articles_top: 5,
        }
    }
}

impl Default for SecretsConfig {
    fn default() -> Self {
        Self {
            use_vault: true,
            anthropic_item: "Anthropic API Key".to_string(),
            newsapi_item: "NewsAPI".to_string(),
            anthropic_api_key: String::new(),
            news_api_key: String::new(),
        }
    }
}

impl MonitorConfig {
    /// Load from an explicit path, `$MONITOR_CONFIG_PATH`, or the default
    /// location. Missing or unparseable config degrades to defaults with a
    /// warning; a broken config never stops a run.
    pub fn load(path: Option<&Path>) -> Self {
        let path = path
            .map(PathBuf::from)
            .or_else(|| std::env::var(ENV_CONFIG_PATH).ok().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

        match fs::read_to_string(&path) {
            Ok(s) => match toml::from_str(&s) {
                Ok(cfg) => {
                    tracing::info!(path = %path.display(), "loaded configuration");
                    cfg
                }
                Err(e) => {
                    tracing::warn!(error = %e, path = %path.display(), "config parse failed, using defaults");
                    Self::default()
                }
            },
            Err(_) => {
                tracing::warn!(path = %path.display(), "config file not found, using defaults");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_config_parses() {
        let s = r#"
            contact_email = "ir@example.com"

            [company]
            name = "ServiceNow"
            ticker = "NOW"
            cik = "1373715"

            [sources.filings]
            types = ["8-K"]
            window_days = 30

            [[sources.releases.feeds]]
            label = "Business Wire"
            url = "https://example.com/rss"

            [sources.releases.ir_page]
            enabled = true
            label = "ServiceNow IR"
            url = "https://example.com/ir"

            [sources.articles]
            keywords = ["ServiceNow", "NOW stock"]

            [enrichment]
            filings_top = 1
        "#;
        let cfg: MonitorConfig = toml::from_str(s).unwrap();
        assert_eq!(cfg.contact_email, "ir@example.com");
        assert_eq!(cfg.sources.filings.types, vec!["8-K"]);
        assert_eq!(cfg.sources.filings.window_days, 30);
        assert_eq!(cfg.sources.releases.feeds.len(), 1);
        assert!(cfg.sources.releases.ir_page.enabled);
        assert_eq!(cfg.enrichment.filings_top, 1);
        // untouched sections keep their defaults
        assert_eq!(cfg.sources.articles.window_days, 30);
        assert_eq!(cfg.enrichment.releases_top, 5);
    }

    #[test]
    fn empty_config_is_all_defaults() {
        let cfg: MonitorConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.company.name, "ServiceNow");
        assert_eq!(cfg.company.cik, "0001373715");
        assert!(cfg.sources.filings.enabled);
        assert_eq!(cfg.sources.filings.window_days, 90);
        assert_eq!(cfg.sources.releases.window_days, 60);
        assert!(!cfg.sources.releases.ir_page.enabled);
    }
}
