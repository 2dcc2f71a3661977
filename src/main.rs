//! Disclosure Monitor — Binary Entrypoint
//! Runs the aggregation pipeline once (default) or serves the JSON dashboard.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use disclosure_monitor::config::MonitorConfig;
use disclosure_monitor::monitor::{EnrichPolicy, Monitor, Windows};
use disclosure_monitor::secrets::{SecretsManager, ENV_ANTHROPIC_KEY, ENV_NEWS_API_KEY};
use disclosure_monitor::sources::edgar::EdgarAdapter;
use disclosure_monitor::sources::news::NewsAdapter;
use disclosure_monitor::sources::press::PressReleaseAdapter;
use disclosure_monitor::summarize::ClaudeSummarizer;
use disclosure_monitor::{api, metrics, report};

#[derive(Parser)]
#[command(name = "disclosure-monitor", version, about = "Aggregates SEC filings, press releases, and news for a tracked company")]
struct Cli {
    /// Path to the TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Named time-period preset applied to every source
    #[arg(long, value_parser = ["week", "month", "quarter", "year"])]
    period: Option<String>,

    /// Universal day-count override for every source
    #[arg(long)]
    days: Option<i64>,

    /// Recency window for SEC filings, in days
    #[arg(long)]
    filings_days: Option<i64>,

    /// Recency window for press releases, in days
    #[arg(long)]
    releases_days: Option<i64>,

    /// Recency window for news articles, in days
    #[arg(long)]
    articles_days: Option<i64>,

    /// Skip AI summarization even when credentials are available
    #[arg(long)]
    no_summaries: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch everything once and print a summary (the default)
    Run,
    /// Serve the read-only JSON dashboard
    Serve {
        #[arg(long, default_value_t = 5000)]
        port: u16,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("disclosure_monitor=info,warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

/// CLI flags override config windows: preset, then the universal day count,
/// then per-source day counts.
fn resolve_windows(cli: &Cli, cfg: &MonitorConfig) -> Windows {
    let mut windows = Windows {
        filings_days: cfg.sources.filings.window_days,
        releases_days: cfg.sources.releases.window_days,
        articles_days: cfg.sources.articles.window_days,
    };
    if let Some(preset) = cli.period.as_deref().and_then(Windows::preset) {
        windows = preset;
    }
    if let Some(days) = cli.days {
        windows = Windows::uniform(days);
    }
    if let Some(d) = cli.filings_days {
        windows.filings_days = d;
    }
    if let Some(d) = cli.releases_days {
        windows.releases_days = d;
    }
    if let Some(d) = cli.articles_days {
        windows.articles_days = d;
    }
    windows
}

fn build_monitor(cfg: &MonitorConfig, no_summaries: bool) -> Monitor {
    let secrets = SecretsManager::new(cfg.secrets.use_vault);
    let company = &cfg.company.name;
    let mut monitor = Monitor::new().with_policy(EnrichPolicy {
        filings_top: cfg.enrichment.filings_top,
        releases_top: cfg.enrichment.releases_top,
        articles_top: cfg.enrichment.articles_top,
    });

    if cfg.sources.filings.enabled {
        monitor = monitor.with_filings(Box::new(EdgarAdapter::new(
            &cfg.company.cik,
            company,
            &cfg.contact_email,
            cfg.sources.filings.types.clone(),
        )));
    } else {
        tracing::info!("sec filings source is disabled");
    }

    if cfg.sources.releases.enabled {
        let mut adapter = PressReleaseAdapter::new(company);
        for feed in &cfg.sources.releases.feeds {
            adapter = adapter.with_feed(&feed.label, &feed.url);
        }
        if cfg.sources.releases.ir_page.enabled {
            tracing::warn!("ir page scrape enabled; its dates are bare-year guesses");
            adapter = adapter.with_ir_page(
                &cfg.sources.releases.ir_page.label,
                &cfg.sources.releases.ir_page.url,
            );
        }
        monitor = monitor.with_releases(Box::new(adapter));
    } else {
        tracing::info!("press release source is disabled");
    }

    if cfg.sources.articles.enabled {
        match secrets.resolve(
            "NewsAPI Key",
            &cfg.secrets.newsapi_item,
            ENV_NEWS_API_KEY,
            &cfg.secrets.news_api_key,
        ) {
            Some(key) => {
                monitor = monitor.with_articles(Box::new(NewsAdapter::new(
                    company,
                    &key,
                    cfg.sources.articles.keywords.clone(),
                    &cfg.sources.articles.language,
                    &cfg.sources.articles.sort_by,
                    cfg.sources.articles.page_size,
                )));
            }
            None => tracing::warn!("news source disabled for this run: no api key"),
        }
    } else {
        tracing::info!("news article source is disabled");
    }

    if cfg.enrichment.enabled && !no_summaries {
        match secrets.resolve(
            "Claude API Key",
            &cfg.secrets.anthropic_item,
            ENV_ANTHROPIC_KEY,
            &cfg.secrets.anthropic_api_key,
        ) {
            Some(key) => {
                monitor = monitor.with_summarizer(Arc::new(ClaudeSummarizer::new(
                    &key,
                    &cfg.enrichment.model,
                    cfg.enrichment.max_tokens,
                )));
            }
            None => tracing::warn!("summarization disabled for this run: no api key"),
        }
    }

    monitor
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op elsewhere.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();
    let cfg = MonitorConfig::load(cli.config.as_deref());
    let windows = resolve_windows(&cli, &cfg);
    let monitor = build_monitor(&cfg, cli.no_summaries);

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => {
            let result = monitor.run(windows).await;
            report::print_summary(&result);
        }
        Command::Serve { port } => {
            let prometheus = metrics::Metrics::init();
            let state = api::AppState::new(Arc::new(monitor), windows);
            let router = api::create_router(state).merge(prometheus.router());

            let addr = format!("0.0.0.0:{port}");
            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .with_context(|| format!("binding {addr}"))?;
            tracing::info!(addr = %addr, "dashboard listening");
            axum::serve(listener, router).await.context("serving dashboard")?;
        }
    }

    Ok(())
}
