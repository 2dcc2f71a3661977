// src/content.rs
//
// Best-effort full-text retrieval for enrichment. Any failure here means
// "no content", never a pipeline error.
use once_cell::sync::OnceCell;
use regex::Regex;
use tokio::time::Duration;

/// Best-effort full-text retrieval. Implementations return `None` on any
/// failure; errors never propagate out of this seam.
#[async_trait::async_trait]
pub trait ContentSource: Send + Sync {
    async fn fetch_content(&self, url: &str) -> Option<String>;
}

pub struct ContentFetcher {
    client: reqwest::Client,
}

impl Default for ContentFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentFetcher {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .timeout(Duration::from_secs(15))
            .build()
            .expect("reqwest client");
        Self { client }
    }
}

#[async_trait::async_trait]
impl ContentSource for ContentFetcher {
    /// Retrieve the page at `url` and reduce it to visible text.
    async fn fetch_content(&self, url: &str) -> Option<String> {
        if url.is_empty() {
            return None;
        }
        let resp = self.client.get(url).send().await.ok()?;
        let resp = resp.error_for_status().ok()?;
        let html = resp.text().await.ok()?;

        let text = extract_text(&html);
        if text.is_empty() {
            tracing::warn!(url = %url, "no visible content found in page");
            None
        } else {
            tracing::info!(url = %url, chars = text.len(), "fetched page content");
            Some(text)
        }
    }
}

/// Strip script/style, pick the most specific content container
/// (article > main > body), drop tags, decode entities, and collapse the
/// result to non-empty lines.
pub fn extract_text(html: &str) -> String {
    static RE_NOISE: OnceCell<Regex> = OnceCell::new();
    let re_noise = RE_NOISE.get_or_init(|| {
        Regex::new(r"(?is)<script\b[^>]*>.*?</script>|<style\b[^>]*>.*?</style>").unwrap()
    });
    let cleaned = re_noise.replace_all(html, " ");

    let container = pick_container(&cleaned);

    static RE_TAGS: OnceCell<Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| Regex::new(r"(?is)</?[^>]+>").unwrap());
    let stripped = re_tags.replace_all(container, "\n");
    let decoded = html_escape::decode_html_entities(&stripped);

    decoded
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn pick_container(html: &str) -> &str {
    static RE_ARTICLE: OnceCell<Regex> = OnceCell::new();
    static RE_MAIN: OnceCell<Regex> = OnceCell::new();
    static RE_BODY: OnceCell<Regex> = OnceCell::new();

    let candidates = [
        RE_ARTICLE.get_or_init(|| Regex::new(r"(?is)<article\b[^>]*>(.*?)</article>").unwrap()),
        RE_MAIN.get_or_init(|| Regex::new(r"(?is)<main\b[^>]*>(.*?)</main>").unwrap()),
        RE_BODY.get_or_init(|| Regex::new(r"(?is)<body\b[^>]*>(.*?)</body>").unwrap()),
    ];

    for re in candidates {
        if let Some(cap) = re.captures(html) {
            if let Some(m) = cap.get(1) {
                return m.as_str();
            }
        }
    }
    html
}
