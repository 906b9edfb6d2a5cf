use std::time::Duration;

use async_trait::async_trait;
use rand::seq::SliceRandom;
use rand::Rng;
use reqwest::{Client, Url};
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_SEARCH_URL: &str = "https://goods.g2b.go.kr:8053/search/unifiedSearch.do";

const USER_AGENTS: [&str; 2] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/125.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/125.0.0.0 Safari/537.36",
];

#[derive(Clone, Debug, Error)]
pub enum ScrapeError {
    #[error("catalog request failed: {0}")]
    Http(String),

    #[error("catalog request timed out")]
    Timeout,

    #[error("catalog answered with status {0}")]
    Status(u16),

    #[error("inconclusive: {0}")]
    Inconclusive(String),
}

#[derive(Clone, Debug)]
pub struct ScrapeConfig {
    pub base_url: String,
    pub timeout: Duration,
    /// Minimum politeness delay before each request; up to the same amount
    /// again is added at random.
    pub jitter: Duration,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SEARCH_URL.to_string(),
            timeout: Duration::from_secs(10),
            jitter: Duration::from_millis(1000),
        }
    }
}

/// Source of catalog search result pages.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn search(&self, query: &str) -> Result<String, ScrapeError>;
}

pub struct HttpCatalogSource {
    cfg: ScrapeConfig,
    client: Client,
}

impl HttpCatalogSource {
    pub fn new(cfg: ScrapeConfig) -> Result<Self, ScrapeError> {
        let client = Client::builder()
            .timeout(cfg.timeout)
            .build()
            .map_err(|err| ScrapeError::Http(err.to_string()))?;
        Ok(Self { cfg, client })
    }

    fn politeness_delay(&self) -> Duration {
        let base = self.cfg.jitter.as_millis() as u64;
        if base == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(base + rand::thread_rng().gen_range(0..=base))
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogSource {
    async fn search(&self, query: &str) -> Result<String, ScrapeError> {
        let url = Url::parse_with_params(&self.cfg.base_url, &[("searchWord", query)])
            .map_err(|err| ScrapeError::Http(err.to_string()))?;
        let user_agent = USER_AGENTS
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(USER_AGENTS[0]);
        let delay = self.politeness_delay();

        tokio::time::sleep(delay).await;
        debug!(%url, "scraping catalog");

        let resp = self
            .client
            .get(url)
            .header("User-Agent", user_agent)
            .header("Referer", self.cfg.base_url.as_str())
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    ScrapeError::Timeout
                } else {
                    ScrapeError::Http(err.to_string())
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ScrapeError::Status(status.as_u16()));
        }
        resp.text().await.map_err(|err| ScrapeError::Http(err.to_string()))
    }
}
