use std::sync::Arc;

use tokio::time::Instant;
use tracing::{info, warn};

use super::parser;
use super::source::{CatalogSource, ScrapeError};

/// Best-effort catalog lookups. Every failure is logged and becomes `None`;
/// nothing here is retried.
#[derive(Clone)]
pub struct ScrapingClient {
    source: Arc<dyn CatalogSource>,
}

impl ScrapingClient {
    pub fn new(source: Arc<dyn CatalogSource>) -> Self {
        Self { source }
    }

    pub async fn scrape_classification(&self, model: &str) -> Option<String> {
        self.lookup("classification", model, parser::classification_code)
            .await
    }

    pub async fn scrape_country(&self, model: &str) -> Option<String> {
        self.lookup("country_of_origin", model, parser::country_of_origin)
            .await
    }

    async fn lookup(
        &self,
        kind: &'static str,
        model: &str,
        extract: fn(&str) -> Result<String, ScrapeError>,
    ) -> Option<String> {
        let started = Instant::now();
        let outcome = match self.source.search(model).await {
            Ok(page) => extract(&page),
            Err(err) => Err(err),
        };
        let elapsed_ms = started.elapsed().as_millis() as u64;
        match outcome {
            Ok(value) => {
                info!(kind, model, value = %value, elapsed_ms, "catalog lookup succeeded");
                Some(value)
            }
            Err(ScrapeError::Inconclusive(reason)) => {
                info!(kind, model, reason = %reason, elapsed_ms, "catalog lookup inconclusive");
                None
            }
            Err(err) => {
                warn!(kind, model, error = %err, elapsed_ms, "catalog lookup failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrape::parser::fixtures::results_page;
    use async_trait::async_trait;

    struct Fixed(Result<String, ScrapeError>);

    #[async_trait]
    impl CatalogSource for Fixed {
        async fn search(&self, _query: &str) -> Result<String, ScrapeError> {
            self.0.clone()
        }
    }

    fn client(page: Result<String, ScrapeError>) -> ScrapingClient {
        ScrapingClient::new(Arc::new(Fixed(page)))
    }

    #[tokio::test]
    async fn parses_both_fields_from_one_page() {
        let scraper = client(Ok(results_page(true, "4511190101-23642147", "(VN)")));
        assert_eq!(scraper.scrape_classification("AX40R3080WMD").await.as_deref(), Some("23642147"));
        assert_eq!(scraper.scrape_country("AX40R3080WMD").await.as_deref(), Some("Vietnam"));
    }

    #[tokio::test]
    async fn transport_errors_become_absent_fields() {
        let scraper = client(Err(ScrapeError::Timeout));
        assert_eq!(scraper.scrape_classification("M").await, None);
        assert_eq!(scraper.scrape_country("M").await, None);
    }

    #[tokio::test]
    async fn inconclusive_pages_become_absent_fields() {
        let scraper = client(Ok("<html><body>nothing</body></html>".to_string()));
        assert_eq!(scraper.scrape_country("M").await, None);
    }
}
