//! Menu extraction service orchestrating the pipeline
//!
//! Ties the snapshot provider, the extractor, and metrics together. Each
//! call owns its own snapshot and category cursor; concurrent requests are
//! fully independent apart from the shared browser pool and a concurrency
//! limit.

use crate::{
    BrowserPool, ChromeSnapshotProvider, Config, MenuExtractor, MenuRecord, Metrics, ScrapeError,
    SnapshotProvider,
};
use scraper::Html;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{error, info};
use uuid::Uuid;

/// Renders menu pages and extracts their records.
///
/// # Examples
///
/// ```rust,no_run
/// use menu_scraper::{Config, MenuService};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let service = MenuService::new(Config::default()).await?;
///     let records = service.fetch_menu("https://example.com/menu").await?;
///     println!("Extracted {} menu items", records.len());
///     service.shutdown().await;
///     Ok(())
/// }
/// ```
pub struct MenuService {
    provider: Arc<dyn SnapshotProvider>,
    extractor: MenuExtractor,
    metrics: Arc<Metrics>,
    concurrency_limiter: Arc<Semaphore>,
    pool: Option<Arc<BrowserPool>>,
}

impl MenuService {
    /// Creates a service backed by a headless Chrome pool.
    pub async fn new(config: Config) -> Result<Self, ScrapeError> {
        let provider = ChromeSnapshotProvider::new(config.clone()).await?;
        let pool = provider.pool();
        Self::build(config, Arc::new(provider), Some(pool))
    }

    /// Creates a service over an arbitrary snapshot provider. Used by tests
    /// to run the full pipeline against in-memory HTML without a browser.
    pub fn with_provider(
        config: Config,
        provider: Arc<dyn SnapshotProvider>,
    ) -> Result<Self, ScrapeError> {
        Self::build(config, provider, None)
    }

    fn build(
        config: Config,
        provider: Arc<dyn SnapshotProvider>,
        pool: Option<Arc<BrowserPool>>,
    ) -> Result<Self, ScrapeError> {
        Ok(Self {
            provider,
            extractor: MenuExtractor::new(&config.selectors)?,
            metrics: Arc::new(Metrics::new()),
            concurrency_limiter: Arc::new(Semaphore::new(config.max_concurrent_extractions)),
            pool,
        })
    }

    /// Renders `url` and extracts its menu records.
    ///
    /// Render failures (navigation errors, timeouts, dead browsers) are
    /// logged and absorbed into an empty record list so the caller can map
    /// them to a "no data" outcome instead of a hard fault. A page that
    /// loads but shows no cards is not a failure at all; it simply yields
    /// zero records.
    pub async fn fetch_menu(&self, url: &str) -> Result<Vec<MenuRecord>, ScrapeError> {
        crate::validate_url(url).map_err(|_| ScrapeError::InvalidUrl(url.to_string()))?;

        let _permit = self.concurrency_limiter.acquire().await?;
        let request_id = Uuid::new_v4();
        let start = Instant::now();

        let snapshot = match self.provider.acquire(url).await {
            Ok(snapshot) => snapshot,
            Err(e) if e.is_render_failure() => {
                error!(%request_id, url, "Render failed: {}", e);
                self.metrics.record_render_failure();
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        // No awaits below this point: the parsed document is not Send and
        // must not be held across a suspension.
        let document = Html::parse_document(&snapshot.html);
        let records = self.extractor.extract(&document);

        let duration = start.elapsed();
        self.metrics.record_fetch(duration, records.len());
        info!(
            %request_id,
            url,
            records = records.len(),
            card_found = snapshot.card_found,
            "Extraction completed in {}",
            crate::format_duration(duration)
        );

        Ok(records)
    }

    pub fn metrics(&self) -> Arc<Metrics> {
        self.metrics.clone()
    }

    /// Browser pool behind the provider, when there is one. Absent for
    /// in-memory providers.
    pub fn pool(&self) -> Option<Arc<BrowserPool>> {
        self.pool.clone()
    }

    pub async fn shutdown(&self) {
        info!("Shutting down menu service...");
        self.provider.shutdown().await;
        info!("Menu service shutdown complete");
    }
}
