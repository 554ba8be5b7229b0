//! Rendered-page snapshot acquisition
//!
//! The extractor never talks to a browser directly: it consumes a
//! [`PageSnapshot`] produced by a [`SnapshotProvider`]. The Chrome-backed
//! provider renders the URL on a pooled instance, waits for the first item
//! card within a soft bound, and captures the resulting HTML. Tests swap in
//! an in-memory provider instead.

use crate::{BrowserGuard, BrowserPool, Config, ScrapeError};
use async_trait::async_trait;
use chromiumoxide::page::Page;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

/// A captured rendering of one URL.
///
/// `card_found` records whether at least one card-marker element appeared
/// before the card wait expired. A snapshot without cards is still a valid
/// snapshot; extraction simply finds zero records in it.
#[derive(Debug, Clone)]
pub struct PageSnapshot {
    pub url: String,
    pub html: String,
    pub card_found: bool,
}

/// Source of rendered-page snapshots.
///
/// The single suspension point of an extraction request. Implementations
/// must tear down any per-request page resources on every exit path.
#[async_trait]
pub trait SnapshotProvider: Send + Sync {
    async fn acquire(&self, url: &str) -> Result<PageSnapshot, ScrapeError>;

    async fn shutdown(&self) {}
}

/// Renders URLs with headless Chrome instances drawn from a [`BrowserPool`].
pub struct ChromeSnapshotProvider {
    pool: Arc<BrowserPool>,
    config: Config,
}

impl ChromeSnapshotProvider {
    pub async fn new(config: Config) -> Result<Self, ScrapeError> {
        let pool = Arc::new(BrowserPool::new(config.clone()).await?);
        Ok(Self { pool, config })
    }

    pub fn pool(&self) -> Arc<BrowserPool> {
        self.pool.clone()
    }

    /// Waits up to `card_timeout` for the first card-marker element. This
    /// bound is soft: expiry means "proceed with whatever DOM is present",
    /// not failure.
    async fn wait_for_card(&self, page: &Page) -> bool {
        let deadline = Instant::now() + self.config.card_timeout;

        loop {
            if page
                .find_element(self.config.selectors.card.as_str())
                .await
                .is_ok()
            {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            sleep(Duration::from_millis(250)).await;
        }
    }

    async fn render(
        &self,
        guard: &BrowserGuard,
        url: &str,
    ) -> Result<PageSnapshot, ScrapeError> {
        let page = {
            let browser = guard.browser.lock().await;
            timeout(self.config.page_timeout, browser.new_page(url))
                .await
                .map_err(|_| ScrapeError::NavigationTimeout(self.config.page_timeout))?
                .map_err(|e| ScrapeError::NavigationFailed(e.to_string()))?
        };

        // Capture first, then close: the page must be torn down on every
        // exit path, error or not.
        let result = self.capture(&page, url).await;

        if let Err(e) = page.close().await {
            debug!("Failed to close page for {}: {}", url, e);
        }

        result
    }

    async fn capture(&self, page: &Page, url: &str) -> Result<PageSnapshot, ScrapeError> {
        let card_found = self.wait_for_card(page).await;
        if !card_found {
            warn!("No card element appeared on {} within {:?}", url, self.config.card_timeout);
        }

        let html = timeout(self.config.page_timeout, page.content())
            .await
            .map_err(|_| ScrapeError::NavigationTimeout(self.config.page_timeout))?
            .map_err(|e| ScrapeError::PageError(e.to_string()))?;

        Ok(PageSnapshot {
            url: url.to_string(),
            html,
            card_found,
        })
    }
}

#[async_trait]
impl SnapshotProvider for ChromeSnapshotProvider {
    async fn acquire(&self, url: &str) -> Result<PageSnapshot, ScrapeError> {
        let guard = self.pool.get_browser().await?;

        let result = self.render(&guard, url).await;

        // Render faults count against the instance so pool maintenance can
        // see one that keeps failing. The instance itself returns when the
        // guard drops.
        if result.is_err() {
            self.pool.mark_instance_failed(guard.instance_id).await;
        }

        result
    }

    async fn shutdown(&self) {
        self.pool.shutdown().await;
    }
}
