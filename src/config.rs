//! Configuration management with serde serialization/deserialization
//!
//! This module provides all configuration structures and utilities for the
//! menu scraper, including browser pool settings, render timeouts, and the
//! structural selector patterns used by the extractor.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main configuration structure for the menu scraper
///
/// Controls the browser pool, extraction concurrency, render timeouts, and
/// the structural markers the extractor looks for in the rendered page.
///
/// # Examples
///
/// ```rust
/// use menu_scraper::Config;
///
/// // Use default configuration
/// let config = Config::default();
///
/// // Create custom configuration
/// let config = Config {
///     browser_pool_size: 4,
///     max_concurrent_extractions: 16,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Number of Chrome browser instances to maintain in the pool (default: 2)
    ///
    /// Higher values increase concurrency but consume more memory.
    pub browser_pool_size: usize,

    /// Maximum number of concurrent extraction operations (default: 16)
    ///
    /// Bounds how many requests may hold a page at once; should be at least
    /// the pool size for full utilization.
    pub max_concurrent_extractions: usize,

    /// Hard timeout for page navigation (default: 60 seconds)
    ///
    /// Navigation that does not complete within this bound is a render
    /// failure: the request produces no records.
    pub page_timeout: Duration,

    /// Soft timeout waiting for the first item card to appear (default: 15 seconds)
    ///
    /// Client-rendered pages populate cards after load. If no card shows up
    /// within this bound, extraction still proceeds on whatever DOM is
    /// present and simply finds zero cards.
    pub card_timeout: Duration,

    /// Structural selector patterns the extractor matches against.
    pub selectors: SelectorConfig,

    /// Path to Chrome/Chromium executable (default: auto-detect)
    pub chrome_path: Option<String>,

    /// Custom User-Agent string for requests (default: Chrome default)
    ///
    /// Some menu sites serve different markup to unknown agents.
    pub user_agent: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            browser_pool_size: 2,
            max_concurrent_extractions: 16,
            page_timeout: Duration::from_secs(60),
            card_timeout: Duration::from_secs(15),
            selectors: SelectorConfig::default(),
            chrome_path: None,
            user_agent: None,
        }
    }
}

/// CSS patterns identifying the structural parts of a rendered menu page
///
/// The defaults match the reference site's markup, but every pattern is
/// configurable so the extractor generalizes past exact selector names.
/// An item card is any element matching `card` that is not nested inside
/// another match; the name patterns are tried in order and the first one
/// that yields text wins.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SelectorConfig {
    /// Marker identifying a self-contained menu-item container.
    pub card: String,

    /// Acceptable shapes for the item name, in priority order.
    pub item_name: Vec<String>,

    /// Shape of the price element inside a card.
    pub price: String,

    /// Shape of the description element inside a card (partial class match).
    pub description: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            card: r#"[data-testid="card"]"#.to_string(),
            item_name: vec![
                "h3".to_string(),
                "h4".to_string(),
                r#"[data-testid*="item-name"]"#.to_string(),
            ],
            price: r#"[data-testid="card-item-price"]"#.to_string(),
            description: r#"[class*="styles_description"]"#.to_string(),
        }
    }
}

/// Loads a JSON configuration file.
pub async fn load_config_file(path: &std::path::Path) -> Result<Config, crate::ScrapeError> {
    let content = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&content)?)
}

/// Rejects configurations that cannot produce a working service.
pub fn validate_config(config: &Config) -> Result<(), crate::ScrapeError> {
    use crate::ScrapeError;

    if config.browser_pool_size == 0 {
        return Err(ScrapeError::ConfigurationError(
            "Browser pool size must be greater than 0".to_string(),
        ));
    }

    if config.max_concurrent_extractions == 0 {
        return Err(ScrapeError::ConfigurationError(
            "Max concurrent extractions must be greater than 0".to_string(),
        ));
    }

    if config.page_timeout.as_secs() == 0 || config.card_timeout.as_secs() == 0 {
        return Err(ScrapeError::ConfigurationError(
            "Timeouts must be greater than 0".to_string(),
        ));
    }

    if config.selectors.item_name.is_empty() {
        return Err(ScrapeError::ConfigurationError(
            "At least one item name pattern is required".to_string(),
        ));
    }

    // Surface bad selector patterns at startup instead of per request.
    crate::MenuExtractor::new(&config.selectors)?;

    Ok(())
}

/// Generate Chrome command-line arguments for one pool instance
///
/// Creates a set of Chrome command-line arguments suited to headless
/// rendering of script-heavy menu pages. Each instance gets a unique
/// temporary directory and debugging port to prevent singleton conflicts
/// in concurrent environments.
pub fn get_chrome_args(config: &Config, instance_id: usize) -> Vec<String> {
    let unique_id = format!("{}-{}", std::process::id(), instance_id);

    let mut args = vec![
        "--headless".to_string(),
        "--no-sandbox".to_string(),
        "--disable-setuid-sandbox".to_string(),
        "--disable-dev-shm-usage".to_string(),
        "--disable-gpu".to_string(),
        "--disable-background-timer-throttling".to_string(),
        "--disable-backgrounding-occluded-windows".to_string(),
        "--disable-renderer-backgrounding".to_string(),
        "--disable-extensions".to_string(),
        "--disable-default-apps".to_string(),
        "--disable-sync".to_string(),
        "--no-first-run".to_string(),
        "--ignore-certificate-errors".to_string(),
        // Unique user data directory to avoid singleton issues
        format!("--user-data-dir=/tmp/chromium-menu-{}", unique_id),
        // Unique remote debugging port for each instance
        format!("--remote-debugging-port={}", 9222 + instance_id),
    ];

    if let Some(user_agent) = &config.user_agent {
        args.push(format!("--user-agent={user_agent}"));
    }

    args
}

pub fn create_browser_config(
    config: &Config,
    instance_id: usize,
) -> chromiumoxide::browser::BrowserConfig {
    use chromiumoxide::browser::BrowserConfig;

    let mut builder = BrowserConfig::builder().args(get_chrome_args(config, instance_id));

    if let Some(chrome_path) = &config.chrome_path {
        builder = builder.chrome_executable(chrome_path);
    }

    builder
        .build()
        .unwrap_or_else(|_| BrowserConfig::with_executable("/usr/sbin/chromium"))
}
