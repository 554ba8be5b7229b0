//! # Menu Scraper
//!
//! A headless-browser menu extraction service. Renders a restaurant menu
//! page with pooled Chrome instances, recovers structured menu records
//! (category, item, description, price, availability) from the rendered
//! DOM, and serves the result as JSON or as a downloadable XLSX workbook.
//!
//! Menu sites render section headings and item cards as flat structural
//! siblings with no stable schema, so the extractor runs a single
//! document-order pass with a "most recently seen heading" cursor instead
//! of relying on any nesting between categories and items. All structural
//! markers are configurable; the defaults match the reference site.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use menu_scraper::{Config, MenuService};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = MenuService::new(Config::default()).await?;
//!
//!     let records = service.fetch_menu("https://example.com/menu").await?;
//!     for record in &records {
//!         println!("{} / {} {}", record.category, record.item, record.price);
//!     }
//!
//!     service.shutdown().await;
//!     Ok(())
//! }
//! ```
//!
//! ## CLI Usage
//!
//! ### HTTP server
//! ```bash
//! menu-scraper serve --port 3000
//! curl 'localhost:3000/fetch-menu?url=https://example.com/menu'
//! curl -OJ 'localhost:3000/fetch-menu-excel?url=https://example.com/menu'
//! ```
//!
//! ### One-shot extraction
//! ```bash
//! menu-scraper fetch --url https://example.com/menu --output menu.xlsx
//! ```

/// Configuration and selector patterns
pub mod config;

/// Error types and failure classification
pub mod error;

/// Browser pool management for concurrent Chrome instances
pub mod browser_pool;

/// Rendered-page snapshot acquisition
pub mod snapshot;

/// Menu record extraction from the rendered DOM
pub mod extractor;

/// Spreadsheet export of extracted records
pub mod exporter;

/// Shared menu data model
pub mod menu;

/// Extraction service orchestrating the pipeline
pub mod service;

/// HTTP entry points
pub mod server;

/// Command-line interface implementation
pub mod cli;

/// Extraction metrics
pub mod metrics;

/// Pool health classification
pub mod health;

/// Utility functions and helpers
pub mod utils;

#[cfg(test)]
mod tests;

pub use browser_pool::*;
pub use cli::*;
pub use config::*;
pub use error::*;
pub use exporter::*;
pub use extractor::*;
pub use health::*;
pub use menu::*;
pub use server::*;
pub use service::*;
pub use snapshot::*;
pub use utils::*;

// The module shares its name with the facade crate it wraps, so the bare
// glob form would be ambiguous here.
pub use crate::metrics::Metrics;
