use crate::{export_xlsx, Config, MenuService};
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs;
use tokio::sync::broadcast;
use tracing::info;

#[derive(Parser)]
#[command(name = "menu-scraper")]
#[command(about = "Headless-browser menu extraction service")]
#[command(version = "0.1.0")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, help = "Configuration file path")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Browser pool size")]
    pub pool_size: Option<usize>,

    #[arg(long, help = "Maximum concurrent extractions")]
    pub max_concurrent: Option<usize>,

    #[arg(long, help = "Page navigation timeout in seconds")]
    pub page_timeout: Option<u64>,

    #[arg(long, help = "First-card wait timeout in seconds")]
    pub card_timeout: Option<u64>,

    #[arg(long, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, help = "Chrome executable path")]
    pub chrome_path: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server exposing fetch-menu and fetch-menu-excel
    Serve {
        #[arg(short, long, default_value = "3000", help = "Server port")]
        port: u16,

        #[arg(long, help = "Bind address")]
        bind: Option<String>,
    },

    /// Extract one menu and print JSON or write a workbook
    Fetch {
        #[arg(short, long, help = "Menu page URL")]
        url: String,

        #[arg(
            short,
            long,
            help = "Output file (.xlsx for a workbook, anything else for JSON); prints JSON when omitted"
        )]
        output: Option<PathBuf>,
    },

    /// Validate configuration
    Validate {
        #[arg(short, long, help = "Configuration file to validate")]
        config: PathBuf,
    },
}

pub struct CliRunner {
    pub config: Config,
    pub service: Arc<MenuService>,
}

impl CliRunner {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let service = Arc::new(MenuService::new(config.clone()).await?);
        Ok(Self { config, service })
    }

    pub async fn run(
        &self,
        command: Commands,
        shutdown: broadcast::Receiver<()>,
    ) -> anyhow::Result<()> {
        match command {
            Commands::Serve { port, bind } => self.run_serve(port, bind, shutdown).await,
            Commands::Fetch { url, output } => self.run_fetch(url, output).await,
            // Handled in main before a browser pool exists.
            Commands::Validate { config } => validate_config_file(&config).await,
        }
    }

    async fn run_serve(
        &self,
        port: u16,
        bind: Option<String>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> anyhow::Result<()> {
        let bind = bind.unwrap_or_else(|| "0.0.0.0".to_string());
        let addr: SocketAddr = format!("{bind}:{port}")
            .parse()
            .with_context(|| format!("invalid bind address {bind}:{port}"))?;

        let state = crate::AppState {
            service: self.service.clone(),
        };

        crate::serve(state, addr, async move {
            let _ = shutdown.recv().await;
        })
        .await?;

        Ok(())
    }

    async fn run_fetch(&self, url: String, output: Option<PathBuf>) -> anyhow::Result<()> {
        info!("Extracting menu from: {}", url);

        let records = self.service.fetch_menu(&url).await?;
        println!("Extracted {} menu records from {}", records.len(), url);

        match output {
            Some(path) if path.extension().is_some_and(|ext| ext == "xlsx") => {
                let bytes = export_xlsx(&records)?;
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent).await?;
                }
                fs::write(&path, &bytes).await?;
                println!("Workbook written to: {}", path.display());
            }
            Some(path) => {
                let json = serde_json::to_string_pretty(&records)?;
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent).await?;
                }
                fs::write(&path, json).await?;
                println!("JSON written to: {}", path.display());
            }
            None => {
                println!("{}", serde_json::to_string_pretty(&records)?);
            }
        }

        Ok(())
    }
}

pub async fn validate_config_file(config_path: &PathBuf) -> anyhow::Result<()> {
    println!("Validating configuration: {}", config_path.display());

    let config_content = fs::read_to_string(config_path).await?;
    let config: Config = serde_json::from_str(&config_content)?;
    crate::validate_config(&config)?;

    println!("Configuration is valid:");
    println!("  Browser pool size: {}", config.browser_pool_size);
    println!("  Max concurrent: {}", config.max_concurrent_extractions);
    println!("  Page timeout: {:?}", config.page_timeout);
    println!("  Card timeout: {:?}", config.card_timeout);
    println!("  Card marker: {}", config.selectors.card);

    Ok(())
}

pub fn setup_logging(verbose: bool) -> anyhow::Result<()> {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();

    Ok(())
}
