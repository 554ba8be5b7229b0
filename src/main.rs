use clap::Parser;
use menu_scraper::{
    load_config_file, setup_logging, validate_config, validate_config_file, Cli, CliRunner,
    Commands, Config,
};
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    setup_logging(args.verbose)?;

    info!("Starting menu-scraper v{}", env!("CARGO_PKG_VERSION"));

    // Validation needs no browser pool; handle it before launching one.
    if let Commands::Validate { config } = &args.command {
        return validate_config_file(config).await;
    }

    let config = load_config(&args).await?;

    let runner = CliRunner::new(config).await?;

    // Graceful shutdown on SIGINT/SIGTERM
    let (shutdown_tx, mut shutdown_rx) = tokio::sync::broadcast::channel(1);
    let _shutdown_handler = setup_shutdown_handler(shutdown_tx.clone());

    let result = tokio::select! {
        result = runner.run(args.command, shutdown_tx.subscribe()) => {
            info!("Command completed");
            result
        }
        _ = shutdown_rx.recv() => {
            info!("Received shutdown signal");
            Ok(())
        }
    };

    info!("Shutting down...");
    runner.service.shutdown().await;

    if let Err(e) = result {
        error!("Application error: {}", e);
        std::process::exit(1);
    }

    info!("menu-scraper stopped");
    Ok(())
}

async fn load_config(args: &Cli) -> anyhow::Result<Config> {
    let mut config = if let Some(config_path) = &args.config {
        load_config_file(config_path).await?
    } else {
        Config::default()
    };

    // Override with CLI arguments
    if let Some(pool_size) = args.pool_size {
        config.browser_pool_size = pool_size;
    }

    if let Some(max_concurrent) = args.max_concurrent {
        config.max_concurrent_extractions = max_concurrent;
    }

    if let Some(page_timeout) = args.page_timeout {
        config.page_timeout = std::time::Duration::from_secs(page_timeout);
    }

    if let Some(card_timeout) = args.card_timeout {
        config.card_timeout = std::time::Duration::from_secs(card_timeout);
    }

    if let Some(chrome_path) = &args.chrome_path {
        config.chrome_path = Some(chrome_path.clone());
    }

    validate_config(&config)?;

    info!("Configuration loaded successfully");
    info!("Browser pool size: {}", config.browser_pool_size);
    info!("Max concurrent extractions: {}", config.max_concurrent_extractions);
    info!("Page timeout: {:?}", config.page_timeout);
    info!("Card timeout: {:?}", config.card_timeout);

    Ok(config)
}

fn setup_shutdown_handler(
    shutdown_tx: tokio::sync::broadcast::Sender<()>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut sigint = signal::unix::signal(signal::unix::SignalKind::interrupt())
            .expect("Failed to create SIGINT handler");
        let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to create SIGTERM handler");

        tokio::select! {
            _ = sigint.recv() => {
                info!("Received SIGINT");
            }
            _ = sigterm.recv() => {
                info!("Received SIGTERM");
            }
        }

        let _ = shutdown_tx.send(());
    })
}
