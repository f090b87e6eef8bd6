use anyhow::Result;
use clap::Parser;
use log::{error, info, warn};

use cmc_pipeline::cli::{Cli, Command};
use cmc_pipeline::config::{Config, DEFAULT_CONFIG_PATH};
use cmc_pipeline::extract::{DepthTradeExtractor, Extractor, WatchList};
use cmc_pipeline::logging;
use cmc_pipeline::store::{AssetStore, MemoryStore, PostgresStore};
use cmc_pipeline::telegram::TelegramNotifier;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    // Load configuration
    let config_path = cli.config.clone().unwrap_or_else(|| DEFAULT_CONFIG_PATH.into());
    let mut config = match Config::load(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load configuration from {:?}: {}", config_path, e);
            return Err(anyhow::anyhow!("Configuration loading failed: {}", e));
        }
    };
    config.apply_env_overrides();
    logging::init(&config.logging, cli.debug)?;
    info!("Configuration loaded from {:?}", config_path);

    match cli.command() {
        Command::Extract { once, dry_run } => run_extract(&config, once, dry_run).await,
        Command::DepthTrade => run_depth_trade(&config).await,
        Command::TelegramCheck => run_telegram_check(&config).await,
    }
}

async fn run_extract(config: &Config, once: bool, dry_run: bool) -> Result<()> {
    if dry_run {
        warn!("Dry run: documents are kept in memory only");
        let extractor = build_extractor(config, MemoryStore::new(config.database.collection.clone()))?;
        drive(extractor, once).await;
        return Ok(());
    }

    if let Err(e) = config.validate(true) {
        error!("Error initializing crawler: {}", e);
        return Err(e.into());
    }
    let store = PostgresStore::connect(&config.database).await.map_err(|e| {
        error!("Failed to connect to database: {}", e);
        e
    })?;
    store.ensure_collection().await?;

    let extractor = build_extractor(config, store.clone())?;
    drive(extractor, once).await;

    store.close().await;
    Ok(())
}

fn build_extractor<S: AssetStore>(config: &Config, store: S) -> Result<Extractor<S>> {
    let extractor = Extractor::new(config, store)?;
    if config.telegram.enable_notifications {
        info!("Telegram notifications enabled");
        return Ok(extractor.with_notifier(TelegramNotifier::new(&config.telegram)));
    }
    Ok(extractor)
}

async fn drive<S: AssetStore>(extractor: Extractor<S>, once: bool) {
    if once {
        let report = extractor.run_once().await;
        info!("Cycle finished: {:?}", report);
        return;
    }

    tokio::select! {
        _ = extractor.run(true) => {}
        signal = tokio::signal::ctrl_c() => match signal {
            Ok(()) => info!("Shutdown signal received, stopping extractor"),
            Err(e) => error!("Failed to listen for shutdown signal: {}", e),
        },
    }
}

async fn run_depth_trade(config: &Config) -> Result<()> {
    let watchlist = WatchList::new(config.watchlist.path.clone());
    let extractor = DepthTradeExtractor::from_watchlist(&watchlist, &config.depth_trade).await?;
    for url in extractor.stream_urls() {
        info!("Planned stream: {}", url);
    }
    extractor.run().await.map_err(|e| {
        error!("Depth/trade extractor: {}", e);
        e.into()
    })
}

async fn run_telegram_check(config: &Config) -> Result<()> {
    let notifier = TelegramNotifier::new(&config.telegram);
    if notifier.test_connection().await {
        Ok(())
    } else {
        Err(anyhow::anyhow!("Telegram connection check failed"))
    }
}
