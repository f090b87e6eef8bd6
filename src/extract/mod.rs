//! The periodic extract-transform-load loop:
//! fetch -> normalize -> publish watch-list -> load -> sleep -> repeat.

pub mod depth_trade;
pub mod transform;
pub mod watchlist;

pub use depth_trade::DepthTradeExtractor;
pub use transform::{normalize_batch, NormalizedBatch};
pub use watchlist::WatchList;

use crate::api::{CoinMarketCapClient, ListingEnvelope};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::{market, NormalizedAsset};
use crate::store::AssetStore;
use crate::telegram::{AlertLevel, StatusValue, TelegramNotifier};
use log::{error, info, warn};
use std::time::Duration;

/// How far a load got: upserts applied, and the error that stopped it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadOutcome {
    pub applied: usize,
    pub error: Option<String>,
}

/// What one cycle did, stage by stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub fetched: bool,
    pub fetch_error: Option<String>,
    pub received: usize,
    pub normalized: usize,
    pub skipped: usize,
    pub published: bool,
    pub loaded: usize,
    pub load_error: Option<String>,
}

impl CycleReport {
    pub fn status_entries(&self) -> Vec<(String, StatusValue)> {
        vec![
            ("fetch_ok".to_string(), self.fetched.into()),
            ("records_received".to_string(), self.received.into()),
            ("records_skipped".to_string(), self.skipped.into()),
            ("watchlist_published".to_string(), self.published.into()),
            ("assets_loaded".to_string(), self.loaded.into()),
        ]
    }
}

/// Drives fetch, normalize, publish and load against one store.
pub struct Extractor<S: AssetStore> {
    client: CoinMarketCapClient,
    store: S,
    watchlist: WatchList,
    interval: Duration,
    skip_cycle_on_fetch_failure: bool,
    notifier: Option<TelegramNotifier>,
}

impl<S: AssetStore> Extractor<S> {
    pub fn new(config: &Config, store: S) -> Result<Self> {
        let client = config
            .validate(false)
            .and_then(|_| CoinMarketCapClient::new(&config.coinmarketcap))
            .map_err(|e| {
                error!("Error initializing crawler: {}", e);
                e
            })?;
        info!("Successfully retrieved CMC configurations");

        Ok(Self {
            client,
            store,
            watchlist: WatchList::new(config.watchlist.path.clone()),
            interval: config.extractor.interval(),
            skip_cycle_on_fetch_failure: config.extractor.skip_cycle_on_fetch_failure,
            notifier: None,
        })
    }

    pub fn with_notifier(mut self, notifier: TelegramNotifier) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn watchlist(&self) -> &WatchList {
        &self.watchlist
    }

    /// Absent on any failure; the cause is logged here.
    pub async fn fetch(&self) -> Option<ListingEnvelope> {
        self.try_fetch().await.ok()
    }

    async fn try_fetch(&self) -> Result<ListingEnvelope> {
        self.client.get_listings().await.map_err(|e| {
            match &e {
                Error::ApiConnectionFailed(msg) => error!("Request error: {}", msg),
                Error::ApiError(msg) => error!("API error: {}", msg),
                other => error!("Unexpected error in cmc_extract: {}", other),
            }
            e
        })
    }

    pub fn normalize(&self, envelope: Option<&ListingEnvelope>) -> NormalizedBatch {
        normalize_batch(envelope)
    }

    /// Replaces the watch-list with this batch's symbols. A failed write keeps
    /// the previous list in place.
    pub async fn publish_symbols(&self, batch: &[NormalizedAsset]) -> bool {
        match self.watchlist.publish(&market::symbols(batch)).await {
            Ok(()) => true,
            Err(e) => {
                error!("Error writing watch-list {:?}: {}", self.watchlist.path(), e);
                false
            }
        }
    }

    /// Upserts in batch order and stops at the first failure. Earlier upserts
    /// stay committed.
    pub async fn load(&self, batch: &[NormalizedAsset]) -> LoadOutcome {
        info!("Start load cmc transform data ...");
        let mut outcome = LoadOutcome::default();
        for asset in batch {
            if let Err(e) = self.store.upsert(asset).await {
                error!("Error loading data: {}", e);
                outcome.error = Some(e.to_string());
                return outcome;
            }
            outcome.applied += 1;
        }
        info!("Successfully loaded/updated data into {}.", self.store.name());
        outcome
    }

    pub async fn run_cycle(&self) -> CycleReport {
        let mut report = CycleReport::default();

        let envelope = match self.try_fetch().await {
            Ok(envelope) => {
                report.fetched = true;
                report.received = envelope.records().len();
                Some(envelope)
            }
            Err(e) => {
                report.fetch_error = Some(e.to_string());
                if self.skip_cycle_on_fetch_failure {
                    warn!("Fetch failed, skipping this cycle");
                    return report;
                }
                None
            }
        };

        let batch = self.normalize(envelope.as_ref());
        report.normalized = batch.assets.len();
        report.skipped = batch.skipped.len();

        report.published = self.publish_symbols(&batch.assets).await;
        info!("Successfully to transform {} symbol data", batch.assets.len());

        let outcome = self.load(&batch.assets).await;
        report.loaded = outcome.applied;
        report.load_error = outcome.error;
        report
    }

    async fn notify(&self, report: &CycleReport) {
        let Some(notifier) = &self.notifier else {
            return;
        };
        if let Some(reason) = &report.fetch_error {
            notifier
                .send_alert("CoinMarketCap extract failed", reason, AlertLevel::Error)
                .await;
        } else if let Some(reason) = &report.load_error {
            notifier
                .send_alert("CoinMarketCap load aborted", reason, AlertLevel::Warning)
                .await;
        } else {
            notifier.send_status_update(&report.status_entries()).await;
        }
    }

    /// Runs one cycle and reports it to the notifier, if any.
    pub async fn run_once(&self) -> CycleReport {
        let report = self.run_cycle().await;
        self.notify(&report).await;
        report
    }

    /// Cycles forever. Only an external signal stops it.
    pub async fn run(&self, running: bool) {
        if !running {
            warn!("Not running extract CMC. Running is {}", running);
            return;
        }

        info!("Running extract CMC ....");
        loop {
            self.run_once().await;
            info!("Wait for {} second to update new data", self.interval.as_secs());
            tokio::time::sleep(self.interval).await;
        }
    }
}
