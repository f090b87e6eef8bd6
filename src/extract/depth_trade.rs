use crate::config::DepthTradeConfig;
use crate::error::{Error, Result};
use crate::extract::watchlist::WatchList;
use log::{info, warn};

/// Consumer side of the watch-list: builds one trade stream per symbol.
/// Streaming itself is not implemented; `run` says so instead of failing
/// silently.
#[derive(Debug, Clone)]
pub struct DepthTradeExtractor {
    symbols: Vec<String>,
    stream_url: String,
    max_symbols: usize,
}

impl DepthTradeExtractor {
    pub fn new(symbols: Vec<String>, config: &DepthTradeConfig) -> Self {
        Self {
            symbols,
            stream_url: config.stream_url.clone(),
            max_symbols: config.max_symbols,
        }
    }

    pub async fn from_watchlist(watchlist: &WatchList, config: &DepthTradeConfig) -> Result<Self> {
        let symbols = watchlist.read().await.map_err(|e| {
            warn!("Cannot read watch-list {:?}: {}", watchlist.path(), e);
            e
        })?;
        info!("Loaded {} symbols from {:?}", symbols.len(), watchlist.path());
        Ok(Self::new(symbols, config))
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    /// `<stream_url><symbol>@trade` for the first `max_symbols` symbols.
    pub fn stream_urls(&self) -> Vec<String> {
        self.symbols
            .iter()
            .take(self.max_symbols)
            .map(|symbol| format!("{}{}@trade", self.stream_url, symbol.to_lowercase()))
            .collect()
    }

    pub async fn run(&self) -> Result<()> {
        Err(Error::NotImplemented(format!(
            "depth/trade streaming for {} symbols",
            self.stream_urls().len()
        )))
    }
}
