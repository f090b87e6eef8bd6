use serde::{Deserialize, Serialize};

/// One tracked asset as it is stored, keyed by `symbol`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedAsset {
    pub name: String,
    pub symbol: String,
    pub price: f64,
    pub volume_24h: f64,
    pub percent_change_1h: f64,
    pub percent_change_24h: f64,
    pub percent_change_7d: f64,
    pub market_cap_dominance: f64,
    pub circulating_supply: f64,
}

/// Ticker symbols of a batch, in batch order.
pub fn symbols(batch: &[NormalizedAsset]) -> Vec<String> {
    batch.iter().map(|asset| asset.symbol.clone()).collect()
}
