#![allow(dead_code)]

use cmc_pipeline::config::Config;
use serde_json::{json, Value};
use std::path::Path;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const LISTINGS_PATH: &str = "/v1/cryptocurrency/listings/latest";

// Helper to create a config pointing at a mock CoinMarketCap server
pub fn create_test_config(server: &MockServer, dir: &Path) -> Config {
    let mut config = Config::default();
    config.coinmarketcap.api_url = format!("{}{}", server.uri(), LISTINGS_PATH);
    config.coinmarketcap.api_key = "test-key".to_string();
    config.coinmarketcap.request_timeout_secs = 2;
    config.extractor.interval_secs = 1;
    config.watchlist.path = dir.join("data/processed/top100_symbol.json");
    config.logging.file = None;
    config
}

// Helper to create one listing record as CoinMarketCap returns it
pub fn create_test_record(symbol: &str, price: f64) -> Value {
    json!({
        "id": 1,
        "name": format!("{} Token", symbol),
        "symbol": symbol,
        "slug": symbol.to_lowercase(),
        "cmc_rank": 1,
        "circulating_supply": 1_000_000.0,
        "quote": { "USD": {
            "price": price,
            "volume_24h": price * 1000.0,
            "percent_change_1h": 0.5,
            "percent_change_24h": -1.5,
            "percent_change_7d": 7.25,
            "market_cap_dominance": 1.1,
            "market_cap": price * 1_000_000.0,
            "last_updated": "2024-01-01T00:00:00.000Z"
        }}
    })
}

pub fn ok_envelope(records: Vec<Value>) -> Value {
    json!({
        "status": {
            "timestamp": "2024-01-01T00:00:00.000Z",
            "error_code": 0,
            "error_message": null,
            "elapsed": 10,
            "credit_count": 1
        },
        "data": records
    })
}

// Serves `body` for exactly one request
pub async fn mount_once(server: &MockServer, body: Value) {
    Mock::given(method("GET"))
        .and(path(LISTINGS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .up_to_n_times(1)
        .expect(1)
        .mount(server)
        .await;
}
