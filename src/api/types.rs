use serde::{Deserialize, Serialize};
use crate::error::{Error, Result};
use crate::models::NormalizedAsset;

/// Decoded `listings/latest` response. Records stay as raw JSON until they
/// are normalized one by one, so a single malformed record cannot fail the
/// whole envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct ListingEnvelope {
    pub status: Option<Status>,
    #[serde(default)]
    pub data: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Status {
    pub error_code: Option<i64>,
    pub error_message: Option<String>,
    pub credit_count: Option<u32>,
}

impl ListingEnvelope {
    /// Accepts the envelope only when `status.error_code == 0`.
    pub fn ensure_ok(&self) -> Result<()> {
        match &self.status {
            Some(Status { error_code: Some(0), .. }) => Ok(()),
            Some(status) => Err(Error::ApiError(
                status.error_message.clone().unwrap_or_else(|| {
                    format!("error_code {:?} without message", status.error_code)
                }),
            )),
            None => Err(Error::ApiInvalidFormat("Response has no status block".to_string())),
        }
    }

    pub fn records(&self) -> &[serde_json::Value] {
        self.data.as_deref().unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingRecord {
    pub name: String,
    pub symbol: String,
    pub circulating_supply: f64,
    pub quote: Quote,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    #[serde(rename = "USD")]
    pub usd: UsdQuote,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsdQuote {
    pub price: f64,
    pub volume_24h: f64,
    pub percent_change_1h: f64,
    pub percent_change_24h: f64,
    pub percent_change_7d: f64,
    pub market_cap_dominance: f64,
}

impl From<ListingRecord> for NormalizedAsset {
    fn from(record: ListingRecord) -> Self {
        let usd = record.quote.usd;
        NormalizedAsset {
            name: record.name,
            symbol: record.symbol,
            price: usd.price,
            volume_24h: usd.volume_24h,
            percent_change_1h: usd.percent_change_1h,
            percent_change_24h: usd.percent_change_24h,
            percent_change_7d: usd.percent_change_7d,
            market_cap_dominance: usd.market_cap_dominance,
            circulating_supply: record.circulating_supply,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_code_zero_is_ok() {
        let envelope: ListingEnvelope = serde_json::from_value(json!({
            "status": { "error_code": 0, "error_message": null },
            "data": []
        }))
        .unwrap();
        assert!(envelope.ensure_ok().is_ok());
        assert!(envelope.records().is_empty());
    }

    #[test]
    fn test_error_message_is_kept_verbatim() {
        let envelope: ListingEnvelope = serde_json::from_value(json!({
            "status": { "error_code": 1002, "error_message": "API key missing." }
        }))
        .unwrap();
        match envelope.ensure_ok() {
            Err(Error::ApiError(msg)) => assert_eq!(msg, "API key missing."),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_missing_status_is_rejected() {
        let envelope: ListingEnvelope = serde_json::from_value(json!({ "data": [] })).unwrap();
        assert!(envelope.ensure_ok().is_err());
    }

    #[test]
    fn test_record_into_asset() {
        let record: ListingRecord = serde_json::from_value(json!({
            "id": 1,
            "name": "Bitcoin",
            "symbol": "BTC",
            "circulating_supply": 19_700_000.0,
            "quote": { "USD": {
                "price": 64000.5,
                "volume_24h": 1.5e10,
                "percent_change_1h": 0.1,
                "percent_change_24h": -1.2,
                "percent_change_7d": 3.4,
                "market_cap_dominance": 52.1,
                "market_cap": 1.2e12
            }}
        }))
        .unwrap();

        let asset = NormalizedAsset::from(record);
        assert_eq!(asset.symbol, "BTC");
        assert_eq!(asset.name, "Bitcoin");
        assert_eq!(asset.price, 64000.5);
        assert_eq!(asset.percent_change_24h, -1.2);
        assert_eq!(asset.circulating_supply, 19_700_000.0);
    }
}
