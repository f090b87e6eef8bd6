use crate::api::types::ListingEnvelope;
use crate::config::CoinMarketCapConfig;
use crate::error::{Error, Result};
use log::{debug, info};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT};
use reqwest::Client;

// X-CMC_PRO_API_KEY; header names are case-insensitive.
const API_KEY_HEADER: &str = "x-cmc_pro_api_key";
const CONVERT: &str = "USD";

/// Thin client for the `cryptocurrency/listings/latest` endpoint. The API key
/// header and query parameters are fixed at construction time.
#[derive(Debug, Clone)]
pub struct CoinMarketCapClient {
    client: Client,
    api_url: String,
    query: Vec<(&'static str, String)>,
}

impl CoinMarketCapClient {
    pub fn new(config: &CoinMarketCapConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let key = HeaderValue::from_str(&config.api_key)
            .map_err(|e| Error::ConfigError(format!("Invalid CoinMarketCap API key: {}", e)))?;
        headers.insert(HeaderName::from_static(API_KEY_HEADER), key);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            query: vec![
                ("start", "1".to_string()),
                ("limit", config.limit.to_string()),
                ("convert", CONVERT.to_string()),
            ],
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Fetches the ranked listing and rejects envelopes whose
    /// `status.error_code` is not zero.
    ///
    /// The body is decoded whatever the HTTP status: CoinMarketCap reports
    /// auth and quota problems inside the envelope on 4xx responses.
    pub async fn get_listings(&self) -> Result<ListingEnvelope> {
        info!("Sending API request...");
        let response = self.client
            .get(&self.api_url)
            .query(&self.query)
            .send()
            .await
            .map_err(|e| Error::ApiConnectionFailed(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::ApiConnectionFailed(e.to_string()))?;
        debug!("CoinMarketCap responded with HTTP {} ({} bytes)", status, body.len());

        let envelope: ListingEnvelope = serde_json::from_str(&body).map_err(|e| {
            Error::ApiInvalidFormat(format!("HTTP {}: {}", status, e))
        })?;
        envelope.ensure_ok()?;

        info!("Successfully retrieved the data.");
        Ok(envelope)
    }
}
