use crate::api::{ListingEnvelope, ListingRecord};
use crate::models::NormalizedAsset;
use log::{error, info};

/// Result of normalizing one envelope: the assets in source order, plus the
/// symbols of records that were dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedBatch {
    pub assets: Vec<NormalizedAsset>,
    pub skipped: Vec<String>,
}

/// Normalizes every record of the envelope. A record missing any field is
/// logged and dropped; the rest of the batch continues. An absent envelope
/// (failed fetch) yields an empty batch.
pub fn normalize_batch(envelope: Option<&ListingEnvelope>) -> NormalizedBatch {
    let Some(envelope) = envelope else {
        return NormalizedBatch::default();
    };
    info!("Start transform cmc data");

    let mut batch = NormalizedBatch::default();
    for record in envelope.records() {
        match serde_json::from_value::<ListingRecord>(record.clone()) {
            Ok(parsed) => batch.assets.push(NormalizedAsset::from(parsed)),
            Err(e) => {
                let symbol = record
                    .get("symbol")
                    .and_then(|s| s.as_str())
                    .unwrap_or("<unknown>")
                    .to_string();
                error!("Error processing symbol {}: {}", symbol, e);
                batch.skipped.push(symbol);
            }
        }
    }
    batch
}
