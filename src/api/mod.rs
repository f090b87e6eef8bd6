pub mod coinmarketcap;
pub mod types;

pub use coinmarketcap::CoinMarketCapClient;
pub use types::{ListingEnvelope, ListingRecord, Quote, Status, UsdQuote};
