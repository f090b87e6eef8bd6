//! Persistence for normalized assets. One document per `symbol`; writes are
//! upserts, so the latest fetch always wins and nothing is ever deleted.

use crate::error::Result;
use crate::models::NormalizedAsset;
use async_trait::async_trait;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Inserts the asset if its symbol is unknown, otherwise overwrites every
    /// field of the stored document.
    async fn upsert(&self, asset: &NormalizedAsset) -> Result<()>;

    /// Collection name, for log lines.
    fn name(&self) -> String;
}
