use crate::error::Result;
use crate::models::NormalizedAsset;
use crate::store::AssetStore;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-process collection with the same upsert semantics as the database.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    name: String,
    documents: Arc<RwLock<HashMap<String, NormalizedAsset>>>,
}

impl MemoryStore {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            documents: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn get(&self, symbol: &str) -> Option<NormalizedAsset> {
        self.documents.read().await.get(symbol).cloned()
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }

    /// All documents, sorted by symbol.
    pub async fn snapshot(&self) -> Vec<NormalizedAsset> {
        let documents = self.documents.read().await;
        let mut assets: Vec<NormalizedAsset> = documents.values().cloned().collect();
        assets.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        assets
    }
}

#[async_trait]
impl AssetStore for MemoryStore {
    async fn upsert(&self, asset: &NormalizedAsset) -> Result<()> {
        let mut documents = self.documents.write().await;
        documents.insert(asset.symbol.clone(), asset.clone());
        Ok(())
    }

    fn name(&self) -> String {
        self.name.clone()
    }
}
