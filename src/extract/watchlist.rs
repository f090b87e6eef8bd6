use crate::error::Result;
use log::{debug, info};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// The symbol list handed to the downstream market-data extractor, stored as
/// a JSON array of tickers. Each publish replaces the whole file.
#[derive(Debug, Clone)]
pub struct WatchList {
    path: PathBuf,
}

impl WatchList {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "watchlist".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Writes to a sibling temp file, syncs it, then renames it over the
    /// target. Readers see either the previous list or the new one.
    pub async fn publish(&self, symbols: &[String]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let payload = serde_json::to_vec(symbols)?;
        let staging = self.staging_path();
        let mut file = fs::File::create(&staging).await?;
        file.write_all(&payload).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&staging, &self.path).await?;
        debug!("Watch-list {:?} replaced", self.path);
        info!("Published {} symbols to {:?}", symbols.len(), self.path);
        Ok(())
    }

    pub async fn read(&self) -> Result<Vec<String>> {
        let raw = fs::read(&self.path).await?;
        Ok(serde_json::from_slice(&raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbols(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_publish_replaces_previous_list() {
        let dir = tempfile::tempdir().unwrap();
        let list = WatchList::new(dir.path().join("top100_symbol.json"));

        list.publish(&symbols(&["A", "B", "C"])).await.unwrap();
        list.publish(&symbols(&["D", "E"])).await.unwrap();

        assert_eq!(list.read().await.unwrap(), symbols(&["D", "E"]));
        let raw = std::fs::read_to_string(list.path()).unwrap();
        assert_eq!(raw, r#"["D","E"]"#);
    }

    #[tokio::test]
    async fn test_publish_creates_parent_and_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let list = WatchList::new(dir.path().join("data/processed/top100_symbol.json"));

        list.publish(&symbols(&["BTC"])).await.unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path().join("data/processed"))
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(entries, vec!["top100_symbol.json".to_string()]);
    }

    #[tokio::test]
    async fn test_read_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let list = WatchList::new(dir.path().join("absent.json"));
        assert!(list.read().await.is_err());
    }
}
