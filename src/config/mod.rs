use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::fs;
use std::time::Duration;
use anyhow::Result;
use crate::validation;

pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub coinmarketcap: CoinMarketCapConfig,
    pub extractor: ExtractorConfig,
    pub database: DatabaseConfig,
    pub watchlist: WatchListConfig,
    pub telegram: TelegramConfig,
    pub depth_trade: DepthTradeConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct CoinMarketCapConfig {
    pub api_url: String,
    pub api_key: String,
    pub limit: u32,
    pub request_timeout_secs: u64,
}

impl Default for CoinMarketCapConfig {
    fn default() -> Self {
        Self {
            api_url: "https://pro-api.coinmarketcap.com/v1/cryptocurrency/listings/latest".to_string(),
            api_key: String::new(),
            limit: 100,
            request_timeout_secs: 10,
        }
    }
}

impl CoinMarketCapConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ExtractorConfig {
    pub interval_secs: u64,
    /// When the fetch stage fails, skip the rest of the cycle instead of
    /// publishing an empty watch-list.
    pub skip_cycle_on_fetch_failure: bool,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            interval_secs: 260,
            skip_cycle_on_fetch_failure: true,
        }
    }
}

impl ExtractorConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub collection: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 5,
            collection: "cmc".to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct WatchListConfig {
    pub path: PathBuf,
}

impl Default for WatchListConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/processed/top100_symbol.json"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
    pub parse_mode: String,
    pub min_interval_secs: u64,
    pub enable_notifications: bool,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            chat_id: String::new(),
            parse_mode: "HTML".to_string(),
            min_interval_secs: 30,
            enable_notifications: false,
        }
    }
}

impl TelegramConfig {
    pub fn min_interval(&self) -> Duration {
        Duration::from_secs(self.min_interval_secs)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct DepthTradeConfig {
    pub stream_url: String,
    pub max_symbols: usize,
}

impl Default for DepthTradeConfig {
    fn default() -> Self {
        Self {
            stream_url: "wss://stream.binance.com:9443/ws/".to_string(),
            max_symbols: 20,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub file: Option<PathBuf>,
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: Some(PathBuf::from("main.log")),
            level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let config_str = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&config_str)?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let config_str = toml::to_string_pretty(self)?;
        fs::write(path, config_str)?;
        Ok(())
    }

    /// Secrets normally live in the environment (or `.env`), not in the file.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("CMC_API") {
            self.coinmarketcap.api_key = key;
        }
        if let Some(url) = lookup("DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(token) = lookup("TELE_BOT_TOKEN") {
            self.telegram.bot_token = token;
        }
        if let Some(chat_id) = lookup("TELE_CHAT_ID") {
            self.telegram.chat_id = chat_id;
        }
    }

    /// Checks everything the extractor needs before it can start.
    pub fn validate(&self, require_database: bool) -> crate::Result<()> {
        validation::validate_api_key(&self.coinmarketcap.api_key)?;
        validation::validate_api_url(&self.coinmarketcap.api_url)?;
        if self.coinmarketcap.limit == 0 {
            return Err(crate::Error::ConfigError("coinmarketcap.limit must be positive".to_string()));
        }
        validation::validate_interval(self.extractor.interval_secs)?;
        validation::validate_collection_name(&self.database.collection)?;
        if require_database && self.database.url.trim().is_empty() {
            return Err(crate::Error::ConfigError(
                "database.url is not set (use DATABASE_URL)".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [coinmarketcap]
            api_key = "abc"

            [database]
            url = "postgres://localhost/cmc"
            "#,
        )
        .unwrap();

        assert_eq!(config.coinmarketcap.limit, 100);
        assert_eq!(config.extractor.interval_secs, 260);
        assert!(config.extractor.skip_cycle_on_fetch_failure);
        assert_eq!(config.database.collection, "cmc");
        assert_eq!(config.telegram.min_interval_secs, 30);
        assert_eq!(config.depth_trade.max_symbols, 20);
        assert!(config.validate(true).is_ok());
    }

    #[test]
    fn test_env_overrides_take_precedence() {
        let vars: HashMap<&str, &str> = [
            ("CMC_API", "from-env"),
            ("DATABASE_URL", "postgres://db/cmc"),
            ("TELE_CHAT_ID", "42"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.coinmarketcap.api_key = "from-file".to_string();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.coinmarketcap.api_key, "from-env");
        assert_eq!(config.database.url, "postgres://db/cmc");
        assert_eq!(config.telegram.chat_id, "42");
        assert!(config.telegram.bot_token.is_empty());
    }

    #[test]
    fn test_missing_api_key_is_rejected() {
        let mut config = Config::default();
        config.database.url = "postgres://localhost/cmc".to_string();

        let err = config.validate(true).unwrap_err();
        assert!(matches!(err, crate::Error::ConfigError(_)));
    }

    #[test]
    fn test_missing_database_only_matters_when_required() {
        let mut config = Config::default();
        config.coinmarketcap.api_key = "abc".to_string();

        assert!(config.validate(false).is_ok());
        assert!(config.validate(true).is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.extractor.interval_secs = 60;
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.extractor.interval_secs, 60);
        assert_eq!(loaded.watchlist.path, config.watchlist.path);
    }
}
