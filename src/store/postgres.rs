use crate::config::DatabaseConfig;
use crate::error::Result;
use crate::models::NormalizedAsset;
use crate::store::AssetStore;
use crate::validation::validate_collection_name;
use async_trait::async_trait;
use log::{error, info};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

/// A "collection" is a table holding one JSONB document per symbol.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
    collection: String,
}

impl PostgresStore {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        validate_collection_name(&config.collection)?;
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(10))
            .connect(&config.url)
            .await?;
        info!("Connected to database, collection '{}'", config.collection);

        Ok(Self::with_pool(pool, config.collection.clone()))
    }

    /// `collection` must already be a valid identifier.
    pub fn with_pool(pool: PgPool, collection: String) -> Self {
        Self { pool, collection }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn ensure_collection(&self) -> Result<()> {
        let ddl = create_table_sql(&self.collection);
        sqlx::query(&ddl).execute(&self.pool).await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
        info!("Database pool for '{}' closed", self.collection);
    }
}

fn create_table_sql(collection: &str) -> String {
    format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table} (
            symbol TEXT PRIMARY KEY,
            document JSONB NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
        table = collection
    )
}

// `||` merges the new fields over the stored document, which matches a
// field-wise "set" on a document database.
fn upsert_sql(collection: &str) -> String {
    format!(
        r#"
        INSERT INTO {table} (symbol, document, updated_at)
        VALUES ($1, $2, NOW())
        ON CONFLICT (symbol) DO UPDATE SET
            document = {table}.document || EXCLUDED.document,
            updated_at = NOW()
        "#,
        table = collection
    )
}

#[async_trait]
impl AssetStore for PostgresStore {
    async fn upsert(&self, asset: &NormalizedAsset) -> Result<()> {
        let document = serde_json::to_value(asset)?;
        sqlx::query(&upsert_sql(&self.collection))
            .bind(&asset.symbol)
            .bind(&document)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Failed to upsert {} into {}: {}", asset.symbol, self.collection, e);
                e
            })?;
        Ok(())
    }

    fn name(&self) -> String {
        self.collection.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert_sql_targets_collection() {
        let sql = upsert_sql("cmc");
        assert!(sql.contains("INSERT INTO cmc"));
        assert!(sql.contains("ON CONFLICT (symbol) DO UPDATE"));
        assert!(sql.contains("cmc.document || EXCLUDED.document"));
    }

    #[test]
    fn test_create_table_sql() {
        let sql = create_table_sql("clean_cmc");
        assert!(sql.contains("CREATE TABLE IF NOT EXISTS clean_cmc"));
        assert!(sql.contains("symbol TEXT PRIMARY KEY"));
    }

    #[tokio::test]
    async fn test_connect_rejects_bad_collection() {
        let config = DatabaseConfig {
            url: "postgres://localhost/cmc".to_string(),
            max_connections: 1,
            collection: "cmc; DROP TABLE cmc".to_string(),
        };
        assert!(PostgresStore::connect(&config).await.is_err());
    }

    // Needs a live database: DATABASE_URL=postgres://... cargo test -- --ignored
    #[tokio::test]
    #[ignore]
    async fn test_upsert_is_idempotent_against_postgres() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL");
        let config = DatabaseConfig {
            url,
            max_connections: 1,
            collection: "cmc_test_idempotent".to_string(),
        };
        let store = PostgresStore::connect(&config).await.unwrap();
        store.ensure_collection().await.unwrap();
        sqlx::query("TRUNCATE cmc_test_idempotent").execute(store.pool()).await.unwrap();

        let asset = NormalizedAsset {
            name: "Bitcoin".to_string(),
            symbol: "BTC".to_string(),
            price: 1.0,
            volume_24h: 2.0,
            percent_change_1h: 0.1,
            percent_change_24h: 0.2,
            percent_change_7d: 0.3,
            market_cap_dominance: 50.0,
            circulating_supply: 19e6,
        };
        store.upsert(&asset).await.unwrap();
        store.upsert(&asset).await.unwrap();

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM cmc_test_idempotent")
            .fetch_one(store.pool())
            .await
            .unwrap();
        assert_eq!(count, 1);
        store.close().await;
    }
}
