//! # Key-Value Repository
//!
//! Durable [`KeyValueStore`] over the `key_value_store` table.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::StorageResult;
use crate::store::KeyValueStore;

/// SQLite-backed key-value store.
#[derive(Debug, Clone)]
pub struct SqliteKeyValueStore {
    pool: SqlitePool,
}

impl SqliteKeyValueStore {
    /// Creates a new SqliteKeyValueStore.
    pub fn new(pool: SqlitePool) -> Self {
        SqliteKeyValueStore { pool }
    }
}

#[async_trait]
impl KeyValueStore for SqliteKeyValueStore {
    async fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM key_value_store WHERE key = ?1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        debug!(key = %key, found = value.is_some(), "Read key");
        Ok(value)
    }

    /// Writes the value, replacing any previous one in a single statement.
    async fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO key_value_store (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(now)
        .execute(&self.pool)
        .await?;

        debug!(key = %key, bytes = value.len(), "Wrote key");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;
    use crate::pool::{Database, DbConfig};

    async fn store() -> (Database, SqliteKeyValueStore) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let store = db.key_value_store();
        (db, store)
    }

    #[tokio::test]
    async fn test_get_missing_key() {
        let (_db, store) = store().await;
        assert_eq!(store.get_item("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let (_db, store) = store().await;

        store.set_item("k", "[]").await.unwrap();
        assert_eq!(store.get_item("k").await.unwrap().as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn test_set_replaces_existing_value() {
        let (db, store) = store().await;

        store.set_item("k", "first").await.unwrap();
        store.set_item("k", "second").await.unwrap();

        assert_eq!(store.get_item("k").await.unwrap().as_deref(), Some("second"));

        let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM key_value_store")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let (_db, store) = store().await;

        store.set_item("a", "1").await.unwrap();
        store.set_item("b", "2").await.unwrap();

        assert_eq!(store.get_item("a").await.unwrap().as_deref(), Some("1"));
        assert_eq!(store.get_item("b").await.unwrap().as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn test_closed_pool_reports_unavailable() {
        let (db, store) = store().await;
        db.close().await;

        assert!(matches!(
            store.set_item("k", "v").await,
            Err(StorageError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cart.db");

        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        db.key_value_store().set_item("k", "persisted").await.unwrap();
        db.close().await;

        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        assert_eq!(
            db.key_value_store().get_item("k").await.unwrap().as_deref(),
            Some("persisted")
        );
    }
}
