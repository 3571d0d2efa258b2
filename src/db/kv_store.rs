use async_trait::async_trait;
use chrono::Utc;
use nibble_core::{KeyValueStore, StorageError};
use sqlx::SqlitePool;

/// [`KeyValueStore`] backed by the `kv_store` table.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn read_error(key: &str, e: sqlx::Error) -> StorageError {
    StorageError::Read {
        key: key.to_string(),
        message: e.to_string(),
    }
}

fn write_error(key: &str, e: sqlx::Error) -> StorageError {
    StorageError::Write {
        key: key.to_string(),
        message: e.to_string(),
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        sqlx::query_scalar::<_, String>("SELECT value FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| read_error(key, e))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(key, e))?;

        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM kv_store WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| write_error(key, e))?;

        Ok(())
    }

    /// Removes all keys in a single transaction.
    async fn multi_remove(&self, keys: &[&str]) -> Result<(), StorageError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;

        for key in keys {
            sqlx::query("DELETE FROM kv_store WHERE key = ?")
                .bind(*key)
                .execute(&mut *tx)
                .await
                .map_err(|e| write_error(key, e))?;
        }

        tx.commit()
            .await
            .map_err(|e| StorageError::Unavailable(e.to_string()))
    }
}
