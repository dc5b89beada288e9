use crate::error::{RaspawinError, Result};
use crate::storage::KeyValueStore;
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use tokio::sync::Mutex;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub async fn new(db_path: &Path) -> Result<Self> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = db_path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                RaspawinError::internal(format!("Failed to create directory: {}", e))
            })?;
        }

        let conn = Connection::open(db_path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };

        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock().await;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            )",
            [],
        )?;

        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().await;

        let value = conn
            .query_row(
                "SELECT value FROM kv WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;

        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn.lock().await;

        conn.execute(
            "INSERT OR REPLACE INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)",
            params![key, value, Utc::now().timestamp()],
        )?;

        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_set_get_remove() {
        let temp_dir = tempdir().unwrap();
        let store = SqliteStore::new(&temp_dir.path().join("data").join("raspawin.db"))
            .await
            .unwrap();

        assert_eq!(store.get("balance").await.unwrap(), None);

        store.set("balance", "9500").await.unwrap();
        assert_eq!(store.get("balance").await.unwrap().as_deref(), Some("9500"));

        store.set("balance", "14500").await.unwrap();
        assert_eq!(store.get("balance").await.unwrap().as_deref(), Some("14500"));

        store.remove("balance").await.unwrap();
        assert_eq!(store.get("balance").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_values_survive_reopen() {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("raspawin.db");

        {
            let store = SqliteStore::new(&db_path).await.unwrap();
            store.set("raspawin:client-1:p1", "{}").await.unwrap();
        }

        let store = SqliteStore::new(&db_path).await.unwrap();
        assert_eq!(
            store.get("raspawin:client-1:p1").await.unwrap().as_deref(),
            Some("{}")
        );
    }
}
