use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Sqlite};
use tokio::sync::broadcast;

use super::{notify, KeyValueStore, StoreEvent, EVENT_CHANNEL_CAPACITY};

/// 基于 `user_settings` 表的持久化键值存储
///
/// 变更通知只覆盖通过本实例写入的数据。
#[derive(Clone)]
pub struct SqliteStore {
    pool: Pool<Sqlite>,
    events: broadcast::Sender<StoreEvent>,
}

impl SqliteStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { pool, events }
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let value = sqlx::query_scalar::<_, String>("SELECT value FROM user_settings WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO user_settings (key, value, updated_at) VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        notify(&self.events, key, Some(value));
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM user_settings WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() > 0 {
            notify(&self.events, key, None);
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;

    #[tokio::test]
    async fn test_upsert_and_notify() {
        let database = Database::connect("sqlite::memory:").await.unwrap();
        let store = SqliteStore::new(database.pool().clone());
        let mut events = store.subscribe();

        store.set("favorites:s1", "[\"a\"]").await.unwrap();
        store.set("favorites:s1", "[\"a\",\"b\"]").await.unwrap();
        assert_eq!(
            store.get("favorites:s1").await.unwrap().as_deref(),
            Some("[\"a\",\"b\"]")
        );

        store.remove("favorites:s1").await.unwrap();
        assert!(store.get("favorites:s1").await.unwrap().is_none());

        assert_eq!(events.recv().await.unwrap().value.as_deref(), Some("[\"a\"]"));
        assert_eq!(events.recv().await.unwrap().value.as_deref(), Some("[\"a\",\"b\"]"));
        assert_eq!(events.recv().await.unwrap().value, None);
    }
}
