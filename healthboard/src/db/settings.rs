//! 設定テーブルのストレージ層
//!
//! SQLiteベースのキーバリュー設定を永続化

use crate::common::error::{HbError, HbResult};
use sqlx::SqlitePool;

/// 設定ストレージ
#[derive(Clone)]
pub struct SettingsStorage {
    pool: SqlitePool,
}

impl SettingsStorage {
    /// 新しいストレージインスタンスを作成
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// 設定値を取得
    pub async fn get_setting(&self, key: &str) -> HbResult<Option<String>> {
        let result = sqlx::query_scalar::<_, String>("SELECT value FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| HbError::Database(format!("Failed to get setting: {}", e)))?;

        Ok(result)
    }

    /// 設定値を保存（INSERT OR REPLACE）
    pub async fn set_setting(&self, key: &str, value: &str) -> HbResult<()> {
        sqlx::query(
            "INSERT OR REPLACE INTO settings (key, value, updated_at) VALUES (?, ?, datetime('now'))",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(|e| HbError::Database(format!("Failed to set setting: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_utils::test_db_pool;

    #[tokio::test]
    async fn test_get_missing_setting_returns_none() {
        let storage = SettingsStorage::new(test_db_pool().await);
        assert_eq!(storage.get_setting("environment").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_and_get_setting() {
        let storage = SettingsStorage::new(test_db_pool().await);

        storage.set_setting("environment", "prod").await.unwrap();
        assert_eq!(
            storage.get_setting("environment").await.unwrap(),
            Some("prod".to_string())
        );
    }

    #[tokio::test]
    async fn test_set_setting_overwrites() {
        let storage = SettingsStorage::new(test_db_pool().await);

        storage.set_setting("theme", "light").await.unwrap();
        storage.set_setting("theme", "dark").await.unwrap();
        assert_eq!(
            storage.get_setting("theme").await.unwrap(),
            Some("dark".to_string())
        );
    }
}
