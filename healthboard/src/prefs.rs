//! 表示プリファレンス
//!
//! 選択中環境・テーマ・ロケールをプロセス全体の明示的な状態として扱う。
//! 起動時に設定テーブルから読み込み、変更のたびにストレージへ書き戻す。
//! 隠れたシングルトンは持たず、`AppState`経由で依存として注入される。

use crate::common::error::HbResult;
use crate::db::settings::SettingsStorage;
use crate::types::endpoint::Environment;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

const KEY_ENVIRONMENT: &str = "environment";
const KEY_THEME: &str = "theme";
const KEY_LOCALE: &str = "locale";

const DEFAULT_THEME: &str = "system";
const DEFAULT_LOCALE: &str = "en";

/// 表示プリファレンス
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Preferences {
    /// 選択中の環境
    pub environment: Environment,
    /// テーマ（"system" / "light" / "dark"）
    pub theme: String,
    /// 表示ロケール
    pub locale: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            theme: DEFAULT_THEME.to_string(),
            locale: DEFAULT_LOCALE.to_string(),
        }
    }
}

/// プリファレンスハンドル
///
/// メモリ上の現在値と書き戻し先ストレージを束ねる。
#[derive(Clone)]
pub struct PreferencesHandle {
    storage: SettingsStorage,
    current: Arc<RwLock<Preferences>>,
}

impl PreferencesHandle {
    /// ストレージから初期値を読み込んでハンドルを作成
    ///
    /// 保存値が無い・解釈できないキーはデフォルトにフォールバックする。
    pub async fn load(storage: SettingsStorage) -> HbResult<Self> {
        let environment = storage
            .get_setting(KEY_ENVIRONMENT)
            .await?
            .and_then(|s| s.parse().ok())
            .unwrap_or_default();
        let theme = storage
            .get_setting(KEY_THEME)
            .await?
            .unwrap_or_else(|| DEFAULT_THEME.to_string());
        let locale = storage
            .get_setting(KEY_LOCALE)
            .await?
            .unwrap_or_else(|| DEFAULT_LOCALE.to_string());

        Ok(Self {
            storage,
            current: Arc::new(RwLock::new(Preferences {
                environment,
                theme,
                locale,
            })),
        })
    }

    /// 現在値を取得
    pub async fn get(&self) -> Preferences {
        self.current.read().await.clone()
    }

    /// 選択中の環境を取得
    pub async fn environment(&self) -> Environment {
        self.current.read().await.environment
    }

    /// プリファレンスを更新（write-through）
    ///
    /// ストレージへの書き込みが成功した場合のみメモリ上の値を差し替える。
    pub async fn set(&self, prefs: Preferences) -> HbResult<()> {
        self.storage
            .set_setting(KEY_ENVIRONMENT, prefs.environment.as_str())
            .await?;
        self.storage.set_setting(KEY_THEME, &prefs.theme).await?;
        self.storage.set_setting(KEY_LOCALE, &prefs.locale).await?;

        *self.current.write().await = prefs;
        Ok(())
    }
}
