//! Healthboard Server
//!
//! 環境別に登録したHTTPヘルスチェックエンドポイントを定期プローブし、
//! ダッシュボードへ集約ステータスを提供するサーバー

#![warn(missing_docs)]

/// 共通基盤（エラー型）
pub mod common;

/// REST APIハンドラー
pub mod api;

/// ヘルスチェック監視
pub mod health;

/// エンドポイント登録管理
pub mod registry;

/// データベースアクセス
pub mod db;

/// 設定管理（環境変数ヘルパー）
pub mod config;

/// 表示プリファレンス
pub mod prefs;

/// CLIインターフェース
pub mod cli;

/// サーバー初期化
pub mod bootstrap;

/// サーバー起動・シャットダウン
pub mod server;

/// 型定義
pub mod types;

/// アプリケーション状態
#[derive(Clone)]
pub struct AppState {
    /// データベース接続プール
    pub db_pool: sqlx::SqlitePool,
    /// エンドポイントレジストリ
    pub registry: registry::EndpointRegistry,
    /// ヘルスモニター
    pub monitor: health::HealthMonitor,
    /// 表示プリファレンス
    pub prefs: prefs::PreferencesHandle,
}
