//! サーバー初期化ロジック
//!
//! データベース接続、レジストリ初期化、ヘルスモニター起動など
//! サーバー起動に必要なコンポーネントの初期化を担当する。

use crate::config::{self, PollConfig};
use crate::db::settings::SettingsStorage;
use crate::health::{HealthFetcher, HealthMonitor};
use crate::prefs::PreferencesHandle;
use crate::registry::EndpointRegistry;
use crate::AppState;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::SqlitePool;
use std::str::FromStr;
use tracing::info;

/// サーバー初期化を実行する
///
/// DB接続、マイグレーション、シード投入、レジストリとモニターの初期化を
/// 行い、`AppState`を返す。アクティブ環境のエンドポイントは即座に監視が
/// 始まる。
pub async fn initialize() -> AppState {
    info!("Healthboard v{}", env!("CARGO_PKG_VERSION"));

    let database_url = config::database_url();
    let db_pool = init_db_pool(&database_url)
        .await
        .expect("Failed to connect to database");

    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .expect("Failed to run database migrations");

    let registry = EndpointRegistry::new(db_pool.clone())
        .await
        .expect("Failed to create endpoint registry");

    registry
        .seed_defaults()
        .await
        .expect("Failed to seed default endpoints");

    let prefs = PreferencesHandle::load(SettingsStorage::new(db_pool.clone()))
        .await
        .expect("Failed to load preferences");

    let poll_config = PollConfig::from_env();
    let monitor = HealthMonitor::new(HealthFetcher::with_timeout(poll_config.probe_timeout))
        .with_interval(poll_config.interval);

    let environment = prefs.environment().await;
    let watched = registry.list_by_environment(environment).await;
    monitor.reconcile(&watched).await;

    info!(
        environment = %environment,
        endpoints = watched.len(),
        interval_secs = poll_config.interval.as_secs(),
        "Health monitoring started"
    );

    AppState {
        db_pool,
        registry,
        monitor,
        prefs,
    }
}

/// SQLite接続プールを作成する
///
/// ファイルDBの場合は親ディレクトリを作成し、DBファイルが無ければ
/// 新規作成する。
async fn init_db_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    if let Some(path) = database_url.strip_prefix("sqlite:") {
        if path != ":memory:" {
            if let Some(parent) = std::path::Path::new(path).parent() {
                let _ = std::fs::create_dir_all(parent);
            }
        }
    }

    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    SqlitePool::connect_with(options).await
}
