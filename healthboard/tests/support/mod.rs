//! テスト共通ヘルパー
//!
//! インメモリDBと実ポートにバインドしたテストサーバーを提供する。

#![allow(dead_code)]

use healthboard::db::settings::SettingsStorage;
use healthboard::health::{HealthFetcher, HealthMonitor};
use healthboard::prefs::PreferencesHandle;
use healthboard::registry::EndpointRegistry;
use healthboard::AppState;
use sqlx::SqlitePool;
use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

/// テスト用のインメモリSQLiteプールを作成し、マイグレーションを実行する
pub async fn test_db_pool() -> SqlitePool {
    let pool = SqlitePool::connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");
    pool
}

/// 起動済みテストサーバー
pub struct TestServer {
    addr: SocketAddr,
    /// サーバーと同じAppState（モニター等へ直接アクセスする検証用）
    pub state: AppState,
}

impl TestServer {
    /// バインド先アドレス
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// パスからフルURLを組み立てる
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// デフォルト設定（間隔60秒・タイムアウト2秒）でテストサーバーを起動する
pub async fn spawn_test_server() -> TestServer {
    spawn_test_server_with(Duration::from_secs(60), Duration::from_secs(2)).await
}

/// 間隔とプローブタイムアウトを指定してテストサーバーを起動する
pub async fn spawn_test_server_with(interval: Duration, probe_timeout: Duration) -> TestServer {
    let pool = test_db_pool().await;

    let registry = EndpointRegistry::new(pool.clone())
        .await
        .expect("Failed to create endpoint registry");
    let prefs = PreferencesHandle::load(SettingsStorage::new(pool.clone()))
        .await
        .expect("Failed to load preferences");
    let monitor =
        HealthMonitor::new(HealthFetcher::with_timeout(probe_timeout)).with_interval(interval);

    let state = AppState {
        db_pool: pool,
        registry,
        monitor,
        prefs,
    };

    let app = healthboard::api::create_app(state.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Failed to get local addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Test server error");
    });

    TestServer { addr, state }
}

/// 条件が満たされるまで短い間隔でポーリングする（最大2秒）
pub async fn wait_until<F, Fut>(mut condition: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    loop {
        if condition().await {
            return true;
        }
        if tokio::time::Instant::now() > deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
