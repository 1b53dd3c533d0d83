//! エンドポイントレジストリ
//!
//! エンドポイント情報をメモリにキャッシュし、高速な参照を提供する。
//! 変更はDBと同期される。

use crate::db::endpoints as db;
use crate::types::endpoint::{ApiEndpoint, Environment};
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

/// プリセットエンドポイント
///
/// 初回起動時に投入されるデフォルトの監視対象。
struct SeedEndpoint {
    name: &'static str,
    url: &'static str,
    environment: Environment,
}

/// デフォルトの監視対象一覧
const DEFAULT_ENDPOINTS: [SeedEndpoint; 5] = [
    SeedEndpoint {
        name: "Auth Service (Dev)",
        url: "https://mock.api/dev/auth/health/ready",
        environment: Environment::Dev,
    },
    SeedEndpoint {
        name: "User Service (Dev)",
        url: "https://mock.api/dev/user/health/ready",
        environment: Environment::Dev,
    },
    SeedEndpoint {
        name: "Payment Gateway (Stage)",
        url: "https://mock.api/stage/payment/health/ready",
        environment: Environment::Stage,
    },
    SeedEndpoint {
        name: "Order Processor (Prod)",
        url: "https://mock.api/prod/order/health/ready",
        environment: Environment::Prod,
    },
    SeedEndpoint {
        name: "Notification Hub (Prod)",
        url: "https://mock.api/prod/notification/health/ready",
        environment: Environment::Prod,
    },
];

/// エンドポイントレジストリ
///
/// エンドポイントのインメモリキャッシュとSQLite永続化を束ねる。
#[derive(Clone)]
pub struct EndpointRegistry {
    /// エンドポイントのインメモリキャッシュ
    endpoints: Arc<RwLock<HashMap<Uuid, ApiEndpoint>>>,
    /// データベースプール
    pool: SqlitePool,
}

impl EndpointRegistry {
    /// SQLiteプールからレジストリを作成し、DBからデータを読み込む
    pub async fn new(pool: SqlitePool) -> Result<Self, sqlx::Error> {
        let registry = Self {
            endpoints: Arc::new(RwLock::new(HashMap::new())),
            pool,
        };

        registry.load_from_db().await?;

        Ok(registry)
    }

    /// DBからエンドポイントを読み込み
    async fn load_from_db(&self) -> Result<(), sqlx::Error> {
        let loaded = db::list_endpoints(&self.pool).await?;

        let mut endpoints = self.endpoints.write().await;
        for endpoint in loaded {
            endpoints.insert(endpoint.id, endpoint);
        }

        info!(
            endpoint_count = endpoints.len(),
            "Loaded endpoints from database"
        );

        Ok(())
    }

    /// エンドポイントを取得
    pub async fn get(&self, id: Uuid) -> Option<ApiEndpoint> {
        self.endpoints.read().await.get(&id).cloned()
    }

    /// すべてのエンドポイントを取得（登録の新しい順）
    pub async fn list(&self) -> Vec<ApiEndpoint> {
        let mut all: Vec<_> = self.endpoints.read().await.values().cloned().collect();
        all.sort_by(|a, b| b.registered_at.cmp(&a.registered_at));
        all
    }

    /// 指定環境のエンドポイントを取得（登録の新しい順）
    pub async fn list_by_environment(&self, environment: Environment) -> Vec<ApiEndpoint> {
        let mut matched: Vec<_> = self
            .endpoints
            .read()
            .await
            .values()
            .filter(|e| e.environment == environment)
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.registered_at.cmp(&a.registered_at));
        matched
    }

    /// エンドポイントを追加（DBとキャッシュ両方に保存）
    pub async fn add(&self, endpoint: ApiEndpoint) -> Result<(), sqlx::Error> {
        db::create_endpoint(&self.pool, &endpoint).await?;

        self.endpoints.write().await.insert(endpoint.id, endpoint);

        Ok(())
    }

    /// エンドポイントを削除（DBとキャッシュ両方）
    pub async fn remove(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let deleted = db::delete_endpoint(&self.pool, id).await?;

        if deleted {
            self.endpoints.write().await.remove(&id);
        }

        Ok(deleted)
    }

    /// デフォルトエンドポイントを投入
    ///
    /// 名前+環境が一致するレコードが既に存在するものはスキップする。
    /// 何度呼んでも結果は変わらない。追加した件数を返す。
    pub async fn seed_defaults(&self) -> Result<usize, sqlx::Error> {
        let mut inserted = 0;

        for seed in &DEFAULT_ENDPOINTS {
            let existing =
                db::find_by_name_and_environment(&self.pool, seed.name, seed.environment).await?;
            if existing.is_some() {
                debug!(name = seed.name, "Seed endpoint already present, skipping");
                continue;
            }

            let endpoint = ApiEndpoint::new(
                seed.name.to_string(),
                seed.url.to_string(),
                seed.environment,
            );
            self.add(endpoint).await?;
            inserted += 1;
        }

        if inserted > 0 {
            info!(inserted, "Seeded default endpoints");
        }

        Ok(inserted)
    }

    /// エンドポイント数を取得
    pub async fn count(&self) -> usize {
        self.endpoints.read().await.len()
    }

    /// DBプールへの参照を取得
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
