//! ダッシュボードAPIハンドラー
//!
//! ステータススナップショットと集計値を返却する

use crate::health::aggregate::{counts_by_status, most_recent_check};
use crate::health::monitor::HealthSnapshot;
use crate::types::endpoint::Environment;
use crate::AppState;
use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// 全体リフレッシュのレスポンス
#[derive(Debug, Serialize)]
pub struct RefreshAllResponse {
    /// プローブ要求を発行した購読数
    pub requested: usize,
}

/// ダッシュボード集計レスポンス
#[derive(Debug, Serialize)]
pub struct DashboardOverview {
    /// 集計対象の環境
    pub environment: Environment,
    /// 環境内の監視対象総数
    pub total: usize,
    /// 正常なエンドポイント数
    pub healthy: usize,
    /// 異常またはプローブ失敗のエンドポイント数
    pub unhealthy_or_error: usize,
    /// 確認中のエンドポイント数
    pub pending: usize,
    /// 最新のチェック時刻（ステータスが1件も無ければnull）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_checked: Option<DateTime<Utc>>,
    /// 初回プローブ未完了の購読があるか
    pub is_loading: bool,
    /// 実行中のプローブがあるか
    pub is_refreshing: bool,
}

/// 現在のヘルススナップショットを取得
///
/// GET /api/health
pub async fn get_health(State(state): State<AppState>) -> Json<HealthSnapshot> {
    Json(state.monitor.snapshot().await)
}

/// 全購読の手動リフレッシュ
///
/// POST /api/health/refresh
pub async fn refresh_all(State(state): State<AppState>) -> Json<RefreshAllResponse> {
    let requested = state.monitor.refetch_all().await;
    Json(RefreshAllResponse { requested })
}

/// ダッシュボード集計を取得
///
/// GET /api/dashboard/overview
///
/// アクティブ環境のエンドポイント総数と、現在のステータス集合の
/// 区分別件数・最新チェック時刻を返す。まだステータスの無い
/// エンドポイント数は `total - (healthy + unhealthy_or_error + pending)`
/// で導出できる。
pub async fn get_overview(State(state): State<AppState>) -> Json<DashboardOverview> {
    let environment = state.prefs.environment().await;
    let endpoints = state.registry.list_by_environment(environment).await;
    let snapshot = state.monitor.snapshot().await;

    let counts = counts_by_status(&snapshot.statuses);

    Json(DashboardOverview {
        environment,
        total: endpoints.len(),
        healthy: counts.healthy,
        unhealthy_or_error: counts.unhealthy_or_error,
        pending: counts.pending,
        last_checked: most_recent_check(&snapshot.statuses),
        is_loading: snapshot.is_loading,
        is_refreshing: snapshot.is_refreshing,
    })
}
