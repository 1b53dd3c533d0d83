//! エンドポイント管理API

use crate::api::error::AppError;
use crate::common::error::{CommonError, HbError};
use crate::types::endpoint::{ApiEndpoint, Environment};
use crate::types::health::HealthStatus;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

/// エンドポイント登録リクエスト
#[derive(Debug, Deserialize)]
pub struct CreateEndpointRequest {
    /// 表示名
    pub name: String,
    /// ヘルスチェックURL
    pub url: String,
    /// 所属環境
    pub environment: Environment,
}

/// エンドポイントレスポンス
#[derive(Debug, Serialize)]
pub struct EndpointResponse {
    /// 一意識別子
    pub id: Uuid,
    /// 表示名
    pub name: String,
    /// ヘルスチェックURL
    pub url: String,
    /// 所属環境
    pub environment: Environment,
    /// 登録日時
    pub registered_at: String,
}

impl From<ApiEndpoint> for EndpointResponse {
    fn from(ep: ApiEndpoint) -> Self {
        EndpointResponse {
            id: ep.id,
            name: ep.name,
            url: ep.url,
            environment: ep.environment,
            registered_at: ep.registered_at.to_rfc3339(),
        }
    }
}

/// エンドポイント一覧レスポンス
#[derive(Debug, Serialize)]
pub struct ListEndpointsResponse {
    /// エンドポイント一覧
    pub endpoints: Vec<EndpointResponse>,
    /// 総数
    pub total: usize,
}

/// エンドポイント一覧クエリパラメータ
#[derive(Debug, Deserialize)]
pub struct ListEndpointsQuery {
    /// 環境でフィルタ（dev / stage / prod）
    #[serde(default)]
    pub environment: Option<String>,
}

/// エンドポイント詳細レスポンス（現在のヘルス付き）
#[derive(Debug, Serialize)]
pub struct EndpointDetailResponse {
    /// エンドポイント情報
    #[serde(flatten)]
    pub endpoint: EndpointResponse,
    /// 現在のヘルスステータス（初回プローブ完了前はnull）
    pub health: Option<HealthStatus>,
}

/// リフレッシュ要求レスポンス
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    /// プローブ要求を発行したか
    pub requested: bool,
}

/// エンドポイント一覧を取得
///
/// GET /api/endpoints?environment=dev
pub async fn list_endpoints(
    State(state): State<AppState>,
    Query(query): Query<ListEndpointsQuery>,
) -> Result<Json<ListEndpointsResponse>, AppError> {
    let endpoints = match query.environment.as_deref() {
        Some(raw) => {
            let environment: Environment = raw
                .parse()
                .map_err(|e: crate::types::endpoint::ParseEnvironmentError| {
                    HbError::Common(CommonError::Validation(e.to_string()))
                })?;
            state.registry.list_by_environment(environment).await
        }
        None => state.registry.list().await,
    };

    let endpoints: Vec<EndpointResponse> = endpoints.into_iter().map(Into::into).collect();
    let total = endpoints.len();

    Ok(Json(ListEndpointsResponse { endpoints, total }))
}

/// エンドポイントを登録
///
/// POST /api/endpoints
///
/// アクティブ環境に属するエンドポイントは登録と同時に監視を開始する
/// （初回プローブは遅延なしで走る）。
pub async fn create_endpoint(
    State(state): State<AppState>,
    Json(request): Json<CreateEndpointRequest>,
) -> Result<(StatusCode, Json<EndpointResponse>), AppError> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(HbError::Common(CommonError::Validation(
            "name must not be empty".to_string(),
        ))
        .into());
    }

    let url = Url::parse(request.url.trim()).map_err(|e| {
        HbError::Common(CommonError::Validation(format!("invalid url: {}", e)))
    })?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(HbError::Common(CommonError::Validation(
            "url scheme must be http or https".to_string(),
        ))
        .into());
    }

    let endpoint = ApiEndpoint::new(name.to_string(), url.to_string(), request.environment);

    state.registry.add(endpoint.clone()).await?;

    info!(
        endpoint_id = %endpoint.id,
        endpoint_name = %endpoint.name,
        environment = %endpoint.environment,
        "Endpoint registered"
    );

    if endpoint.environment == state.prefs.environment().await {
        state.monitor.watch(endpoint.clone()).await;
    }

    Ok((StatusCode::CREATED, Json(endpoint.into())))
}

/// エンドポイント詳細を取得
///
/// GET /api/endpoints/:id
pub async fn get_endpoint(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<EndpointDetailResponse>, AppError> {
    let endpoint = state
        .registry
        .get(id)
        .await
        .ok_or(HbError::EndpointNotFound(id))?;

    let health = state.monitor.status_of(id).await;

    Ok(Json(EndpointDetailResponse {
        endpoint: endpoint.into(),
        health,
    }))
}

/// エンドポイントを削除
///
/// DELETE /api/endpoints/:id
///
/// 削除と同時に購読を退去させる。実行中のプローブがあっても、その結果が
/// ステータス集合に現れることはない。
pub async fn delete_endpoint(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let deleted = state.registry.remove(id).await?;
    if !deleted {
        return Err(HbError::EndpointNotFound(id).into());
    }

    state.monitor.evict(id).await;

    info!(endpoint_id = %id, "Endpoint deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// 単一エンドポイントの手動リフレッシュ
///
/// POST /api/endpoints/:id/refresh
///
/// 定期タイマーとは独立した時間外プローブを1回だけ要求する。
pub async fn refresh_endpoint(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RefreshResponse>, AppError> {
    if state.registry.get(id).await.is_none() {
        return Err(HbError::EndpointNotFound(id).into());
    }

    let requested = state.monitor.refetch_one(id).await;
    if !requested {
        // 登録はあるがアクティブ環境に属しておらず監視対象外
        return Err(HbError::Conflict(format!("endpoint {} is not being monitored", id)).into());
    }

    Ok(Json(RefreshResponse { requested }))
}
