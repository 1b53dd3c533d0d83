//! REST APIハンドラー
//!
//! エンドポイント管理、ヘルススナップショット、ダッシュボード集計

pub mod dashboard;
pub mod endpoints;
pub mod error;
pub mod preferences;

use crate::AppState;
use axum::routing::{get, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// APIルーターを作成
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/endpoints",
            get(endpoints::list_endpoints).post(endpoints::create_endpoint),
        )
        .route(
            "/api/endpoints/:id",
            get(endpoints::get_endpoint).delete(endpoints::delete_endpoint),
        )
        .route(
            "/api/endpoints/:id/refresh",
            post(endpoints::refresh_endpoint),
        )
        .route("/api/health", get(dashboard::get_health))
        .route("/api/health/refresh", post(dashboard::refresh_all))
        .route("/api/dashboard/overview", get(dashboard::get_overview))
        .route(
            "/api/preferences",
            get(preferences::get_preferences).put(preferences::update_preferences),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
