//! APIエラーレスポンス型
//!
//! axum用の共通エラーハンドリング

use crate::common::error::HbError;
use axum::{response::IntoResponse, Json};
use serde_json::json;
use tracing::warn;

/// Axum用のエラーレスポンス型
#[derive(Debug)]
pub struct AppError(pub HbError);

impl From<HbError> for AppError {
    fn from(err: HbError) -> Self {
        AppError(err)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError(HbError::from(err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.0.status_code();

        // 外部には詳細を出さず、フルのエラーはサーバーログに残す
        if status.is_server_error() {
            warn!(error = %self.0, "API request failed");
        }

        let payload = json!({
            "error": self.0.external_message()
        });

        (status, Json(payload)).into_response()
    }
}
