//! 表示プリファレンスAPI
//!
//! 環境切り替え・テーマ・ロケールの取得と更新

use crate::api::error::AppError;
use crate::prefs::Preferences;
use crate::types::endpoint::Environment;
use crate::AppState;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

/// プリファレンスレスポンス
#[derive(Debug, Serialize)]
pub struct PreferencesResponse {
    /// 現在のプリファレンス
    #[serde(flatten)]
    pub preferences: Preferences,
    /// 選択可能な環境一覧
    pub environments: Vec<Environment>,
}

impl From<Preferences> for PreferencesResponse {
    fn from(preferences: Preferences) -> Self {
        PreferencesResponse {
            preferences,
            environments: Environment::ALL.to_vec(),
        }
    }
}

/// プリファレンス更新リクエスト（部分更新）
#[derive(Debug, Deserialize)]
pub struct UpdatePreferencesRequest {
    /// 選択環境
    #[serde(default)]
    pub environment: Option<Environment>,
    /// テーマ
    #[serde(default)]
    pub theme: Option<String>,
    /// ロケール
    #[serde(default)]
    pub locale: Option<String>,
}

/// プリファレンスを取得
///
/// GET /api/preferences
pub async fn get_preferences(State(state): State<AppState>) -> Json<PreferencesResponse> {
    Json(state.prefs.get().await.into())
}

/// プリファレンスを更新
///
/// PUT /api/preferences
///
/// 環境が変わった場合は、新しい環境のエンドポイント集合へ監視対象を
/// 差し替える（旧環境の購読は退去、新環境の購読は即座に開始）。
pub async fn update_preferences(
    State(state): State<AppState>,
    Json(request): Json<UpdatePreferencesRequest>,
) -> Result<Json<PreferencesResponse>, AppError> {
    let mut prefs = state.prefs.get().await;

    let environment_changed =
        matches!(request.environment, Some(env) if env != prefs.environment);

    if let Some(environment) = request.environment {
        prefs.environment = environment;
    }
    if let Some(theme) = request.theme {
        prefs.theme = theme;
    }
    if let Some(locale) = request.locale {
        prefs.locale = locale;
    }

    state.prefs.set(prefs.clone()).await?;

    if environment_changed {
        let watched = state.registry.list_by_environment(prefs.environment).await;
        state.monitor.reconcile(&watched).await;
        info!(
            environment = %prefs.environment,
            endpoints = watched.len(),
            "Switched active environment"
        );
    }

    Ok(Json(prefs.into()))
}
