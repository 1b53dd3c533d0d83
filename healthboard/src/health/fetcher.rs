//! エンドポイントプローブ
//!
//! 1エンドポイントに対する単発のヘルスチェックを実行し、
//! 応答・失敗のあらゆる形を`HealthStatus`に正規化する

use crate::config::DEFAULT_PROBE_TIMEOUT_MS;
use crate::types::endpoint::ApiEndpoint;
use crate::types::health::{HealthStatus, OverallStatus, ServiceHealth, ServiceState};
use chrono::Utc;
use reqwest::Client;
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::debug;

/// ヘルスフェッチャー
///
/// タイムアウトを焼き込んだHTTPクライアントを保持する。
/// `probe`は呼び出し元に決してエラーを伝播しない。
#[derive(Clone)]
pub struct HealthFetcher {
    /// HTTPクライアント
    client: Client,
}

impl HealthFetcher {
    /// デフォルトタイムアウト（5秒）でフェッチャーを作成
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_millis(DEFAULT_PROBE_TIMEOUT_MS))
    }

    /// タイムアウトを指定してフェッチャーを作成
    pub fn with_timeout(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { client }
    }

    /// 単一エンドポイントのプローブを実行
    ///
    /// 応答の有無によらずタイムアウト以内に必ず解決し、失敗は
    /// `overall_status = Error`とエラーメッセージのデータとして返す。
    /// `last_checked`は結果によらず完了時刻が刻まれる。
    pub async fn probe(&self, endpoint: &ApiEndpoint) -> HealthStatus {
        let start = Instant::now();

        match self.client.get(&endpoint.url).send().await {
            Ok(response) => {
                let response_time_ms = start.elapsed().as_millis() as u64;
                let status_code = response.status().as_u16();

                if response.status().is_success() {
                    let body = match response.text().await {
                        Ok(body) => body,
                        Err(e) => {
                            return error_status(
                                endpoint,
                                response_time_ms,
                                Some(status_code),
                                format!("Failed to read response body: {}", e),
                            )
                        }
                    };

                    let (overall_status, services, error) = parse_health_document(&body);

                    debug!(
                        endpoint_id = %endpoint.id,
                        endpoint_name = %endpoint.name,
                        status = %overall_status,
                        latency_ms = response_time_ms,
                        "Probe completed"
                    );

                    HealthStatus {
                        endpoint_id: endpoint.id,
                        overall_status,
                        response_time_ms: Some(response_time_ms),
                        status_code: Some(status_code),
                        last_checked: Utc::now(),
                        services,
                        error,
                    }
                } else {
                    let error = resolve_failure_message(response, status_code).await;

                    debug!(
                        endpoint_id = %endpoint.id,
                        endpoint_name = %endpoint.name,
                        status_code,
                        error = %error,
                        "Probe received failure response"
                    );

                    error_status(endpoint, response_time_ms, Some(status_code), error)
                }
            }
            Err(e) => {
                let response_time_ms = start.elapsed().as_millis() as u64;
                let status_code = e.status().map(|s| s.as_u16());

                // タイムアウトはそれと分かるメッセージで区別する
                let error = if e.is_timeout() {
                    "Request timed out".to_string()
                } else if e.is_connect() {
                    format!("Connection failed: {}", e)
                } else {
                    e.to_string()
                };

                debug!(
                    endpoint_id = %endpoint.id,
                    endpoint_name = %endpoint.name,
                    error = %error,
                    "Probe transport failure"
                );

                error_status(endpoint, response_time_ms, status_code, error)
            }
        }
    }
}

impl Default for HealthFetcher {
    fn default() -> Self {
        Self::new()
    }
}

/// 失敗を表すHealthStatusを組み立てる
fn error_status(
    endpoint: &ApiEndpoint,
    response_time_ms: u64,
    status_code: Option<u16>,
    error: String,
) -> HealthStatus {
    HealthStatus {
        endpoint_id: endpoint.id,
        overall_status: OverallStatus::Error,
        response_time_ms: Some(response_time_ms),
        status_code,
        last_checked: Utc::now(),
        services: vec![],
        error: Some(error),
    }
}

/// 2xx応答のボディをヘルスドキュメントとして解釈する
///
/// 期待形: `{ "status": "Healthy", "results": [{source, status, ...}] }`。
/// `results`が無ければ空列として扱う。`status`が欠落または未知の値の
/// 場合は黙ってHealthyを報告せず、Errorと説明メッセージに落とす。
fn parse_health_document(body: &str) -> (OverallStatus, Vec<ServiceHealth>, Option<String>) {
    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(_) => {
            return (
                OverallStatus::Error,
                vec![],
                Some("Health response was not valid JSON".to_string()),
            )
        }
    };

    let services = value
        .get("results")
        .and_then(|r| r.as_array())
        .map(|entries| entries.iter().map(service_from_value).collect())
        .unwrap_or_default();

    match value.get("status").and_then(|s| s.as_str()) {
        Some(raw) => match raw.parse::<OverallStatus>() {
            Ok(status) => (status, services, None),
            Err(_) => (
                OverallStatus::Error,
                services,
                Some(format!("Unexpected status value '{}' in health response", raw)),
            ),
        },
        None => (
            OverallStatus::Error,
            services,
            Some("Health response is missing the status field".to_string()),
        ),
    }
}

/// `results`配列の1要素を`ServiceHealth`へ変換する
fn service_from_value(value: &Value) -> ServiceHealth {
    ServiceHealth {
        source: value
            .get("source")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string(),
        status: value
            .get("status")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .parse()
            .unwrap_or(ServiceState::Pending),
        description: value
            .get("description")
            .and_then(|v| v.as_str())
            .map(String::from),
        metrics: value.get("metrics").and_then(|v| v.as_object()).cloned(),
    }
}

/// 非2xx応答からエラーメッセージを解決する
///
/// JSON文字列ボディはそのまま、`message`フィールドを持つオブジェクトは
/// その値、その他はボディのテキスト、空なら汎用メッセージ。
async fn resolve_failure_message(response: reqwest::Response, status_code: u16) -> String {
    let fallback = format!("Request failed with status {}", status_code);

    let body = match response.text().await {
        Ok(body) => body,
        Err(_) => return fallback,
    };

    match serde_json::from_str::<Value>(&body) {
        Ok(Value::String(message)) if !message.is_empty() => message,
        Ok(value) => match value.get("message").and_then(|m| m.as_str()) {
            Some(message) => message.to_string(),
            None => non_empty_or(&body, fallback),
        },
        Err(_) => non_empty_or(&body, fallback),
    }
}

fn non_empty_or(body: &str, fallback: String) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        fallback
    } else {
        trimmed.to_string()
    }
}
