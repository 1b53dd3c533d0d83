//! ヘルスステータス型定義
//!
//! プローブ結果と複合ヘルスレスポンスの型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// サブサービスの状態
///
/// 複合ヘルスレスポンス内の個別コンポーネントが申告する状態。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ServiceState {
    /// 正常
    Healthy,
    /// 異常
    Unhealthy,
    /// 確認中
    #[default]
    Pending,
}

impl ServiceState {
    /// ServiceStateを文字列に変換
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Unhealthy => "unhealthy",
            Self::Pending => "pending",
        }
    }
}

impl FromStr for ServiceState {
    type Err = std::convert::Infallible;

    // ワイヤ上の表記揺れを許容し、未知の値はPendingにフォールバック
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "healthy" => Self::Healthy,
            "unhealthy" => Self::Unhealthy,
            _ => Self::Pending,
        })
    }
}

impl std::fmt::Display for ServiceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// エンドポイント全体の状態
///
/// エンドポイント単位のヘルス判定。`Error`はプローブ自体の失敗
/// （タイムアウト、通信エラー、非2xx応答等）を表す。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OverallStatus {
    /// 正常
    Healthy,
    /// 異常
    Unhealthy,
    /// 確認中
    Pending,
    /// プローブ失敗
    Error,
}

impl OverallStatus {
    /// OverallStatusを文字列に変換
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Unhealthy => "unhealthy",
            Self::Pending => "pending",
            Self::Error => "error",
        }
    }

    /// 問題ありのバケットに属するか（Unhealthy / Error）
    pub fn is_problem(&self) -> bool {
        matches!(self, Self::Unhealthy | Self::Error)
    }
}

/// OverallStatus のパースエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOverallStatusError(pub String);

impl std::fmt::Display for ParseOverallStatusError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown overall status: '{}'", self.0)
    }
}

impl std::error::Error for ParseOverallStatusError {}

impl FromStr for OverallStatus {
    type Err = ParseOverallStatusError;

    // ヘルスドキュメントのstatusフィールドは大文字表記（"Healthy"等）で
    // 届くため大文字小文字を区別しない。未知の値はエラー（呼び出し側で
    // Error扱いに落とす）。
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "healthy" => Ok(Self::Healthy),
            "unhealthy" => Ok(Self::Unhealthy),
            "pending" => Ok(Self::Pending),
            "error" => Ok(Self::Error),
            _ => Err(ParseOverallStatusError(s.to_string())),
        }
    }
}

impl std::fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// サブサービスのヘルス情報
///
/// ヘルスレスポンスの`results`配列の1要素。フェッチのたびに再生成され、
/// 永続化されない。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceHealth {
    /// コンポーネント名（例: "DB"）
    pub source: String,
    /// 申告された状態
    pub status: ServiceState,
    /// 補足説明
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// サービス固有メトリクス（形式は規定しない）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<serde_json::Map<String, serde_json::Value>>,
}

/// エンドポイントのヘルスステータス
///
/// 1エンドポイントにつき最新の1件のみが有効。メモリ上でのみ保持され、
/// エンドポイント削除時に破棄される。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthStatus {
    /// 対象エンドポイントID
    pub endpoint_id: Uuid,
    /// エンドポイント全体の状態
    pub overall_status: OverallStatus,
    /// 応答時間（ミリ秒）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<u64>,
    /// HTTPステータスコード（応答が得られた場合のみ）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    /// チェック完了時刻
    pub last_checked: DateTime<Utc>,
    /// サブサービスのヘルス一覧（resultsの順序を保持）
    #[serde(default)]
    pub services: Vec<ServiceHealth>,
    /// エラーメッセージ（失敗時のみ）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
