//! エンドポイント型定義
//!
//! 監視対象エンドポイントと環境区分の型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// デプロイ環境
///
/// エンドポイント集合と表示ビューを区分する固定の環境タグ。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    /// 開発環境
    #[default]
    Dev,
    /// ステージング環境
    Stage,
    /// 本番環境
    Prod,
}

impl Environment {
    /// 全環境の一覧（セレクタ表示用）
    pub const ALL: [Environment; 3] = [Self::Dev, Self::Stage, Self::Prod];

    /// Environmentを文字列に変換
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dev => "dev",
            Self::Stage => "stage",
            Self::Prod => "prod",
        }
    }
}

/// Environment のパースエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnvironmentError(pub String);

impl std::fmt::Display for ParseEnvironmentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown environment: '{}'", self.0)
    }
}

impl std::error::Error for ParseEnvironmentError {}

impl FromStr for Environment {
    type Err = ParseEnvironmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dev" => Ok(Self::Dev),
            "stage" => Ok(Self::Stage),
            "prod" => Ok(Self::Prod),
            _ => Err(ParseEnvironmentError(s.to_string())),
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 監視対象エンドポイント
///
/// ヘルスチェック対象のURLを表すエンティティ。
/// 作成後の編集操作は存在せず、削除されるまで不変。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiEndpoint {
    /// 一意識別子
    pub id: Uuid,
    /// 表示名（例: "Auth Service (Dev)"）
    pub name: String,
    /// ヘルスチェックURL
    pub url: String,
    /// 所属環境
    pub environment: Environment,
    /// 登録日時
    pub registered_at: DateTime<Utc>,
}

impl ApiEndpoint {
    /// 新しいエンドポイントを作成
    pub fn new(name: String, url: String, environment: Environment) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            url,
            environment,
            registered_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_serialization() {
        assert_eq!(
            serde_json::to_string(&Environment::Dev).unwrap(),
            "\"dev\""
        );
        assert_eq!(
            serde_json::to_string(&Environment::Stage).unwrap(),
            "\"stage\""
        );
        assert_eq!(
            serde_json::to_string(&Environment::Prod).unwrap(),
            "\"prod\""
        );
    }

    #[test]
    fn test_environment_from_str() {
        assert_eq!("dev".parse::<Environment>().unwrap(), Environment::Dev);
        assert_eq!("stage".parse::<Environment>().unwrap(), Environment::Stage);
        assert_eq!("prod".parse::<Environment>().unwrap(), Environment::Prod);
        // 未知の値はエラーを返す
        assert!("qa".parse::<Environment>().is_err());
        assert!("".parse::<Environment>().is_err());
    }

    #[test]
    fn test_environment_from_str_case_sensitive() {
        assert!("Dev".parse::<Environment>().is_err());
        assert!("PROD".parse::<Environment>().is_err());
    }

    #[test]
    fn test_environment_serde_roundtrip() {
        for env in Environment::ALL {
            let json = serde_json::to_string(&env).unwrap();
            let deserialized: Environment = serde_json::from_str(&json).unwrap();
            assert_eq!(deserialized, env);
        }
    }

    #[test]
    fn test_environment_as_str_matches_display() {
        for env in Environment::ALL {
            assert_eq!(env.as_str(), &env.to_string());
        }
    }

    #[test]
    fn test_environment_default() {
        let env: Environment = Default::default();
        assert_eq!(env, Environment::Dev);
    }

    #[test]
    fn test_parse_environment_error_display() {
        let err = "qa".parse::<Environment>().unwrap_err();
        assert_eq!(err.to_string(), "unknown environment: 'qa'");
        assert_eq!(err.0, "qa");
    }

    #[test]
    fn test_api_endpoint_new() {
        let endpoint = ApiEndpoint::new(
            "Auth Service (Dev)".to_string(),
            "https://mock.api/dev/auth/health/ready".to_string(),
            Environment::Dev,
        );
        assert_eq!(endpoint.name, "Auth Service (Dev)");
        assert_eq!(endpoint.url, "https://mock.api/dev/auth/health/ready");
        assert_eq!(endpoint.environment, Environment::Dev);
        assert!(!endpoint.id.is_nil());
    }

    #[test]
    fn test_api_endpoint_ids_are_unique() {
        let a = ApiEndpoint::new("A".to_string(), "http://a".to_string(), Environment::Dev);
        let b = ApiEndpoint::new("A".to_string(), "http://a".to_string(), Environment::Dev);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_api_endpoint_serde_roundtrip() {
        let endpoint = ApiEndpoint::new(
            "Order Processor (Prod)".to_string(),
            "https://mock.api/prod/order/health/ready".to_string(),
            Environment::Prod,
        );
        let json = serde_json::to_string(&endpoint).unwrap();
        let deserialized: ApiEndpoint = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, endpoint);
    }
}
