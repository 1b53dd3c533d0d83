//! Configuration management via environment variables
//!
//! Provides helper functions for reading `HEALTHBOARD_*` environment
//! variables with defaults.

use std::time::Duration;

/// デフォルトのポーリング間隔（秒）
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;

/// デフォルトのプローブタイムアウト（ミリ秒）
pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 5_000;

/// Get an environment variable
///
/// # Returns
/// * `Some(value)` - The environment variable value
/// * `None` - The variable is not set
pub fn get_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Get an environment variable with a default value
pub fn get_env_or(name: &str, default: &str) -> String {
    get_env(name).unwrap_or_else(|| default.to_string())
}

/// Get an environment variable, parsing to a specific type
///
/// Returns the default when the variable is unset or fails to parse.
pub fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    get_env(name).and_then(|s| s.parse().ok()).unwrap_or(default)
}

/// ポーリング設定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// 各エンドポイントの定期チェック間隔
    pub interval: Duration,
    /// 1プローブあたりのリクエストタイムアウト
    pub probe_timeout: Duration,
}

impl PollConfig {
    /// Load poll configuration from environment variables.
    pub fn from_env() -> Self {
        let interval_secs = get_env_parse(
            "HEALTHBOARD_POLL_INTERVAL_SECS",
            DEFAULT_POLL_INTERVAL_SECS,
        );
        let timeout_ms =
            get_env_parse("HEALTHBOARD_PROBE_TIMEOUT_MS", DEFAULT_PROBE_TIMEOUT_MS);

        Self {
            interval: Duration::from_secs(interval_secs),
            probe_timeout: Duration::from_millis(timeout_ms),
        }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            probe_timeout: Duration::from_millis(DEFAULT_PROBE_TIMEOUT_MS),
        }
    }
}

/// データベースURLを取得
///
/// 環境変数 `HEALTHBOARD_DATABASE_URL` から取得し、未設定の場合は
/// ホームディレクトリ配下の `~/.healthboard/healthboard.db` を使用する。
pub fn database_url() -> String {
    get_env("HEALTHBOARD_DATABASE_URL").unwrap_or_else(|| {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string());
        format!("sqlite:{}/.healthboard/healthboard.db", home)
    })
}
