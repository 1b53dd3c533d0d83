//! ステータス集計
//!
//! 現在のステータス集合から表示用の集計値を導出する純関数群

use crate::types::health::{HealthStatus, OverallStatus};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// ステータス別件数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    /// 正常
    pub healthy: usize,
    /// 異常またはプローブ失敗
    pub unhealthy_or_error: usize,
    /// 確認中
    pub pending: usize,
}

/// ステータスを区分して数える
///
/// UnhealthyとErrorは同じ「問題あり」バケットにまとめる。
/// まだステータスが無いエンドポイントは入力に現れないため数えない。
pub fn counts_by_status(statuses: &[HealthStatus]) -> StatusCounts {
    let mut counts = StatusCounts {
        healthy: 0,
        unhealthy_or_error: 0,
        pending: 0,
    };

    for status in statuses {
        match status.overall_status {
            OverallStatus::Healthy => counts.healthy += 1,
            OverallStatus::Unhealthy | OverallStatus::Error => counts.unhealthy_or_error += 1,
            OverallStatus::Pending => counts.pending += 1,
        }
    }

    counts
}

/// 最新のチェック時刻を返す
///
/// 入力が空の場合はNone。「データ取得時点」のグローバル表示に使う。
pub fn most_recent_check(statuses: &[HealthStatus]) -> Option<DateTime<Utc>> {
    statuses.iter().map(|s| s.last_checked).max()
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn status_with(overall_status: OverallStatus, last_checked: &str) -> HealthStatus {
        HealthStatus {
            endpoint_id: Uuid::new_v4(),
            overall_status,
            response_time_ms: None,
            status_code: None,
            last_checked: last_checked.parse().unwrap(),
            services: vec![],
            error: None,
        }
    }

    #[test]
    fn test_counts_by_status_buckets() {
        let statuses = vec![
            status_with(OverallStatus::Healthy, "2026-08-07T10:00:00Z"),
            status_with(OverallStatus::Unhealthy, "2026-08-07T10:00:01Z"),
            status_with(OverallStatus::Error, "2026-08-07T10:00:02Z"),
            status_with(OverallStatus::Pending, "2026-08-07T10:00:03Z"),
        ];

        let counts = counts_by_status(&statuses);
        assert_eq!(counts.healthy, 1);
        assert_eq!(counts.unhealthy_or_error, 2);
        assert_eq!(counts.pending, 1);
    }

    #[test]
    fn test_counts_by_status_empty() {
        let counts = counts_by_status(&[]);
        assert_eq!(counts.healthy, 0);
        assert_eq!(counts.unhealthy_or_error, 0);
        assert_eq!(counts.pending, 0);
    }

    #[test]
    fn test_most_recent_check_picks_max() {
        let statuses = vec![
            status_with(OverallStatus::Healthy, "2026-08-07T10:05:00Z"),
            status_with(OverallStatus::Error, "2026-08-07T10:30:00Z"),
            status_with(OverallStatus::Healthy, "2026-08-07T09:00:00Z"),
        ];

        let latest = most_recent_check(&statuses).unwrap();
        assert_eq!(latest, "2026-08-07T10:30:00Z".parse::<DateTime<Utc>>().unwrap());
    }

    #[test]
    fn test_most_recent_check_empty_is_none() {
        assert!(most_recent_check(&[]).is_none());
    }
}
