//! ヘルスチェック監視
//!
//! プル型ヘルスチェックでエンドポイントの稼働状況を監視する。
//! エンドポイントごとに独立した購読がタイマー駆動でプローブを実行し、
//! 結果を共有ステータスマップに反映する。

pub mod aggregate;
pub mod fetcher;
pub mod monitor;

pub use fetcher::HealthFetcher;
pub use monitor::{HealthMonitor, HealthSnapshot};
