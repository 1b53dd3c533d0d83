//! 共通基盤
//!
//! エラー型などクレート全体で共有する定義

pub mod error;
