//! エンドポイント登録管理
//!
//! エンドポイントの状態をメモリ内で管理し、SQLiteと同期

pub mod endpoints;

pub use endpoints::EndpointRegistry;
