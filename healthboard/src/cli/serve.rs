//! serve サブコマンド
//!
//! ダッシュボードサーバーを起動します。

use clap::Args;

/// serve サブコマンドの引数
#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Listen port
    #[arg(short, long, default_value = "8787", env = "HEALTHBOARD_PORT")]
    pub port: u16,

    /// Bind address
    #[arg(short = 'H', long, default_value = "0.0.0.0", env = "HEALTHBOARD_HOST")]
    pub host: String,
}
