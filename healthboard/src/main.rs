//! Healthboard Server Entry Point

use clap::Parser;
use healthboard::cli::{Cli, Commands};
use healthboard::{bootstrap, config, server};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_logging();

    // サブコマンド省略時は環境変数のデフォルトでサーバーを起動
    let (host, port) = match cli.command {
        Some(Commands::Serve(args)) => (args.host, args.port),
        None => (
            config::get_env_or("HEALTHBOARD_HOST", "0.0.0.0"),
            config::get_env_parse("HEALTHBOARD_PORT", 8787u16),
        ),
    };

    let state = bootstrap::initialize().await;

    let bind_addr = format!("{}:{}", host, port);
    server::run(state, &bind_addr).await;
}

/// ロギングを初期化
fn init_logging() {
    let filter =
        EnvFilter::try_from_env("HEALTHBOARD_LOG").unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
