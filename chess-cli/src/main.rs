use anyhow::Result;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chess_cli::{CliConfig, Session};

fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("chess_cli=info".parse()?),
        )
        .init();

    let config = CliConfig::from_args(std::env::args().skip(1))?;
    info!("国际象棋对局启动中...");

    Session::new(config).run()
}
