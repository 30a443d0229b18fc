//! 终端对弈前端
//!
//! 包含:
//! - 命令行配置
//! - 交互式对局循环
//! - 棋谱文件回放

pub mod config;
pub mod session;

pub use config::CliConfig;
pub use session::Session;
