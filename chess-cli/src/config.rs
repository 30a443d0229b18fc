//! 命令行配置

use std::path::PathBuf;

use anyhow::{bail, Result};

/// 运行配置
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// 回放的棋谱文件；None 则直接进入交互模式
    pub replay_file: Option<PathBuf>,
    /// 调试模式：拒绝时显示具体原因
    pub debug: bool,
    /// 回放时每步都打印棋盘
    pub print_every_round: bool,
    /// 回放结束后打印最终棋盘
    pub print_at_last: bool,
}

impl CliConfig {
    /// 从命令行参数解析配置
    pub fn from_args<I>(mut args: I) -> Result<Self>
    where
        I: Iterator<Item = String>,
    {
        let mut config = CliConfig::default();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--file" => match args.next() {
                    Some(path) => config.replay_file = Some(PathBuf::from(path)),
                    None => bail!("--file requires a path"),
                },
                "--debug" => config.debug = true,
                "--show-rounds" => config.print_every_round = true,
                "--show-final" => config.print_at_last = true,
                other => bail!("unknown argument: {}", other),
            }
        }
        Ok(config)
    }
}
