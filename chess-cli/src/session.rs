//! 对局会话
//!
//! 交互循环和棋谱回放共用一套行处理：解释认输口令和提和口令，
//! 其余输入交给引擎执行，然后报告将军、将死或拒绝原因。

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use engine::{
    board_rows, is_draw_token, is_resign_token, parse_move_line, ChessError, GameState,
};

use crate::config::CliConfig;

/// 一行输入处理后的走向
#[derive(Debug, PartialEq, Eq)]
enum Step {
    /// 走子成功
    Applied,
    /// 被拒绝，本方重新输入
    Rejected,
    /// 对局结束
    GameOver,
}

/// 对局会话
pub struct Session {
    config: CliConfig,
    state: GameState,
}

impl Session {
    /// 创建新会话（标准开局）
    pub fn new(config: CliConfig) -> Self {
        Self {
            config,
            state: GameState::new(),
        }
    }

    /// 运行会话：先回放棋谱（如果有），对局未结束则转入交互模式
    pub fn run(&mut self) -> Result<()> {
        if let Some(path) = self.config.replay_file.clone() {
            self.replay(&path)?;
            if self.state.ended() {
                if self.config.print_at_last {
                    self.print_board();
                }
                return Ok(());
            }
        }
        self.interactive()
    }

    /// 交互模式：逐行读取标准输入
    fn interactive(&mut self) -> Result<()> {
        let stdin = io::stdin();
        let mut lines = stdin.lock().lines();
        // 被拒绝的那一轮不重复打印棋盘
        let mut print_board = true;

        loop {
            if print_board {
                self.print_board();
            } else {
                print_board = true;
            }

            print!("{}'s move: ", self.state.side_to_move.name());
            io::stdout().flush()?;

            let line = match lines.next() {
                Some(line) => line.context("failed to read input")?,
                None => break, // 输入流结束
            };

            match self.handle_line(line.trim()) {
                Step::Applied => println!(),
                Step::Rejected => print_board = false,
                Step::GameOver => break,
            }
        }
        Ok(())
    }

    /// 回放模式：从文件逐行喂入，每行回显
    fn replay(&mut self, path: &Path) -> Result<()> {
        let file =
            File::open(path).with_context(|| format!("cannot open move file {}", path.display()))?;
        let reader = BufReader::new(file);
        let mut print_board = true;

        info!(path = %path.display(), "回放棋谱文件");

        for line in reader.lines() {
            let line = line.context("failed to read move file")?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if print_board && self.config.print_every_round {
                self.print_board();
            } else if !print_board {
                print_board = true;
            }

            print!("{}'s move: ", self.state.side_to_move.name());
            println!("{}", line);

            match self.handle_line(line) {
                Step::Applied => println!(),
                Step::Rejected => print_board = false,
                Step::GameOver => break,
            }
        }
        Ok(())
    }

    /// 处理一行输入
    fn handle_line(&mut self, line: &str) -> Step {
        if is_resign_token(line) {
            let winner = self.state.side_to_move.opponent();
            self.state.resign();
            println!("{} wins", winner.name());
            info!(winner = winner.name(), "对局以认输结束");
            return Step::GameOver;
        }

        let mv = match parse_move_line(line) {
            Ok(mv) => mv,
            Err(err) => {
                self.report_rejection(&err);
                return Step::Rejected;
            }
        };

        // 提和口令立即终局，不校验同行的坐标
        if let Some(ref third) = mv.third {
            if is_draw_token(third) {
                self.state.declare_draw();
                println!("draw");
                info!("对局以和棋结束");
                return Step::GameOver;
            }
        }

        match self.state.apply_move(mv.from, mv.to, mv.third.as_deref()) {
            Ok(outcome) => {
                if outcome.checkmate {
                    let winner = self.state.side_to_move.opponent();
                    println!("Checkmate");
                    println!("{} wins", winner.name());
                    info!(winner = winner.name(), "对局以将死结束");
                    Step::GameOver
                } else {
                    if outcome.opponent_checked {
                        println!("{} is Checked", self.state.side_to_move.name());
                    }
                    Step::Applied
                }
            }
            Err(err) => {
                self.report_rejection(&err);
                Step::Rejected
            }
        }
    }

    /// 打印拒绝信息：默认只给统一的提示，调试模式带具体原因
    fn report_rejection(&self, err: &ChessError) {
        let promotion = matches!(
            err,
            ChessError::IllegalPromotionTarget { .. } | ChessError::PromotionNotEligible
        );
        let prefix = if promotion {
            "Illegal promotion, try again"
        } else {
            "Illegal move, try again"
        };
        if self.config.debug {
            println!("{} : {}", prefix, err);
        } else {
            println!("{}.", prefix);
        }
    }

    /// 打印棋盘：8 行格子标签加横线数字，底部是列字母
    fn print_board(&self) {
        for (i, row) in board_rows(&self.state.board).iter().enumerate() {
            println!("{} {}", row.join(" "), 8 - i);
        }
        println!(" a  b  c  d  e  f  g  h ");
    }
}
