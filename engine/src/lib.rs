//! 国际象棋规则引擎
//!
//! 包含:
//! - 棋子、棋盘、坐标等核心数据结构
//! - 每个兵种的走法合法性判定
//! - 将军 / 将死检测
//! - 特殊规则状态机（兵双步、吃过路兵、王车易位、升变）
//! - 坐标文本解析与棋盘文本渲染
//! - FEN 局面格式（测试搭局面用）

mod board;
mod constants;
mod error;
mod fen;
mod game;
mod notation;
mod piece;
mod render;
mod rules;

pub use board::Board;
pub use constants::*;
pub use error::{ChessError, Result};
pub use fen::{Fen, INITIAL_FEN};
pub use game::{
    is_draw_token, is_resign_token, EndReason, GameResult, GameState, MoveOutcome,
};
pub use notation::{parse_move_line, parse_square, MoveText};
pub use piece::{Color, PawnState, Piece, PieceKind, Square};
pub use render::board_rows;
pub use rules::{Castle, Rules};
