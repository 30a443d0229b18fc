//! FEN 局面格式
//!
//! 国际象棋 FEN：`<棋盘> [走子方] [易位权]`，如
//! `rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1`。
//!
//! 这是测试搭局面用的工具：棋盘、走子方和易位权（映射到王车的
//! `moved` 旗标）会被消费，过路兵目标格和步数计数等后续字段忽略。
//! 兵的旗标在解析后按所在横线推定：在起始横线上的兵视为未动。

use crate::board::Board;
use crate::constants::BOARD_SIZE;
use crate::error::{ChessError, Result};
use crate::game::GameState;
use crate::piece::{Color, Piece, PieceKind, Square};

/// 初始局面 FEN
pub const INITIAL_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// FEN 格式处理
pub struct Fen;

impl Fen {
    /// 解析 FEN 字符串为对局状态
    pub fn parse(fen: &str) -> Result<GameState> {
        let parts: Vec<&str> = fen.split_whitespace().collect();
        if parts.is_empty() {
            return Err(ChessError::InvalidFen {
                reason: "Empty FEN string".to_string(),
            });
        }

        let mut board = Self::parse_board(parts[0])?;

        // 走子方（默认白方）
        let side_to_move = if parts.len() > 1 {
            Color::from_fen_char(parts[1].chars().next().unwrap_or('w')).unwrap_or(Color::White)
        } else {
            Color::White
        };

        // 易位权：缺失的权利落实为对应王/车的 moved 旗标
        if parts.len() > 2 {
            Self::apply_castling_rights(&mut board, parts[2]);
        }

        Self::settle_pawn_flags(&mut board);

        Ok(GameState::from_board(board, side_to_move))
    }

    /// 解析棋盘部分
    fn parse_board(board_str: &str) -> Result<Board> {
        let mut board = Board::empty();
        let rows: Vec<&str> = board_str.split('/').collect();

        if rows.len() != BOARD_SIZE {
            return Err(ChessError::InvalidFen {
                reason: format!("Expected 8 rows, got {}", rows.len()),
            });
        }

        // FEN 从上到下就是行 0 到行 7
        for (row_idx, row) in rows.iter().enumerate() {
            let mut col = 0u8;

            for c in row.chars() {
                if col as usize >= BOARD_SIZE {
                    return Err(ChessError::InvalidFen {
                        reason: format!("Row {} has too many columns", row_idx),
                    });
                }

                if let Some(empty_count) = c.to_digit(10) {
                    col += empty_count as u8;
                } else if let Some(piece) = Piece::from_fen_char(c) {
                    board.set(Square::new_unchecked(row_idx as u8, col), Some(piece));
                    col += 1;
                } else {
                    return Err(ChessError::InvalidFen {
                        reason: format!("Invalid piece character: {}", c),
                    });
                }
            }

            if col as usize != BOARD_SIZE {
                return Err(ChessError::InvalidFen {
                    reason: format!("Row {} has {} columns", row_idx, col),
                });
            }
        }

        Ok(board)
    }

    /// 把易位权字段落实到 moved 旗标上
    ///
    /// 缺失某翼的权利时标记该翼的车已动；一方两翼都没有权利时
    /// 标记王已动。`-` 表示双方都不能易位。
    fn apply_castling_rights(board: &mut Board, rights: &str) {
        let white_row = Color::White.home_row();
        let black_row = Color::Black.home_row();

        if !rights.contains('K') {
            Self::spend_right(board, Square::new_unchecked(white_row, 7), PieceKind::Rook, Color::White);
        }
        if !rights.contains('Q') {
            Self::spend_right(board, Square::new_unchecked(white_row, 0), PieceKind::Rook, Color::White);
        }
        if !rights.contains('K') && !rights.contains('Q') {
            Self::spend_right(board, Square::new_unchecked(white_row, 4), PieceKind::King, Color::White);
        }

        if !rights.contains('k') {
            Self::spend_right(board, Square::new_unchecked(black_row, 7), PieceKind::Rook, Color::Black);
        }
        if !rights.contains('q') {
            Self::spend_right(board, Square::new_unchecked(black_row, 0), PieceKind::Rook, Color::Black);
        }
        if !rights.contains('k') && !rights.contains('q') {
            Self::spend_right(board, Square::new_unchecked(black_row, 4), PieceKind::King, Color::Black);
        }
    }

    /// 在指定格子上是期望的兵种时标记它已动过
    fn spend_right(board: &mut Board, sq: Square, kind: PieceKind, color: Color) {
        if let Some(mut piece) = board.get(sq) {
            if piece.kind == kind && piece.color == color {
                piece.moved = true;
                board.set(sq, Some(piece));
            }
        }
    }

    /// 按所在横线推定兵的旗标
    fn settle_pawn_flags(board: &mut Board) {
        for (sq, mut piece) in board.all_pieces() {
            if let PieceKind::Pawn(ref mut st) = piece.kind {
                let on_home_row = sq.row == piece.color.pawn_row();
                st.first_move = on_home_row;
                piece.moved = !on_home_row;
                board.set(sq, Some(piece));
            }
        }
    }

    /// 生成对局状态的 FEN 字符串
    pub fn generate(state: &GameState) -> String {
        let mut result = String::new();

        for row in 0..BOARD_SIZE as u8 {
            if row > 0 {
                result.push('/');
            }
            let mut empty_count = 0;
            for col in 0..BOARD_SIZE as u8 {
                match state.board.get(Square::new_unchecked(row, col)) {
                    Some(piece) => {
                        if empty_count > 0 {
                            result.push_str(&empty_count.to_string());
                            empty_count = 0;
                        }
                        result.push(piece.to_fen_char());
                    }
                    None => empty_count += 1,
                }
            }
            if empty_count > 0 {
                result.push_str(&empty_count.to_string());
            }
        }

        result.push(' ');
        result.push(state.side_to_move.to_fen_char());

        result.push(' ');
        let rights = Self::castling_rights(&state.board);
        result.push_str(&rights);

        // 不跟踪的后续字段按惯例补位
        result.push_str(" - 0 1");

        result
    }

    /// 从 moved 旗标归纳易位权字段
    fn castling_rights(board: &Board) -> String {
        let mut rights = String::new();

        let white_row = Color::White.home_row();
        if Self::right_intact(board, white_row, PieceKind::King, Color::White, 4) {
            if Self::right_intact(board, white_row, PieceKind::Rook, Color::White, 7) {
                rights.push('K');
            }
            if Self::right_intact(board, white_row, PieceKind::Rook, Color::White, 0) {
                rights.push('Q');
            }
        }

        let black_row = Color::Black.home_row();
        if Self::right_intact(board, black_row, PieceKind::King, Color::Black, 4) {
            if Self::right_intact(board, black_row, PieceKind::Rook, Color::Black, 7) {
                rights.push('k');
            }
            if Self::right_intact(board, black_row, PieceKind::Rook, Color::Black, 0) {
                rights.push('q');
            }
        }

        if rights.is_empty() {
            rights.push('-');
        }
        rights
    }

    /// 指定格子上是期望兵种且未动过
    fn right_intact(board: &Board, row: u8, kind: PieceKind, color: Color, col: u8) -> bool {
        match board.get(Square::new_unchecked(row, col)) {
            Some(piece) => piece.kind == kind && piece.color == color && !piece.moved,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_initial() {
        let state = Fen::parse(INITIAL_FEN).unwrap();
        // 初始 FEN 解析出的状态和 GameState::new() 完全一致
        assert_eq!(state, GameState::new());
    }

    #[test]
    fn test_generate_initial() {
        assert_eq!(Fen::generate(&GameState::new()), INITIAL_FEN);
    }

    #[test]
    fn test_roundtrip() {
        let fen = "r3k2r/8/8/8/8/8/8/R3K2R b KQkq - 0 1";
        let state = Fen::parse(fen).unwrap();
        assert_eq!(Fen::generate(&state), fen);
    }

    #[test]
    fn test_parse_side_to_move() {
        let state = Fen::parse("8/8/8/8/8/8/8/4K3 b -").unwrap();
        assert_eq!(state.side_to_move, Color::Black);

        // 缺省走子方是白方
        let state = Fen::parse("8/8/8/8/8/8/8/4K3").unwrap();
        assert_eq!(state.side_to_move, Color::White);
    }

    #[test]
    fn test_pawn_flags_settled() {
        let state = Fen::parse("8/4p3/8/8/8/4P3/8/8 w -").unwrap();

        // 不在起始横线上的兵失去双步资格
        let white = state.board.get(Square::new_unchecked(5, 4)).unwrap();
        match white.kind {
            PieceKind::Pawn(st) => assert!(!st.first_move),
            _ => panic!("expected pawn"),
        }
        assert!(white.moved);

        // 起始横线上的兵还没动过
        let black = state.board.get(Square::new_unchecked(1, 4)).unwrap();
        match black.kind {
            PieceKind::Pawn(st) => assert!(st.first_move),
            _ => panic!("expected pawn"),
        }
        assert!(!black.moved);
    }

    #[test]
    fn test_castling_rights_mapping() {
        let state = Fen::parse("r3k2r/8/8/8/8/8/8/R3K2R w Kq").unwrap();

        // 白方只剩王翼：a1 车已标记为动过
        assert!(!state.board.get(Square::new_unchecked(7, 4)).unwrap().moved);
        assert!(!state.board.get(Square::new_unchecked(7, 7)).unwrap().moved);
        assert!(state.board.get(Square::new_unchecked(7, 0)).unwrap().moved);

        // 黑方只剩后翼
        assert!(!state.board.get(Square::new_unchecked(0, 4)).unwrap().moved);
        assert!(state.board.get(Square::new_unchecked(0, 7)).unwrap().moved);
        assert!(!state.board.get(Square::new_unchecked(0, 0)).unwrap().moved);
    }

    #[test]
    fn test_parse_errors() {
        assert!(Fen::parse("").is_err());
        // 行数不对
        assert!(Fen::parse("8/8/8").is_err());
        // 未知棋子字符
        assert!(Fen::parse("7x/8/8/8/8/8/8/8 w").is_err());
        // 列数溢出
        assert!(Fen::parse("9/8/8/8/8/8/8/8 w").is_err());
    }
}
