//! 棋盘状态

use serde::{Deserialize, Serialize};

use crate::constants::{BOARD_SIZE, SQUARE_COUNT};
use crate::piece::{Color, Piece, PieceKind, Square};

/// 棋盘
///
/// 棋盘是唯一的数据来源：每个格子最多持有一个棋子，
/// 走子要么在目标格写入新值并清空源格，要么清空被吃的格子，
/// 不存在两个地方同时引用同一个棋子。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    /// 8x8 棋盘，索引为 row * 8 + col，使用 Vec 以支持 serde
    squares: Vec<Option<Piece>>,
}

impl Board {
    /// 创建空棋盘
    pub fn empty() -> Self {
        Self {
            squares: vec![None; SQUARE_COUNT],
        }
    }

    /// 创建初始棋盘
    pub fn initial() -> Self {
        let mut board = Self::empty();

        // 黑方（上方，行 0 是第 8 横线）
        // 底线：车马象后王象马车
        board.set(Square::new_unchecked(0, 0), Some(Piece::new(PieceKind::Rook, Color::Black)));
        board.set(Square::new_unchecked(0, 1), Some(Piece::new(PieceKind::Knight, Color::Black)));
        board.set(Square::new_unchecked(0, 2), Some(Piece::new(PieceKind::Bishop, Color::Black)));
        board.set(Square::new_unchecked(0, 3), Some(Piece::new(PieceKind::Queen, Color::Black)));
        board.set(Square::new_unchecked(0, 4), Some(Piece::new(PieceKind::King, Color::Black)));
        board.set(Square::new_unchecked(0, 5), Some(Piece::new(PieceKind::Bishop, Color::Black)));
        board.set(Square::new_unchecked(0, 6), Some(Piece::new(PieceKind::Knight, Color::Black)));
        board.set(Square::new_unchecked(0, 7), Some(Piece::new(PieceKind::Rook, Color::Black)));

        // 黑方兵
        for col in 0..BOARD_SIZE as u8 {
            board.set(Square::new_unchecked(1, col), Some(Piece::pawn(Color::Black)));
        }

        // 白方兵
        for col in 0..BOARD_SIZE as u8 {
            board.set(Square::new_unchecked(6, col), Some(Piece::pawn(Color::White)));
        }

        // 白方底线
        board.set(Square::new_unchecked(7, 0), Some(Piece::new(PieceKind::Rook, Color::White)));
        board.set(Square::new_unchecked(7, 1), Some(Piece::new(PieceKind::Knight, Color::White)));
        board.set(Square::new_unchecked(7, 2), Some(Piece::new(PieceKind::Bishop, Color::White)));
        board.set(Square::new_unchecked(7, 3), Some(Piece::new(PieceKind::Queen, Color::White)));
        board.set(Square::new_unchecked(7, 4), Some(Piece::new(PieceKind::King, Color::White)));
        board.set(Square::new_unchecked(7, 5), Some(Piece::new(PieceKind::Bishop, Color::White)));
        board.set(Square::new_unchecked(7, 6), Some(Piece::new(PieceKind::Knight, Color::White)));
        board.set(Square::new_unchecked(7, 7), Some(Piece::new(PieceKind::Rook, Color::White)));

        board
    }

    /// 获取指定格子的棋子
    pub fn get(&self, sq: Square) -> Option<Piece> {
        if sq.is_valid() {
            self.squares[sq.to_index()]
        } else {
            None
        }
    }

    /// 设置指定格子的棋子
    pub fn set(&mut self, sq: Square, piece: Option<Piece>) {
        if sq.is_valid() {
            self.squares[sq.to_index()] = piece;
        }
    }

    /// 移动棋子（不检查规则），返回被吃的棋子
    pub fn move_piece(&mut self, from: Square, to: Square) -> Option<Piece> {
        let piece = self.get(from);
        let captured = self.get(to);
        self.set(from, None);
        self.set(to, piece);
        captured
    }

    /// 查找指定阵营的王的位置
    pub fn find_king(&self, color: Color) -> Option<Square> {
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                let sq = Square::new_unchecked(row as u8, col as u8);
                if let Some(piece) = self.get(sq) {
                    if piece.kind == PieceKind::King && piece.color == color {
                        return Some(sq);
                    }
                }
            }
        }
        None
    }

    /// 获取指定阵营的所有棋子及位置
    pub fn pieces(&self, color: Color) -> Vec<(Square, Piece)> {
        let mut result = Vec::new();
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                let sq = Square::new_unchecked(row as u8, col as u8);
                if let Some(piece) = self.get(sq) {
                    if piece.color == color {
                        result.push((sq, piece));
                    }
                }
            }
        }
        result
    }

    /// 获取所有棋子
    pub fn all_pieces(&self) -> Vec<(Square, Piece)> {
        let mut result = Vec::new();
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                let sq = Square::new_unchecked(row as u8, col as u8);
                if let Some(piece) = self.get(sq) {
                    result.push((sq, piece));
                }
            }
        }
        result
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::initial()
    }
}
