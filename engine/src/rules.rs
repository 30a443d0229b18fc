//! 走法合法性判定与将军、将死检测
//!
//! 本模块只读不写：每个判定都是 (棋盘, 起点, 终点) 上的纯谓词，
//! 所有棋盘变更都在 [`crate::game`] 的提交步骤里完成。

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::constants::{
    KINGSIDE_KING_COL, KINGSIDE_ROOK_COL, QUEENSIDE_KING_COL, QUEENSIDE_ROOK_COL,
};
use crate::piece::{Color, PawnState, PieceKind, Square};

/// 王周围 8 个方向
const KING_OFFSETS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// 王车易位的方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Castle {
    /// 王翼（短易位，王到 g 列）
    KingSide,
    /// 后翼（长易位，王到 c 列）
    QueenSide,
}

impl Castle {
    /// 参与易位的车的起始格
    pub fn rook_from(&self, row: u8) -> Square {
        match self {
            Castle::KingSide => Square::new_unchecked(row, KINGSIDE_ROOK_COL),
            Castle::QueenSide => Square::new_unchecked(row, QUEENSIDE_ROOK_COL),
        }
    }

    /// 易位后车的目标格（王新位置旁、车来的那一侧）
    pub fn rook_to(&self, row: u8) -> Square {
        match self {
            Castle::KingSide => Square::new_unchecked(row, 5),
            Castle::QueenSide => Square::new_unchecked(row, 3),
        }
    }

    /// 易位后王所在的列
    pub fn king_col(&self) -> u8 {
        match self {
            Castle::KingSide => KINGSIDE_KING_COL,
            Castle::QueenSide => QUEENSIDE_KING_COL,
        }
    }
}

/// 走法合法性判定
pub struct Rules;

impl Rules {
    /// 判定一步走法是否符合起始格棋子的移动规则
    ///
    /// 所有兵种共享的前提：不能原地走，不能吃己方棋子。
    pub fn is_legal(board: &Board, from: Square, to: Square) -> bool {
        let piece = match board.get(from) {
            Some(p) => p,
            None => return false,
        };
        if from == to {
            return false;
        }
        if let Some(target) = board.get(to) {
            if target.color == piece.color {
                return false;
            }
        }

        match piece.kind {
            PieceKind::Pawn(state) => Self::pawn_move(board, from, to, piece.color, &state),
            PieceKind::Knight => Self::knight_move(from, to),
            PieceKind::Bishop => Self::bishop_move(board, from, to),
            PieceKind::Rook => Self::rook_move(board, from, to),
            PieceKind::Queen => {
                Self::rook_move(board, from, to) || Self::bishop_move(board, from, to)
            }
            PieceKind::King => Self::king_move(board, from, to),
        }
    }

    /// 判定棋子能否威胁目标格
    ///
    /// 兵按"吃或进"的谓词评估（它威胁的格子，不是规则下它一定
    /// 能走到的格子）。判定本身与 [`Rules::is_legal`] 一致，
    /// 单独成名是因为将死扫描读的是威胁面。
    pub fn attacks(board: &Board, from: Square, to: Square) -> bool {
        Self::is_legal(board, from, to)
    }

    /// 马走日
    fn knight_move(from: Square, to: Square) -> bool {
        let dr = (to.row as i8 - from.row as i8).abs();
        let dc = (to.col as i8 - from.col as i8).abs();
        (dr == 2 && dc == 1) || (dr == 1 && dc == 2)
    }

    /// 象走斜线，途中不能有子
    fn bishop_move(board: &Board, from: Square, to: Square) -> bool {
        let dr = to.row as i8 - from.row as i8;
        let dc = to.col as i8 - from.col as i8;
        if dr.abs() != dc.abs() || dr == 0 {
            return false;
        }
        Self::clear_diagonal(board, from, to)
    }

    /// 车走直线，途中不能有子
    fn rook_move(board: &Board, from: Square, to: Square) -> bool {
        if from.row != to.row && from.col != to.col {
            return false;
        }
        Self::clear_straight(board, from, to)
    }

    /// 王走相邻一格，或符合易位形状
    fn king_move(board: &Board, from: Square, to: Square) -> bool {
        let dr = (to.row as i8 - from.row as i8).abs();
        let dc = (to.col as i8 - from.col as i8).abs();
        if dr <= 1 && dc <= 1 {
            return true;
        }
        Self::castle_intent(board, from, to).is_some()
    }

    /// 识别王车易位的形状，返回易位方向
    ///
    /// 条件：王未动过，行不变、横移两列到 c 列或 g 列，对应角上的
    /// 车同色且未动过，王车之间的格子全空。
    ///
    /// 已知规则缺口（有意保留）：不检查王是否正被将军，
    /// 也不检查王经过的格子是否受攻击。
    pub fn castle_intent(board: &Board, from: Square, to: Square) -> Option<Castle> {
        let piece = board.get(from)?;
        if piece.kind != PieceKind::King || piece.moved {
            return None;
        }
        if from.row != to.row || (to.col as i8 - from.col as i8).abs() != 2 {
            return None;
        }

        let side = if to.col == QUEENSIDE_KING_COL {
            Castle::QueenSide
        } else if to.col == KINGSIDE_KING_COL {
            Castle::KingSide
        } else {
            return None;
        };

        // 角上必须是同色且未动过的车
        let rook = board.get(side.rook_from(from.row))?;
        if rook.kind != PieceKind::Rook || rook.color != piece.color || rook.moved {
            return None;
        }

        // 王车之间的格子全空
        let between: &[u8] = match side {
            Castle::QueenSide => &[1, 2, 3],
            Castle::KingSide => &[5, 6],
        };
        for &col in between {
            if board.get(Square::new_unchecked(from.row, col)).is_some() {
                return None;
            }
        }

        Some(side)
    }

    /// 兵：只向前，方向由阵营决定
    fn pawn_move(board: &Board, from: Square, to: Square, color: Color, state: &PawnState) -> bool {
        let dr = to.row as i8 - from.row as i8;
        let dc = to.col as i8 - from.col as i8;
        let forward = color.forward_dir();

        if dc == 0 {
            // 直进一格：目标格必须为空
            if dr == forward {
                return board.get(to).is_none();
            }
            // 双步推进：仅限第一步，跳过的格子和目标格都必须为空
            if state.first_move && dr == 2 * forward {
                let mid = match from.offset(forward, 0) {
                    Some(sq) => sq,
                    None => return false,
                };
                return board.get(mid).is_none() && board.get(to).is_none();
            }
            false
        } else if dc.abs() == 1 && dr == forward {
            // 斜吃一格：目标格有敌子
            if let Some(target) = board.get(to) {
                return target.color != color;
            }
            // 吃过路兵：目标格为空，本兵已武装，目标格后一行是敌方的兵
            if state.armed {
                if let Some(behind) = to.offset(-forward, 0) {
                    if let Some(victim) = board.get(behind) {
                        return victim.color != color && victim.kind.is_pawn();
                    }
                }
            }
            false
        } else {
            false
        }
    }

    /// 直线路径扫描：检查 (from, to) 严格内部的格子全空
    ///
    /// 扫描遇到第一个非空格立即停止，永远不会越过终点。
    fn clear_straight(board: &Board, from: Square, to: Square) -> bool {
        if from.row == to.row {
            let min = from.col.min(to.col);
            let max = from.col.max(to.col);
            for col in (min + 1)..max {
                if board.get(Square::new_unchecked(from.row, col)).is_some() {
                    return false;
                }
            }
        } else {
            let min = from.row.min(to.row);
            let max = from.row.max(to.row);
            for row in (min + 1)..max {
                if board.get(Square::new_unchecked(row, from.col)).is_some() {
                    return false;
                }
            }
        }
        true
    }

    /// 斜线路径扫描：检查 (from, to) 严格内部的格子全空
    fn clear_diagonal(board: &Board, from: Square, to: Square) -> bool {
        let dr = (to.row as i8 - from.row as i8).signum();
        let dc = (to.col as i8 - from.col as i8).signum();
        let steps = (to.row as i8 - from.row as i8).abs();
        for i in 1..steps {
            let sq = Square::new_unchecked(
                (from.row as i8 + dr * i) as u8,
                (from.col as i8 + dc * i) as u8,
            );
            if board.get(sq).is_some() {
                return false;
            }
        }
        true
    }

    /// 检查指定阵营是否被将军
    ///
    /// 找到王，再逐一评估敌方棋子对王所在格的合法性判定。
    pub fn is_checked(board: &Board, color: Color) -> bool {
        let king_sq = match board.find_king(color) {
            Some(sq) => sq,
            None => return false, // 没有王，视为不被将军
        };

        for (sq, _piece) in board.pieces(color.opponent()) {
            if Self::is_legal(board, sq, king_sq) {
                return true;
            }
        }

        false
    }

    /// 检查指定阵营是否被将死
    ///
    /// 只评估王自身的活动空间：取王周围 8 个（裁剪到棋盘内的）格子，
    /// 删去敌方能威胁的，再删去王自己走不到的，剩余为零且至少删过
    /// 一个威胁格即判将死。
    ///
    /// 已知局限（有意保留的近似）：不评估己方其他棋子的垫将、
    /// 吃掉将军棋子等解法，也不评估王吃掉将军者，可能高估将死。
    pub fn is_checkmate(board: &Board, color: Color) -> bool {
        let king_sq = match board.find_king(color) {
            Some(sq) => sq,
            None => return false,
        };

        // 王周围的候选格，越界的直接裁掉
        let mut neighbors: Vec<Square> = KING_OFFSETS
            .iter()
            .filter_map(|&(dr, dc)| king_sq.offset(dr, dc))
            .collect();
        if neighbors.is_empty() {
            return false;
        }

        // 删去敌方能占据的格子
        let mut enemy_ready = false;
        for (sq, _piece) in board.pieces(color.opponent()) {
            neighbors.retain(|&candidate| {
                if Self::attacks(board, sq, candidate) {
                    enemy_ready = true;
                    false
                } else {
                    true
                }
            });
        }

        // 剩下的格子里，再删去王自己走不到的（例如被己方棋子占据）
        let mut escapes = neighbors.len();
        for &candidate in &neighbors {
            if !Self::is_legal(board, king_sq, candidate) {
                escapes -= 1;
            }
        }

        enemy_ready && escapes == 0
    }
}
