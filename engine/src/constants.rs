//! 棋盘常量定义

/// 棋盘边长（行数与列数相同）
pub const BOARD_SIZE: usize = 8;

/// 格子总数
pub const SQUARE_COUNT: usize = BOARD_SIZE * BOARD_SIZE;

/// 王车易位时后翼车所在列
pub const QUEENSIDE_ROOK_COL: u8 = 0;

/// 王车易位时王翼车所在列
pub const KINGSIDE_ROOK_COL: u8 = 7;

/// 后翼易位后王的目标列
pub const QUEENSIDE_KING_COL: u8 = 2;

/// 王翼易位后王的目标列
pub const KINGSIDE_KING_COL: u8 = 6;
