//! 错误类型定义

use thiserror::Error;

use crate::piece::Square;

/// 规则与输入错误
///
/// 所有变体都是可恢复的拒绝：对局状态保持不变，轮到的一方重新输入。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChessError {
    /// 输入行格式错误（记号数量或长度不对）
    #[error("Wrong format")]
    MalformedInput,

    /// 目标格与起始格相同
    #[error("Destination cannot be same as source")]
    SamePositionMove,

    /// 坐标文本不合法
    #[error("Invalid coordinate: {text}")]
    InvalidCoordinate { text: String },

    /// 起始格没有棋子
    #[error("Trying to move a non-existing piece at {at}")]
    NoPieceAtSource { at: Square },

    /// 起始格的棋子属于对方
    #[error("Cannot move opponent's piece at {at}")]
    WrongSideOwnsPiece { at: Square },

    /// 目标格是己方棋子
    #[error("Cannot capture own piece")]
    SelfCapture,

    /// 走法不符合该兵种的移动规则
    #[error("Not a valid move for {kind}")]
    IllegalGeometry { kind: &'static str },

    /// 升变目标不合法
    #[error("Unknown promotion target {text} (must be Q/N/R/B)")]
    IllegalPromotionTarget { text: String },

    /// 兵未到达底线，不能升变
    #[error("Cannot promote: pawn did not reach the far rank")]
    PromotionNotEligible,

    /// 对局已结束
    #[error("Game is already over")]
    GameOver,

    /// 无效的 FEN 字符串
    #[error("Invalid FEN string: {reason}")]
    InvalidFen { reason: String },
}

/// 引擎操作结果类型
pub type Result<T> = std::result::Result<T, ChessError>;
