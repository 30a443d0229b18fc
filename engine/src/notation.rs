//! 坐标与走子文本解析
//!
//! 唯一支持的人类坐标是两字符的"列字母+横线数字"（如 `"e2"`），
//! 走子输入行是空格分隔的 `"<from> <to> [第三记号]"`。

use crate::error::{ChessError, Result};
use crate::piece::Square;

/// 一行走子输入解析出的内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveText {
    pub from: Square,
    pub to: Square,
    /// 第三个记号原样传出（升变字母或提和口令），由调用方解释
    pub third: Option<String>,
}

/// 解析人类坐标
///
/// 必须恰好两个字符：小写列字母 a-h 加横线数字 1-8，
/// 其余一律返回 None（包括大写字母和越界字符）。
pub fn parse_square(text: &str) -> Option<Square> {
    let bytes = text.as_bytes();
    if bytes.len() != 2 {
        return None;
    }
    let file = bytes[0];
    let rank = bytes[1];
    if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
        return None;
    }
    // 第 8 横线排在行 0
    Some(Square::new_unchecked(b'8' - rank, file - b'a'))
}

/// 解析一行走子输入
///
/// 检查顺序：记号数量和长度 → 起终点文本相同 → 坐标本身是否合法。
pub fn parse_move_line(line: &str) -> Result<MoveText> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 2 || tokens.len() > 3 {
        return Err(ChessError::MalformedInput);
    }
    if tokens[0].chars().count() != 2 || tokens[1].chars().count() != 2 {
        return Err(ChessError::MalformedInput);
    }
    if tokens[0] == tokens[1] {
        return Err(ChessError::SamePositionMove);
    }

    let from = parse_square(tokens[0]).ok_or_else(|| ChessError::InvalidCoordinate {
        text: tokens[0].to_string(),
    })?;
    let to = parse_square(tokens[1]).ok_or_else(|| ChessError::InvalidCoordinate {
        text: tokens[1].to_string(),
    })?;

    Ok(MoveText {
        from,
        to,
        third: tokens.get(2).map(|s| s.to_string()),
    })
}
