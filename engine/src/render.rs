//! 棋盘文本渲染

use crate::board::Board;
use crate::constants::BOARD_SIZE;
use crate::piece::Square;

/// 生成 8 行、每行 8 个双字符格子标签
///
/// 有子的格子输出颜色前缀加兵种符号（如 `"wK"`、`"bp"`）；
/// 空格子按 (行+列) 的奇偶交替输出空白和 `"##"`，形成明暗格。
/// 行 0（第 8 横线）排在最前，终端渲染方向与人类坐标一致。
pub fn board_rows(board: &Board) -> Vec<Vec<String>> {
    (0..BOARD_SIZE)
        .map(|row| {
            (0..BOARD_SIZE)
                .map(|col| {
                    let sq = Square::new_unchecked(row as u8, col as u8);
                    match board.get(sq) {
                        Some(piece) => {
                            format!("{}{}", piece.color.prefix_char(), piece.kind.symbol())
                        }
                        None => {
                            if (row + col) % 2 == 0 {
                                "  ".to_string()
                            } else {
                                "##".to_string()
                            }
                        }
                    }
                })
                .collect()
        })
        .collect()
}
