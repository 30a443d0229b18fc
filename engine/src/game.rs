//! 对局状态与走子执行
//!
//! 合法性判定（[`crate::rules`]）是只读的；这里负责把一步走子
//! 作为单个提交步骤写入棋盘：清源格、落子、移除被吃的棋子、
//! 旗标更新、升变替换，然后才轮转走子方并做将军、将死检测。
//! 被拒绝的走子不触碰任何状态。

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::board::Board;
use crate::error::{ChessError, Result};
use crate::piece::{Color, Piece, PieceKind, Square};
use crate::rules::{Castle, Rules};

/// 终局原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    /// 将死
    Checkmate,
    /// 一方认输
    Resignation,
    /// 双方同意和棋
    DrawAgreed,
}

/// 对局结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    /// 胜方，和棋为 None
    pub winner: Option<Color>,
    pub reason: EndReason,
}

/// 一步走子的结算
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveOutcome {
    pub from: Square,
    pub to: Square,
    /// 被吃的棋子（如果有）
    pub captured: Option<Piece>,
    /// 本步是吃过路兵
    pub en_passant: bool,
    /// 本步是王车易位
    pub castle: Option<Castle>,
    /// 升变成的兵种
    pub promoted: Option<PieceKind>,
    /// 走完后对方被将军
    pub opponent_checked: bool,
    /// 走完后对方被将死，对局结束
    pub checkmate: bool,
}

/// 对局状态
///
/// 独占持有棋盘；引擎的每个入口都显式接收状态值，
/// 互不相关的对局可以并存（测试里大量利用这一点）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    /// 棋盘
    pub board: Board,
    /// 当前走子方
    pub side_to_move: Color,
    /// 终局结果；Some 之后拒绝一切走子
    pub result: Option<GameResult>,
}

impl GameState {
    /// 创建初始对局（标准开局摆放，白先）
    pub fn new() -> Self {
        Self {
            board: Board::initial(),
            side_to_move: Color::White,
            result: None,
        }
    }

    /// 从给定棋盘创建对局
    pub fn from_board(board: Board, side_to_move: Color) -> Self {
        Self {
            board,
            side_to_move,
            result: None,
        }
    }

    /// 对局是否已结束
    pub fn ended(&self) -> bool {
        self.result.is_some()
    }

    /// 当前走子方认输
    pub fn resign(&mut self) {
        if self.result.is_none() {
            self.result = Some(GameResult {
                winner: Some(self.side_to_move.opponent()),
                reason: EndReason::Resignation,
            });
        }
    }

    /// 双方同意和棋，立即终局
    pub fn declare_draw(&mut self) {
        if self.result.is_none() {
            self.result = Some(GameResult {
                winner: None,
                reason: EndReason::DrawAgreed,
            });
        }
    }

    /// 执行一步走子
    ///
    /// 校验顺序：终局 → 原地走 → 源格无子 →
    /// 动对方棋子 → 吃己方棋子 → 兵种移动规则 → 升变记号。
    /// 任何一步失败都原样返回，状态不变、不换边。
    pub fn apply_move(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<&str>,
    ) -> Result<MoveOutcome> {
        if self.ended() {
            return Err(ChessError::GameOver);
        }
        if from == to {
            return Err(ChessError::SamePositionMove);
        }
        let piece = self
            .board
            .get(from)
            .ok_or(ChessError::NoPieceAtSource { at: from })?;
        if piece.color != self.side_to_move {
            return Err(ChessError::WrongSideOwnsPiece { at: from });
        }
        if let Some(target) = self.board.get(to) {
            if target.color == piece.color {
                return Err(ChessError::SelfCapture);
            }
        }
        if !Rules::is_legal(&self.board, from, to) {
            return Err(ChessError::IllegalGeometry {
                kind: piece.kind.name(),
            });
        }

        // 升变检查：只约束兵，非兵走子忽略多余的记号
        let mut promoted: Option<PieceKind> = None;
        if piece.kind.is_pawn() {
            let due = to.row == piece.color.promotion_row();
            match promotion {
                Some(text) => {
                    let kind = PieceKind::from_promotion_letter(text).ok_or_else(|| {
                        ChessError::IllegalPromotionTarget {
                            text: text.to_string(),
                        }
                    })?;
                    if !due {
                        return Err(ChessError::PromotionNotEligible);
                    }
                    promoted = Some(kind);
                }
                None if due => promoted = Some(PieceKind::Queen),
                None => {}
            }
        }

        // 校验全部通过，以下是单个提交步骤
        Ok(self.commit(piece, from, to, promoted))
    }

    /// 提交一步已通过校验的走子
    fn commit(
        &mut self,
        piece: Piece,
        from: Square,
        to: Square,
        promoted: Option<PieceKind>,
    ) -> MoveOutcome {
        let color = piece.color;
        let forward = color.forward_dir();
        let dr = to.row as i8 - from.row as i8;
        let dc = to.col as i8 - from.col as i8;

        // 易位形状必须在改动棋盘之前识别
        let castle = if piece.kind == PieceKind::King {
            Rules::castle_intent(&self.board, from, to)
        } else {
            None
        };

        let mut moving = piece;
        let mut captured = self.board.get(to);
        let mut en_passant = false;

        if let PieceKind::Pawn(ref mut st) = moving.kind {
            let diagonal = dc.abs() == 1 && dr == forward;
            if diagonal {
                if captured.is_none() && st.armed {
                    // 吃过路兵：被吃的兵在目标格后一行、同一列
                    if let Some(behind) = to.offset(-forward, 0) {
                        captured = self.board.get(behind);
                        self.board.set(behind, None);
                        en_passant = true;
                    }
                }
                // 斜走过就永久失去竖走资格
                st.only_vertical = false;
            }
            if dr == 2 * forward {
                st.just_double_stepped = true;
            }
            st.first_move = false;
            st.armed = false;
        }
        moving.moved = true;

        // 落子
        self.board.set(from, None);
        self.board.set(to, Some(moving));

        // 王车易位：车同步移到王的另一侧
        if let Some(side) = castle {
            let rook_from = side.rook_from(to.row);
            let rook_to = side.rook_to(to.row);
            if let Some(mut rook) = self.board.get(rook_from) {
                rook.moved = true;
                self.board.set(rook_from, None);
                self.board.set(rook_to, Some(rook));
            }
        }

        // 升变：目标格上的兵换成全新棋子，兵的状态全部丢弃
        if let Some(kind) = promoted {
            self.board.set(
                to,
                Some(Piece {
                    kind,
                    color,
                    moved: true,
                }),
            );
        }

        // 过路兵窗口结算：本方的窗口就是刚走完的这一步，
        // 用没用掉都到期
        self.disarm_pawns(color);

        // 兵双步推进后，武装落点两侧符合条件的敌兵
        if moving.kind.is_pawn() && dr == 2 * forward {
            self.arm_adjacent_pawns(to, color);
        }

        // 换边，再对新的走子方做将死、将军检测
        self.side_to_move = self.side_to_move.opponent();
        let checkmate = Rules::is_checkmate(&self.board, self.side_to_move);
        let opponent_checked = Rules::is_checked(&self.board, self.side_to_move);
        if checkmate {
            self.result = Some(GameResult {
                winner: Some(color),
                reason: EndReason::Checkmate,
            });
        }

        let outcome = MoveOutcome {
            from,
            to,
            captured,
            en_passant,
            castle,
            promoted,
            opponent_checked,
            checkmate,
        };
        debug!(
            %from,
            %to,
            captured = captured.is_some(),
            en_passant,
            castled = castle.is_some(),
            promoted = promoted.is_some(),
            checked = opponent_checked,
            checkmate,
            "move applied"
        );
        outcome
    }

    /// 清掉指定阵营所有兵的过路兵武装旗标
    fn disarm_pawns(&mut self, color: Color) {
        for (sq, mut piece) in self.board.pieces(color) {
            if let PieceKind::Pawn(ref mut st) = piece.kind {
                if st.armed {
                    st.armed = false;
                    self.board.set(sq, Some(piece));
                }
            }
        }
    }

    /// 双步推进落点两侧的敌兵获得一回合的吃过路兵资格
    ///
    /// 资格条件：同一行紧邻的敌方兵，且从未斜走过。
    fn arm_adjacent_pawns(&mut self, landing: Square, mover: Color) {
        for dc in [-1i8, 1i8] {
            let side_sq = match landing.offset(0, dc) {
                Some(sq) => sq,
                None => continue,
            };
            if let Some(mut piece) = self.board.get(side_sq) {
                if piece.color == mover {
                    continue;
                }
                if let PieceKind::Pawn(ref mut st) = piece.kind {
                    if st.only_vertical {
                        st.armed = true;
                        self.board.set(side_sq, Some(piece));
                    }
                }
            }
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

/// 输入是否是认输口令
pub fn is_resign_token(input: &str) -> bool {
    input.trim() == "resign"
}

/// 第三个记号是否是提和口令
pub fn is_draw_token(token: &str) -> bool {
    token == "draw?"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fen::Fen;

    fn sq(text: &str) -> Square {
        crate::notation::parse_square(text).unwrap()
    }

    /// 按 "e2 e4" 形式走一步，测试辅助
    fn play(state: &mut GameState, from: &str, to: &str) -> Result<MoveOutcome> {
        state.apply_move(sq(from), sq(to), None)
    }

    #[test]
    fn test_opening_double_steps() {
        let mut state = GameState::new();

        // e2 e4 成功，周围没有敌兵，谁也不会被武装
        let outcome = play(&mut state, "e2", "e4").unwrap();
        assert!(outcome.captured.is_none());
        assert!(!outcome.opponent_checked);
        assert_eq!(state.side_to_move, Color::Black);

        for (_sq, piece) in state.board.pieces(Color::Black) {
            if let PieceKind::Pawn(st) = piece.kind {
                assert!(!st.armed);
            }
        }

        // 黑方对称回应 e7 e5
        play(&mut state, "e7", "e5").unwrap();
        assert_eq!(state.side_to_move, Color::White);
        assert!(state.board.get(sq("e5")).is_some());
        assert!(state.board.get(sq("e7")).is_none());
    }

    #[test]
    fn test_rejected_move_keeps_state() {
        let mut state = GameState::new();
        let before = state.clone();

        // 车被自家兵挡住
        let err = play(&mut state, "a1", "a3").unwrap_err();
        assert_eq!(err, ChessError::IllegalGeometry { kind: "rook" });

        // 状态原样，依然轮白方
        assert_eq!(state, before);
    }

    #[test]
    fn test_validation_order_errors() {
        let mut state = GameState::new();

        assert_eq!(
            play(&mut state, "e4", "e4").unwrap_err(),
            ChessError::SamePositionMove
        );
        assert_eq!(
            play(&mut state, "e4", "e5").unwrap_err(),
            ChessError::NoPieceAtSource { at: sq("e4") }
        );
        assert_eq!(
            play(&mut state, "e7", "e5").unwrap_err(),
            ChessError::WrongSideOwnsPiece { at: sq("e7") }
        );
        assert_eq!(
            play(&mut state, "a1", "a2").unwrap_err(),
            ChessError::SelfCapture
        );
    }

    #[test]
    fn test_en_passant_capture() {
        let mut state = GameState::new();
        play(&mut state, "e2", "e4").unwrap();
        play(&mut state, "a7", "a6").unwrap();
        play(&mut state, "e4", "e5").unwrap();

        // 黑兵双步到 d5，紧邻的白兵 e5 被武装
        play(&mut state, "d7", "d5").unwrap();
        match state.board.get(sq("e5")).unwrap().kind {
            PieceKind::Pawn(st) => assert!(st.armed),
            _ => panic!("expected pawn"),
        }

        // e5 d6 吃过路兵：落点 d6，被吃的兵从 d5 消失
        let outcome = play(&mut state, "e5", "d6").unwrap();
        assert!(outcome.en_passant);
        assert!(outcome.captured.is_some());
        assert!(state.board.get(sq("d5")).is_none());
        let mover = state.board.get(sq("d6")).unwrap();
        match mover.kind {
            PieceKind::Pawn(st) => {
                assert!(!st.only_vertical);
                assert!(!st.armed);
            }
            _ => panic!("expected pawn"),
        }
    }

    #[test]
    fn test_en_passant_window_expires() {
        let mut state = GameState::new();
        play(&mut state, "e2", "e4").unwrap();
        play(&mut state, "a7", "a6").unwrap();
        play(&mut state, "e4", "e5").unwrap();
        play(&mut state, "d7", "d5").unwrap();

        // 白方走了别的棋，e5 兵的窗口随之关闭
        play(&mut state, "h2", "h3").unwrap();
        match state.board.get(sq("e5")).unwrap().kind {
            PieceKind::Pawn(st) => assert!(!st.armed),
            _ => panic!("expected pawn"),
        }
        play(&mut state, "h7", "h6").unwrap();

        // 同样的输入这次被拒绝
        let err = play(&mut state, "e5", "d6").unwrap_err();
        assert_eq!(err, ChessError::IllegalGeometry { kind: "pawn" });
    }

    #[test]
    fn test_arm_both_neighbors() {
        // 落点两侧各有一个敌兵时，两边都获得资格
        let mut state = Fen::parse("4k3/3p4/8/2P1P3/8/8/8/4K3 b -").unwrap();
        state.apply_move(sq("d7"), sq("d5"), None).unwrap();

        for pos in ["c5", "e5"] {
            match state.board.get(sq(pos)).unwrap().kind {
                PieceKind::Pawn(st) => assert!(st.armed, "{}", pos),
                _ => panic!("expected pawn"),
            }
        }
    }

    #[test]
    fn test_promotion_defaults_to_queen() {
        let mut state = Fen::parse("7k/P7/8/8/8/8/8/7K w -").unwrap();
        let outcome = state.apply_move(sq("a7"), sq("a8"), None).unwrap();

        assert_eq!(outcome.promoted, Some(PieceKind::Queen));
        let piece = state.board.get(sq("a8")).unwrap();
        assert_eq!(piece.kind, PieceKind::Queen);
        assert!(piece.moved);
        // a8 后沿第 8 横线将军 h8 王
        assert!(outcome.opponent_checked);
    }

    #[test]
    fn test_promotion_explicit_letter() {
        let mut state = Fen::parse("7k/P7/8/8/8/8/8/7K w -").unwrap();
        let outcome = state.apply_move(sq("a7"), sq("a8"), Some("N")).unwrap();

        assert_eq!(outcome.promoted, Some(PieceKind::Knight));
        assert_eq!(state.board.get(sq("a8")).unwrap().kind, PieceKind::Knight);
    }

    #[test]
    fn test_promotion_invalid_letter_rejects_whole_move() {
        let mut state = Fen::parse("7k/P7/8/8/8/8/8/7K w -").unwrap();
        let before = state.clone();

        let err = state.apply_move(sq("a7"), sq("a8"), Some("X")).unwrap_err();
        assert_eq!(
            err,
            ChessError::IllegalPromotionTarget {
                text: "X".to_string()
            }
        );

        // 兵没动，轮次没换
        assert_eq!(state, before);
        assert!(state.board.get(sq("a7")).unwrap().kind.is_pawn());
    }

    #[test]
    fn test_promotion_not_eligible() {
        let mut state = Fen::parse("7k/8/P7/8/8/8/8/7K w -").unwrap();
        let err = state.apply_move(sq("a6"), sq("a7"), Some("Q")).unwrap_err();
        assert_eq!(err, ChessError::PromotionNotEligible);
        assert!(state.board.get(sq("a6")).unwrap().kind.is_pawn());
    }

    #[test]
    fn test_promotion_token_ignored_for_non_pawn() {
        let mut state = GameState::new();
        // 马带着升变记号走，不报错，记号被忽略
        let outcome = state.apply_move(sq("g1"), sq("f3"), Some("Q")).unwrap();
        assert_eq!(outcome.promoted, None);
    }

    #[test]
    fn test_castle_kingside_execution() {
        let mut state = Fen::parse("r3k2r/8/8/8/8/8/8/R3K2R w KQkq").unwrap();
        let outcome = state.apply_move(sq("e1"), sq("g1"), None).unwrap();

        assert_eq!(outcome.castle, Some(Castle::KingSide));
        // 王到 g1，车从 h1 到 f1，两子都标记为已动
        let king = state.board.get(sq("g1")).unwrap();
        assert_eq!(king.kind, PieceKind::King);
        assert!(king.moved);
        let rook = state.board.get(sq("f1")).unwrap();
        assert_eq!(rook.kind, PieceKind::Rook);
        assert!(rook.moved);
        assert!(state.board.get(sq("e1")).is_none());
        assert!(state.board.get(sq("h1")).is_none());
    }

    #[test]
    fn test_castle_queenside_execution() {
        let mut state = Fen::parse("r3k2r/8/8/8/8/8/8/R3K2R b KQkq").unwrap();
        let outcome = state.apply_move(sq("e8"), sq("c8"), None).unwrap();

        assert_eq!(outcome.castle, Some(Castle::QueenSide));
        assert_eq!(state.board.get(sq("c8")).unwrap().kind, PieceKind::King);
        assert_eq!(state.board.get(sq("d8")).unwrap().kind, PieceKind::Rook);
        assert!(state.board.get(sq("a8")).is_none());
    }

    #[test]
    fn test_castle_refused_after_king_moved() {
        let mut state = Fen::parse("r3k2r/8/8/8/8/8/8/R3K2R w KQkq").unwrap();
        play(&mut state, "e1", "e2").unwrap();
        play(&mut state, "e8", "e7").unwrap();
        play(&mut state, "e2", "e1").unwrap();
        play(&mut state, "e7", "e8").unwrap();

        // 王回到原位也不能再易位
        let err = play(&mut state, "e1", "g1").unwrap_err();
        assert_eq!(err, ChessError::IllegalGeometry { kind: "king" });
    }

    #[test]
    fn test_checkmate_ends_game() {
        // 白后一步到 e 线完成底线杀
        let mut state = Fen::parse("3rkr2/3p1p2/8/8/8/8/8/3Q2K1 w -").unwrap();
        let outcome = state.apply_move(sq("d1"), sq("e1"), None).unwrap();

        assert!(outcome.checkmate);
        assert!(state.ended());
        assert_eq!(
            state.result,
            Some(GameResult {
                winner: Some(Color::White),
                reason: EndReason::Checkmate,
            })
        );

        // 终局后任何走子都在边界处被拒绝
        let err = state.apply_move(sq("d8"), sq("d7"), None).unwrap_err();
        assert_eq!(err, ChessError::GameOver);
    }

    #[test]
    fn test_check_notice_without_mate() {
        let mut state = Fen::parse("4k3/8/8/8/8/8/8/3QK3 w -").unwrap();
        let outcome = state.apply_move(sq("d1"), sq("d8"), None).unwrap();

        // 将军但有逃路，对局继续
        assert!(outcome.opponent_checked);
        assert!(!outcome.checkmate);
        assert!(!state.ended());
    }

    #[test]
    fn test_resign_and_draw() {
        let mut state = GameState::new();
        state.resign();
        assert_eq!(
            state.result,
            Some(GameResult {
                winner: Some(Color::Black),
                reason: EndReason::Resignation,
            })
        );

        let mut state = GameState::new();
        state.declare_draw();
        assert_eq!(
            state.result,
            Some(GameResult {
                winner: None,
                reason: EndReason::DrawAgreed,
            })
        );
    }

    #[test]
    fn test_tokens() {
        assert!(is_resign_token("resign"));
        assert!(is_resign_token("  resign "));
        assert!(!is_resign_token("Resign"));
        assert!(is_draw_token("draw?"));
        assert!(!is_draw_token("draw"));
    }
}
