//! 规则引擎接口
//!
//! 搜索核心只通过这个 trait 访问局面，不关心棋盘的具体表示。

use crate::types::{Color, Move, Piece, PieceType, Square};

/// 规则引擎提供给搜索核心的能力
pub trait Rules {
    /// `make_move` 返回、`undo_move` 消耗的撤销信息
    type Undo;

    /// 当前行棋方
    fn side_to_move(&self) -> Color;

    /// 手数（从 1 开始，每走一步加一）
    fn move_number(&self) -> u32;

    /// 当前行棋方的所有合法走法
    fn legal_moves(&self) -> Vec<Move>;

    /// 执行走法（调用方保证合法）
    fn make_move(&mut self, mv: &Move) -> Self::Undo;

    /// 撤销走法，必须与 `make_move` 严格配对
    fn undo_move(&mut self, undo: Self::Undo);

    fn piece_at(&self, sq: Square) -> Option<Piece>;

    /// 持驹数量
    fn hand_count(&self, color: Color, piece_type: PieceType) -> u8;

    /// 某格棋子的伪合法目标格（不论轮到谁走，不检查自将）
    fn destinations(&self, sq: Square) -> Vec<Square>;

    fn is_check(&self) -> bool;

    fn is_checkmate(&self) -> bool;

    fn is_stalemate(&self) -> bool;

    fn is_game_over(&self) -> bool {
        self.is_checkmate() || self.is_stalemate()
    }

    /// 完整局面的稳定序列化（SFEN）
    fn to_sfen(&self) -> String;
}
