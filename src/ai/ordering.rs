//! 走法排序
//!
//! 按启发式优先级从高到低排序，提高 alpha-beta 剪枝效率。
//! 同分的走法靠有界随机扰动打破平局，种子固定时结果可复现。

use super::castle::{self, CastlePattern};
use crate::rules::Rules;
use crate::types::Move;
use rand::prelude::*;

// === 优先级 ===

/// 吃子基础分，再加 `被吃子价值 * 10`
const CAPTURE_BONUS: i32 = 10_000;
const PROMOTION_BONUS: i32 = 500;
/// 将军
const CHECK_BONUS: i32 = 300;
/// 补上当前目标阵形的一个位置
const CASTLE_BONUS: i32 = 400;
/// 打入中央
const DROP_CENTER_BONUS: i32 = 50;
/// 打入敌阵
const DROP_DEEP_BONUS: i32 = 30;
/// 每前进一段
const ADVANCE_BONUS: i32 = 5;
/// 落在中央 3x3
const CENTER_BONUS: i32 = 20;
/// 随机扰动上限（含）
const MAX_JITTER: i32 = 50;

pub struct MoveOrderer {
    rng: StdRng,
}

impl MoveOrderer {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        MoveOrderer { rng }
    }

    /// 按优先级降序排列
    pub fn order<P: Rules>(&mut self, pos: &mut P, moves: &[Move]) -> Vec<Move> {
        let side = pos.side_to_move();
        let (target, _) = castle::best_target(&*pos, side);

        let mut scored: Vec<(i32, Move)> = Vec::with_capacity(moves.len());
        for mv in moves {
            let score = self.priority(pos, mv, target) + self.rng.gen_range(0..=MAX_JITTER);
            scored.push((score, *mv));
        }

        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored.into_iter().map(|(_, mv)| mv).collect()
    }

    /// 均匀随机选一个走法
    pub fn random_choice(&mut self, moves: &[Move]) -> Option<Move> {
        moves.choose(&mut self.rng).copied()
    }

    /// 不含随机扰动的优先级
    fn priority<P: Rules>(&self, pos: &mut P, mv: &Move, target: Option<&CastlePattern>) -> i32 {
        let side = pos.side_to_move();
        let to = mv.to();
        let mut score = 0;

        let placed = match *mv {
            Move::Normal { from, promote, .. } => {
                if let Some(victim) = pos.piece_at(to) {
                    if victim.color != side {
                        score += CAPTURE_BONUS + (victim.piece_type.value() * 10.0) as i32;
                    }
                }
                if promote {
                    score += PROMOTION_BONUS;
                }
                let advanced = to.advancement(side) - from.advancement(side);
                if advanced > 0 {
                    score += advanced as i32 * ADVANCE_BONUS;
                }
                pos.piece_at(from).map(|p| p.piece_type)
            }
            Move::Drop { piece_type, .. } => {
                score += (piece_type.value() * 10.0) as i32;
                if to.is_center() {
                    score += DROP_CENTER_BONUS;
                }
                if to.in_promotion_zone(side) {
                    score += DROP_DEEP_BONUS;
                }
                Some(piece_type)
            }
        };

        if to.is_center() {
            score += CENTER_BONUS;
        }

        if let (Some(pattern), Some(piece_type)) = (target, placed) {
            if pattern.fills(&*pos, side, piece_type, to) {
                score += CASTLE_BONUS;
            }
        }

        let undo = pos.make_move(mv);
        let gives_check = pos.is_check();
        pos.undo_move(undo);
        if gives_check {
            score += CHECK_BONUS;
        }

        score
    }
}

impl Default for MoveOrderer {
    fn default() -> Self {
        MoveOrderer::new(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::test_positions;

    #[test]
    fn test_capture_first() {
        let mut board = Board::from_sfen("4k4/9/9/9/4g4/9/9/4R4/4K4 b - 1").unwrap();
        let moves = board.get_legal_moves();
        let ordered = MoveOrderer::new(Some(1)).order(&mut board, &moves);
        assert_eq!(ordered[0].to_usi(), "5h5e");
    }

    #[test]
    fn test_order_is_permutation_and_restores_position() {
        let mut board = Board::from_sfen(test_positions::MID_1).unwrap();
        let sfen = board.to_sfen();
        let moves = board.get_legal_moves();
        let ordered = MoveOrderer::new(Some(3)).order(&mut board, &moves);

        assert_eq!(board.to_sfen(), sfen);
        assert_eq!(ordered.len(), moves.len());
        for mv in &moves {
            assert!(ordered.contains(mv));
        }
    }

    #[test]
    fn test_same_seed_same_order() {
        let mut board = Board::from_sfen(test_positions::EARLY_2).unwrap();
        let moves = board.get_legal_moves();
        let a = MoveOrderer::new(Some(42)).order(&mut board, &moves);
        let b = MoveOrderer::new(Some(42)).order(&mut board, &moves);
        assert_eq!(a, b);
    }

    #[test]
    fn test_checks_ranked_high() {
        let mut board = Board::from_sfen(test_positions::MATE_IN_ONE).unwrap();
        let moves = board.get_legal_moves();
        let ordered = MoveOrderer::new(Some(7)).order(&mut board, &moves);

        let undo = board.make_move(&ordered[0]);
        assert!(board.is_in_check(board.current_turn()));
        board.undo_move(undo);
    }

    #[test]
    fn test_castle_component_bonus() {
        // 手数足够，先手目标为舟围，缺 5h 金
        let mut board = Board::from_sfen(
            "lnsgkgsnl/1r5b1/ppppppppp/9/9/9/PPPPPPPPP/1B5R1/LNSGKGSNL b - 20",
        )
        .unwrap();
        let (target, _) = castle::best_target(&board, board.current_turn());
        assert_eq!(target.map(|p| p.name), Some("funagakoi"));

        let orderer = MoveOrderer::new(Some(0));
        let fills = Move::from_usi("4i5h").unwrap();
        let other = Move::from_usi("4i4h").unwrap();
        let diff = orderer.priority(&mut board, &fills, target)
            - orderer.priority(&mut board, &other, target);
        assert_eq!(diff, CASTLE_BONUS);
    }

    #[test]
    fn test_random_choice_is_legal() {
        let board = Board::startpos();
        let moves = board.get_legal_moves();
        let mut orderer = MoveOrderer::new(Some(9));
        for _ in 0..10 {
            let mv = orderer.random_choice(&moves).unwrap();
            assert!(moves.contains(&mv));
        }
        assert_eq!(orderer.random_choice(&[]), None);
    }
}
