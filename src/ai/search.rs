//! 搜索引擎
//!
//! 迭代加深 + alpha-beta minimax。分数统一为先手视角，先手取最大、后手取最小。
//! 每个 `ShogiAI` 独占自己的置换表和重复局面计数，不同实例之间不共享。

use super::difficulty::Difficulty;
use super::eval::{Evaluator, MATE_SCORE};
use super::fuzzy::FuzzyProfile;
use super::hash::PositionKey;
use super::history::RepetitionTracker;
use super::ordering::MoveOrderer;
use super::tt::{TTFlag, TranspositionTable};
use super::AIConfig;
use crate::board::Board;
use crate::rules::Rules;
use crate::sfen::SfenError;
use crate::types::{Color, Move};
use log::{debug, info, warn};
use serde::Serialize;
use std::time::{Duration, Instant};

/// 单次 `get_best_move` 的统计
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchStats {
    /// minimax 调用次数
    pub nodes: u64,
    /// 评估函数调用次数
    pub evaluations: u64,
    pub cache_hits: u64,
    /// 最后完整完成的深度（0 表示没有）
    pub depth_reached: u32,
    pub elapsed_ms: u64,
}

/// 将棋 AI
pub struct ShogiAI {
    config: AIConfig,
    evaluator: Evaluator,
    orderer: MoveOrderer,
    tt: TranspositionTable,
    history: RepetitionTracker,
    stats: SearchStats,
    deadline: Option<Instant>,
    timed_out: bool,
    /// 测试用：节点数达到此值即视为超时
    #[cfg(test)]
    node_budget: Option<u64>,
}

impl ShogiAI {
    pub fn new(config: AIConfig, profile: FuzzyProfile) -> Self {
        ShogiAI {
            evaluator: Evaluator::new(profile),
            orderer: MoveOrderer::new(config.seed),
            tt: TranspositionTable::new(config.tt_bits),
            history: RepetitionTracker::new(config.history_capacity),
            stats: SearchStats::default(),
            deadline: None,
            timed_out: false,
            #[cfg(test)]
            node_budget: None,
            config,
        }
    }

    /// 按难度创建，使用 balanced profile
    pub fn from_difficulty(difficulty: Difficulty, seed: Option<u64>) -> Self {
        let config = AIConfig {
            seed,
            ..AIConfig::from_difficulty(difficulty)
        };
        Self::new(config, FuzzyProfile::default())
    }

    pub fn config(&self) -> &AIConfig {
        &self.config
    }

    pub fn profile(&self) -> &FuzzyProfile {
        self.evaluator.profile()
    }

    /// 最近一次搜索的统计
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    pub fn history(&self) -> &RepetitionTracker {
        &self.history
    }

    /// 切换难度，未知名称回退到 medium
    pub fn set_difficulty(&mut self, name: &str) -> Difficulty {
        let difficulty = Difficulty::from_name(name);
        self.config.depth = difficulty.max_depth();
        self.config.time_limit = Some(difficulty.time_limit());
        info!(
            "Difficulty set to {} (depth {}, {:.1}s)",
            difficulty,
            difficulty.max_depth(),
            difficulty.time_limit()
        );
        difficulty
    }

    /// 新对局开始时调用：清空置换表和重复局面计数
    pub fn reset_memory(&mut self) {
        self.tt.clear();
        self.history.clear();
        debug!("AI memory reset");
    }

    /// 静态评估（不计入统计）
    pub fn evaluate_static<P: Rules>(&self, pos: &P) -> f64 {
        self.evaluator.evaluate(pos)
    }

    /// 为行棋方选择走法；无合法走法时返回 None。
    /// 返回时局面与调用前完全一致。
    pub fn get_best_move<P: Rules>(&mut self, pos: &mut P) -> Option<Move> {
        let start = Instant::now();
        self.begin_search(start);

        let moves = pos.legal_moves();
        if moves.is_empty() {
            debug!("No legal moves for {}", pos.side_to_move());
            return None;
        }

        self.history.touch(PositionKey::of(&*pos));

        // 唯一合法走法直接返回，不搜索
        if moves.len() == 1 {
            let mv = moves[0];
            self.record_choice(pos, &mv);
            self.stats.elapsed_ms = start.elapsed().as_millis() as u64;
            info!("Only one legal move: {}", mv);
            return Some(mv);
        }

        let maximizing = pos.side_to_move() == Color::Black;
        // 最后一个完整深度的结果
        let mut completed: Option<(Move, f64)> = None;
        // 第一层未完成时已评估部分的结果
        let mut partial: Option<(Move, f64)> = None;

        for depth in 1..=self.config.depth.max(1) {
            if self.time_up() {
                break;
            }

            let ordered = self.orderer.order(pos, &moves);
            let mut depth_best: Option<(Move, f64)> = None;
            let mut finished = true;

            for mv in &ordered {
                if self.time_up() {
                    finished = false;
                    break;
                }

                let undo = pos.make_move(mv);
                let child_key = PositionKey::of(&*pos);
                let score = self.minimax(
                    pos,
                    depth - 1,
                    f64::NEG_INFINITY,
                    f64::INFINITY,
                    !maximizing,
                );
                pos.undo_move(undo);

                if self.timed_out {
                    finished = false;
                    break;
                }

                // 重复局面惩罚只作用于根节点，方向是对行棋方不利
                let penalty = RepetitionTracker::penalty(self.history.count(child_key));
                let score = if maximizing {
                    score + penalty
                } else {
                    score - penalty
                };

                let better = match depth_best {
                    None => true,
                    Some((_, best)) if maximizing => score > best,
                    Some((_, best)) => score < best,
                };
                if better {
                    depth_best = Some((*mv, score));
                }
            }

            if !finished {
                if completed.is_none() {
                    partial = depth_best;
                }
                debug!("Depth {} interrupted by time limit", depth);
                break;
            }

            if let Some((mv, score)) = depth_best {
                debug!(
                    "Depth {} complete: best {} score {:.2} nodes {}",
                    depth, mv, score, self.stats.nodes
                );
            }
            completed = depth_best;
            self.stats.depth_reached = depth;
        }

        let chosen = match completed.or(partial) {
            Some((mv, _)) => Some(mv),
            None => {
                warn!("Time limit reached before any move was evaluated, choosing randomly");
                self.orderer.random_choice(&moves)
            }
        };

        if let Some(mv) = chosen {
            self.record_choice(pos, &mv);
        }
        self.stats.elapsed_ms = start.elapsed().as_millis() as u64;
        info!(
            "AI evaluated {} nodes in {:.2}s (depth {}, cache hits {})",
            self.stats.nodes,
            start.elapsed().as_secs_f64(),
            self.stats.depth_reached,
            self.stats.cache_hits
        );
        chosen
    }

    /// 从 SFEN 选择走法（USI 字符串）
    pub fn get_best_move_sfen(&mut self, sfen: &str) -> Result<Option<String>, SfenError> {
        let mut board = Board::from_sfen(sfen)?;
        Ok(self.get_best_move(&mut board).map(|mv| mv.to_usi()))
    }

    /// 固定深度、不限时间的 minimax 值（先手视角），不计重复惩罚
    pub fn search_score<P: Rules>(&mut self, pos: &mut P, depth: u32) -> f64 {
        self.begin_search(Instant::now());
        self.deadline = None;
        let maximizing = pos.side_to_move() == Color::Black;
        self.minimax(pos, depth, f64::NEG_INFINITY, f64::INFINITY, maximizing)
    }

    fn begin_search(&mut self, start: Instant) {
        self.stats = SearchStats::default();
        self.timed_out = false;
        self.deadline = self
            .config
            .time_limit
            .map(|secs| start + Duration::from_secs_f64(secs.max(0.0)));
    }

    /// 检查时间，超时后置位 `timed_out`
    #[inline]
    fn time_up(&mut self) -> bool {
        if !self.timed_out {
            if let Some(deadline) = self.deadline {
                if Instant::now() >= deadline {
                    self.timed_out = true;
                }
            }
            #[cfg(test)]
            if let Some(budget) = self.node_budget {
                if self.stats.nodes >= budget {
                    self.timed_out = true;
                }
            }
        }
        self.timed_out
    }

    #[inline]
    fn evaluate_counted<P: Rules>(&mut self, pos: &P) -> f64 {
        self.stats.evaluations += 1;
        self.evaluator.evaluate(pos)
    }

    /// 把选中走法之后的局面记入历史
    fn record_choice<P: Rules>(&mut self, pos: &mut P, mv: &Move) {
        let undo = pos.make_move(mv);
        let key = PositionKey::of(&*pos);
        pos.undo_move(undo);
        self.history.touch(key);
    }

    /// Alpha-beta minimax。超时中断的结果不写入置换表，由根节点丢弃。
    fn minimax<P: Rules>(
        &mut self,
        pos: &mut P,
        depth: u32,
        mut alpha: f64,
        mut beta: f64,
        maximizing: bool,
    ) -> f64 {
        self.stats.nodes += 1;

        if depth == 0 {
            return self.evaluate_counted(&*pos);
        }

        let key = PositionKey::of(&*pos);
        let (alpha_orig, beta_orig) = (alpha, beta);

        if let Some(entry) = self.tt.probe(key, depth) {
            match entry.flag {
                TTFlag::Exact => {
                    self.stats.cache_hits += 1;
                    return entry.score;
                }
                TTFlag::LowerBound => alpha = alpha.max(entry.score),
                TTFlag::UpperBound => beta = beta.min(entry.score),
            }
            if alpha >= beta {
                self.stats.cache_hits += 1;
                return entry.score;
            }
        }

        let moves = pos.legal_moves();
        if moves.is_empty() {
            // 终局：越早的杀越好
            let score = self.evaluate_counted(&*pos);
            return mate_distance(score, depth);
        }

        let ordered = self.orderer.order(pos, &moves);
        let mut best = if maximizing {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };

        for (i, mv) in ordered.iter().enumerate() {
            if i > 0 && self.time_up() {
                return best;
            }

            let undo = pos.make_move(mv);
            let score = self.minimax(pos, depth - 1, alpha, beta, !maximizing);
            pos.undo_move(undo);

            if self.timed_out {
                return best;
            }

            if maximizing {
                best = best.max(score);
                alpha = alpha.max(score);
            } else {
                best = best.min(score);
                beta = beta.min(score);
            }
            if beta <= alpha {
                break;
            }
        }

        let flag = if best <= alpha_orig {
            TTFlag::UpperBound
        } else if best >= beta_orig {
            TTFlag::LowerBound
        } else {
            TTFlag::Exact
        };
        self.tt.store(key, depth, best, flag);

        best
    }
}

/// 胜负分加上剩余深度
#[inline]
fn mate_distance(score: f64, depth: u32) -> f64 {
    if score >= MATE_SCORE {
        score + depth as f64
    } else if score <= -MATE_SCORE {
        score - depth as f64
    } else {
        score
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_positions;

    fn fixed_depth(depth: u32, seed: u64) -> ShogiAI {
        let config = AIConfig {
            depth,
            seed: Some(seed),
            time_limit: None,
            ..AIConfig::default()
        };
        ShogiAI::new(config, FuzzyProfile::default())
    }

    #[test]
    fn test_depth_one_evaluates_every_root_move() {
        let mut board = Board::startpos();
        let mut ai = fixed_depth(1, 1);
        let mv = ai.get_best_move(&mut board).unwrap();

        assert!(board.get_legal_moves().contains(&mv));
        assert_eq!(ai.stats().evaluations, 30);
        assert_eq!(ai.stats().depth_reached, 1);
    }

    #[test]
    fn test_single_move_skips_search() {
        let mut board = Board::from_sfen(test_positions::ONE_EVASION).unwrap();
        let mut ai = fixed_depth(4, 1);
        let mv = ai.get_best_move(&mut board).unwrap();

        assert_eq!(mv.to_usi(), "8g9e");
        assert_eq!(ai.stats().nodes, 0);
        assert_eq!(ai.stats().evaluations, 0);
        // 根局面和走后局面都记录在历史中
        assert_eq!(ai.history().len(), 2);
    }

    #[test]
    fn test_no_legal_moves() {
        let mut board = Board::from_sfen(test_positions::CHECKMATED).unwrap();
        let mut ai = fixed_depth(2, 1);
        assert_eq!(ai.get_best_move(&mut board), None);
    }

    #[test]
    fn test_finds_mate_in_one() {
        for depth in 1..=2 {
            let mut board = Board::from_sfen(test_positions::MATE_IN_ONE).unwrap();
            let mut ai = fixed_depth(depth, 5);
            let mv = ai.get_best_move(&mut board).unwrap();
            assert_eq!(mv.to_usi(), "G*5b", "depth {}", depth);
        }
    }

    #[test]
    fn test_zero_time_falls_back_to_random_legal_move() {
        let mut board = Board::startpos();
        let config = AIConfig {
            depth: 3,
            seed: Some(11),
            time_limit: Some(0.0),
            ..AIConfig::default()
        };
        let mut ai = ShogiAI::new(config, FuzzyProfile::default());
        let mv = ai.get_best_move(&mut board).unwrap();

        assert!(board.get_legal_moves().contains(&mv));
        assert_eq!(ai.stats().depth_reached, 0);
        assert_eq!(ai.stats().evaluations, 0);
    }

    #[test]
    fn test_interrupted_depth_keeps_completed_result() {
        let mut board = Board::startpos();
        let root_moves = board.get_legal_moves();
        let expected = fixed_depth(1, 21).get_best_move(&mut board).unwrap();

        // 第一层 30 个节点；第二层在第二个根走法的子树中途超时
        let mut ai = fixed_depth(2, 21);
        ai.node_budget = Some(30 + 31 + 15);
        let mv = ai.get_best_move(&mut board).unwrap();

        assert_eq!(mv, expected);
        assert_eq!(ai.stats().depth_reached, 1);
        assert_eq!(board.to_sfen(), Board::startpos().to_sfen());

        // 置换表里只有完整搜完的子局面，且分数与独立搜索一致
        let mut cached_nodes = 0;
        let mut cached = 0;
        for root in &root_moves {
            let undo = board.make_move(root);
            let key = PositionKey::of(&board);
            if let Some(entry) = ai.tt.probe(key, 1) {
                assert_eq!(entry.flag, TTFlag::Exact);
                let fresh = fixed_depth(1, 99).search_score(&mut board, 1);
                assert_eq!(entry.score, fresh, "{}", root);
                cached += 1;
                cached_nodes += 1 + board.get_legal_moves().len() as u64;
            }
            board.undo_move(undo);
        }
        assert!(cached >= 1);
        assert!(cached < root_moves.len());
        // 超时的子树访问过节点却没有留下条目
        let interrupted_nodes = ai.stats().nodes - 30 - cached_nodes;
        assert!(interrupted_nodes > 0);
    }

    #[test]
    fn test_mate_distance() {
        assert_eq!(mate_distance(MATE_SCORE, 3), MATE_SCORE + 3.0);
        assert_eq!(mate_distance(-MATE_SCORE, 2), -MATE_SCORE - 2.0);
        assert_eq!(mate_distance(1.5, 4), 1.5);
    }

    #[test]
    fn test_set_difficulty_and_reset() {
        let mut ai = ShogiAI::from_difficulty(Difficulty::Easy, Some(1));
        assert_eq!(ai.config().depth, 2);

        assert_eq!(ai.set_difficulty("expert"), Difficulty::Expert);
        assert_eq!(ai.config().depth, 5);
        assert_eq!(ai.config().time_limit, Some(8.0));

        assert_eq!(ai.set_difficulty("nonsense"), Difficulty::Medium);
        assert_eq!(ai.config().depth, 3);

        let mut board = Board::from_sfen(test_positions::ONE_EVASION).unwrap();
        ai.get_best_move(&mut board);
        assert!(!ai.history().is_empty());
        ai.reset_memory();
        assert!(ai.history().is_empty());
    }

    #[test]
    fn test_repeated_child_penalised() {
        // 先手两步棋后局面分别为 A、B；B 已重复多次时应选择 A
        let mut board = Board::from_sfen("4k4/9/9/9/9/9/9/9/R3K4 b - 1").unwrap();
        let mut ai = fixed_depth(1, 3);
        let first = ai.get_best_move(&mut board).unwrap();

        // 反复走到同一个子局面
        for _ in 0..20 {
            let undo = board.make_move(&first);
            ai.history.touch(PositionKey::of(&board));
            board.undo_move(undo);
        }
        let second = ai.get_best_move(&mut board).unwrap();
        assert_ne!(first, second);
    }
}
