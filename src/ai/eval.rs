//! 局面评估
//!
//! 分数总是先手视角（正数有利于先手），步 = 1.0。
//! 将死固定为 ±MATE_SCORE，和棋（无子可动）为 0。

use super::castle;
use super::fuzzy::FuzzyProfile;
use crate::rules::Rules;
use crate::types::{Color, PieceType, Square, HAND_TYPES, SQUARE_COUNT};
use serde::Serialize;

// === 常量定义 ===

/// 胜负分
pub const MATE_SCORE: f64 = 10000.0;

/// 持驹按半价计算
const HAND_FACTOR: f64 = 0.5;

/// fuzzy 加成系数：`value * FUZZY_FACTOR * weighted`
const FUZZY_FACTOR: f64 = 0.1;

/// PST 表每一格的单位
const PST_SCALE: f64 = 0.1;

/// 中央 3x3 每子加成
const CENTER_BONUS: f64 = 0.2;

/// 每个可达格
const MOBILITY_WEIGHT: f64 = 0.02;

/// 可达格上有敌子时额外加成
const ATTACK_WEIGHT: f64 = 0.03;

/// 王周围每个空格或敌子
const KING_EXPOSURE_PENALTY: f64 = 0.15;

/// 步每前进一段
const PAWN_ADVANCE_BONUS: f64 = 0.05;

/// 同一筋多出的每个步
const DOUBLED_PAWN_PENALTY: f64 = 0.5;

/// 阵形完成度系数
const CASTLE_WEIGHT: f64 = 1.0;

// === PST 表 ===

/// 先手视角，row 0 是对方底线；左右对称
type PstTable = [[i8; 9]; 9];

/// 步：越靠近敌阵越好
const PST_PAWN: PstTable = [
    [0, 0, 0, 0, 0, 0, 0, 0, 0],
    [8, 8, 8, 8, 8, 8, 8, 8, 8],
    [6, 6, 7, 7, 7, 7, 7, 6, 6],
    [4, 4, 5, 6, 6, 6, 5, 4, 4],
    [2, 2, 3, 4, 4, 4, 3, 2, 2],
    [1, 1, 1, 2, 2, 2, 1, 1, 1],
    [0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 0, 0],
];

/// 桂马：二到四段、中间筋
const PST_KNIGHT: PstTable = [
    [0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 0, 0],
    [1, 2, 3, 4, 4, 4, 3, 2, 1],
    [1, 2, 3, 4, 5, 4, 3, 2, 1],
    [0, 1, 2, 3, 3, 3, 2, 1, 0],
    [0, 1, 1, 2, 2, 2, 1, 1, 0],
    [0, 0, 1, 1, 1, 1, 1, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 0, 0],
];

/// 银：进攻型，中段最活跃
const PST_SILVER: PstTable = [
    [0, 0, 0, 1, 1, 1, 0, 0, 0],
    [1, 1, 2, 2, 2, 2, 2, 1, 1],
    [1, 2, 3, 3, 3, 3, 3, 2, 1],
    [1, 2, 3, 4, 4, 4, 3, 2, 1],
    [1, 2, 3, 4, 4, 4, 3, 2, 1],
    [1, 1, 2, 3, 3, 3, 2, 1, 1],
    [0, 1, 1, 2, 2, 2, 1, 1, 0],
    [0, 0, 1, 1, 1, 1, 1, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 0, 0],
];

/// 金（及成小驹）：守备，留在己方
const PST_GOLD: PstTable = [
    [1, 1, 1, 1, 1, 1, 1, 1, 1],
    [1, 1, 1, 1, 1, 1, 1, 1, 1],
    [1, 1, 1, 2, 2, 2, 1, 1, 1],
    [0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 0, 0],
    [1, 1, 1, 1, 1, 1, 1, 1, 1],
    [2, 2, 2, 3, 3, 3, 2, 2, 2],
    [3, 3, 3, 3, 3, 3, 3, 3, 3],
];

/// 角（及马）：对角线中央
const PST_BISHOP: PstTable = [
    [0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 1, 0, 0, 0, 0, 0, 1, 0],
    [0, 0, 2, 0, 0, 0, 2, 0, 0],
    [0, 0, 0, 3, 0, 3, 0, 0, 0],
    [0, 0, 0, 0, 4, 0, 0, 0, 0],
    [0, 0, 0, 3, 0, 3, 0, 0, 0],
    [0, 0, 2, 0, 0, 0, 2, 0, 0],
    [0, 1, 0, 0, 0, 0, 0, 1, 0],
    [0, 0, 0, 0, 0, 0, 0, 0, 0],
];

/// 飞（及龙）：敌阵和中段横线
const PST_ROOK: PstTable = [
    [2, 2, 2, 2, 2, 2, 2, 2, 2],
    [3, 3, 3, 3, 3, 3, 3, 3, 3],
    [3, 3, 3, 3, 3, 3, 3, 3, 3],
    [0, 0, 0, 0, 0, 0, 0, 0, 0],
    [1, 1, 1, 1, 2, 1, 1, 1, 1],
    [0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 0, 0],
];

/// 王：留在己方底线两侧
const PST_KING: PstTable = [
    [0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 0, 0],
    [1, 1, 0, 0, 0, 0, 0, 1, 1],
    [3, 3, 2, 1, 0, 1, 2, 3, 3],
    [3, 3, 2, 1, 0, 1, 2, 3, 3],
];

fn pst_table(pt: PieceType) -> Option<&'static PstTable> {
    match pt {
        PieceType::Pawn => Some(&PST_PAWN),
        PieceType::Knight => Some(&PST_KNIGHT),
        PieceType::Silver => Some(&PST_SILVER),
        PieceType::Gold
        | PieceType::ProPawn
        | PieceType::ProLance
        | PieceType::ProKnight
        | PieceType::ProSilver => Some(&PST_GOLD),
        PieceType::Bishop | PieceType::Horse => Some(&PST_BISHOP),
        PieceType::Rook | PieceType::Dragon => Some(&PST_ROOK),
        PieceType::King => Some(&PST_KING),
        PieceType::Lance => None,
    }
}

/// PST 分数（color 视角，后手上下翻转）
#[inline]
pub fn positional_value(pt: PieceType, sq: Square, color: Color) -> f64 {
    let sq = match color {
        Color::Black => sq,
        Color::White => sq.mirror(),
    };
    pst_table(pt).map_or(0.0, |t| t[sq.row as usize][sq.col as usize] as f64 * PST_SCALE)
}

#[inline]
fn sign(color: Color) -> f64 {
    match color {
        Color::Black => 1.0,
        Color::White => -1.0,
    }
}

/// 评估分项（先手视角）
#[derive(Debug, Clone, Default, Serialize)]
pub struct EvalDetail {
    pub material: f64,
    pub positional: f64,
    pub fuzzy: f64,
    pub hand: f64,
    pub center: f64,
    pub mobility: f64,
    pub king_safety: f64,
    pub pawn_structure: f64,
    pub castle: f64,
}

impl EvalDetail {
    pub fn total(&self) -> f64 {
        self.material
            + self.positional
            + self.fuzzy
            + self.hand
            + self.center
            + self.mobility
            + self.king_safety
            + self.pawn_structure
            + self.castle
    }
}

/// 评估器，持有本 AI 的 fuzzy profile
#[derive(Debug, Clone)]
pub struct Evaluator {
    profile: FuzzyProfile,
}

impl Evaluator {
    pub fn new(profile: FuzzyProfile) -> Self {
        Evaluator { profile }
    }

    pub fn profile(&self) -> &FuzzyProfile {
        &self.profile
    }

    /// 评估局面（先手视角）
    pub fn evaluate<P: Rules>(&self, pos: &P) -> f64 {
        if pos.is_game_over() {
            if pos.is_check() {
                // 行棋方被将死
                return -sign(pos.side_to_move()) * MATE_SCORE;
            }
            return 0.0;
        }
        self.evaluate_detail(pos).total()
    }

    /// 启发式分项（不做终局判断）
    pub fn evaluate_detail<P: Rules>(&self, pos: &P) -> EvalDetail {
        let mut detail = EvalDetail::default();
        // [color][col]
        let mut pawn_files = [[0u8; 9]; 2];

        for idx in 0..SQUARE_COUNT {
            let sq = Square::from_index(idx);
            let piece = match pos.piece_at(sq) {
                Some(p) => p,
                None => continue,
            };
            let s = sign(piece.color);
            let value = piece.piece_type.value();

            detail.material += s * value;
            detail.positional += s * positional_value(piece.piece_type, sq, piece.color);

            // 王的价值只表示存在，不参与 fuzzy 加成
            if piece.piece_type != PieceType::King {
                detail.fuzzy += s * value * FUZZY_FACTOR * self.profile.weighted(sq, piece.color);
            }

            if sq.is_center() {
                detail.center += s * CENTER_BONUS;
            }

            // 机动性
            let targets = pos.destinations(sq);
            let attacks = targets
                .iter()
                .filter(|&&t| pos.piece_at(t).map_or(false, |p| p.color != piece.color))
                .count();
            detail.mobility +=
                s * (targets.len() as f64 * MOBILITY_WEIGHT + attacks as f64 * ATTACK_WEIGHT);

            match piece.piece_type {
                PieceType::Pawn => {
                    detail.pawn_structure +=
                        s * sq.advancement(piece.color) as f64 * PAWN_ADVANCE_BONUS;
                    pawn_files[piece.color.index()][sq.col as usize] += 1;
                }
                PieceType::King => {
                    detail.king_safety -= s * king_exposure(pos, sq, piece.color) as f64
                        * KING_EXPOSURE_PENALTY;
                }
                _ => {}
            }
        }

        for color in [Color::Black, Color::White] {
            let s = sign(color);
            for pt in HAND_TYPES {
                let count = pos.hand_count(color, pt);
                detail.hand += s * pt.value() * count as f64 * HAND_FACTOR;
            }

            for &count in &pawn_files[color.index()] {
                if count > 1 {
                    detail.pawn_structure -= s * (count - 1) as f64 * DOUBLED_PAWN_PENALTY;
                }
            }

            let (_, progress) = castle::best_target(pos, color);
            detail.castle += s * progress * CASTLE_WEIGHT;
        }

        detail
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Evaluator::new(FuzzyProfile::default())
    }
}

/// 王周围八格中空格或敌子的数量（盘外不算）
fn king_exposure<P: Rules>(pos: &P, king: Square, color: Color) -> u32 {
    let mut exposed = 0;
    for dr in -1..=1 {
        for dc in -1..=1 {
            if dr == 0 && dc == 0 {
                continue;
            }
            let sq = king.offset(dr, dc);
            if !sq.is_valid() {
                continue;
            }
            match pos.piece_at(sq) {
                Some(p) if p.color == color => {}
                _ => exposed += 1,
            }
        }
    }
    exposed
}
