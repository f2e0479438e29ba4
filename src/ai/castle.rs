//! 围（castle）识别
//!
//! 几种经典的王的防守阵形，以先手视角定义；后手使用 180 度旋转后的格子。
//! 完成度 = 已满足的 (棋子, 格子) 要求数 / 要求总数。

use crate::rules::Rules;
use crate::types::{Color, Piece, PieceType, Square};

/// 一条阵形要求：某类棋子位于某格（先手视角）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requirement {
    pub piece_type: PieceType,
    pub row: i8,
    pub col: i8,
}

const fn req(piece_type: PieceType, row: i8, col: i8) -> Requirement {
    Requirement {
        piece_type,
        row,
        col,
    }
}

/// 阵形
#[derive(Debug, PartialEq, Eq)]
pub struct CastlePattern {
    pub name: &'static str,
    /// 包含王本身的所有要求
    pub requirements: &'static [Requirement],
    /// 手数达到此值后才作为目标
    pub min_moves: u32,
}

impl CastlePattern {
    /// 要求在 color 视角下的实际格子
    #[inline]
    pub fn square_for(req: &Requirement, color: Color) -> Square {
        let sq = Square::new(req.row, req.col);
        match color {
            Color::Black => sq,
            Color::White => sq.rotate(),
        }
    }

    /// 把 piece_type 放到 to 是否补上了一条尚未满足的要求
    pub fn fills<P: Rules>(&self, pos: &P, color: Color, piece_type: PieceType, to: Square) -> bool {
        self.requirements.iter().any(|req| {
            req.piece_type == piece_type
                && Self::square_for(req, color) == to
                && pos.piece_at(to) != Some(Piece::new(piece_type, color))
        })
    }
}

/// 美浓围
pub const MINO: CastlePattern = CastlePattern {
    name: "mino",
    requirements: &[
        req(PieceType::King, 7, 7),
        req(PieceType::Silver, 7, 6),
        req(PieceType::Gold, 8, 5),
        req(PieceType::Gold, 7, 4),
    ],
    min_moves: 10,
};

/// 矢仓围
pub const YAGURA: CastlePattern = CastlePattern {
    name: "yagura",
    requirements: &[
        req(PieceType::King, 7, 1),
        req(PieceType::Gold, 7, 2),
        req(PieceType::Gold, 6, 3),
        req(PieceType::Silver, 6, 2),
        req(PieceType::Pawn, 5, 2),
        req(PieceType::Pawn, 5, 3),
    ],
    min_moves: 12,
};

/// 居飞车穴熊
pub const ANAGUMA: CastlePattern = CastlePattern {
    name: "anaguma",
    requirements: &[
        req(PieceType::King, 8, 0),
        req(PieceType::Lance, 7, 0),
        req(PieceType::Knight, 8, 1),
        req(PieceType::Silver, 7, 1),
        req(PieceType::Gold, 8, 2),
        req(PieceType::Gold, 7, 2),
    ],
    min_moves: 14,
};

/// 舟围
pub const FUNAGAKOI: CastlePattern = CastlePattern {
    name: "funagakoi",
    requirements: &[
        req(PieceType::King, 7, 2),
        req(PieceType::Gold, 8, 3),
        req(PieceType::Gold, 7, 4),
        req(PieceType::Silver, 8, 2),
    ],
    min_moves: 6,
};

/// 已知阵形
pub static CASTLE_BOOK: [&CastlePattern; 4] = [&MINO, &YAGURA, &ANAGUMA, &FUNAGAKOI];

/// 阵形对 color 的完成度，范围 [0, 1]
pub fn completion<P: Rules>(pos: &P, pattern: &CastlePattern, color: Color) -> f64 {
    if pattern.requirements.is_empty() {
        return 0.0;
    }
    let satisfied = pattern
        .requirements
        .iter()
        .filter(|req| {
            let sq = CastlePattern::square_for(req, color);
            pos.piece_at(sq) == Some(Piece::new(req.piece_type, color))
        })
        .count();
    satisfied as f64 / pattern.requirements.len() as f64
}

/// 在手数门槛已过的阵形中选完成度最高的一个
pub fn best_target<P: Rules>(pos: &P, color: Color) -> (Option<&'static CastlePattern>, f64) {
    let move_number = pos.move_number();
    let mut best: (Option<&'static CastlePattern>, f64) = (None, 0.0);

    for &pattern in CASTLE_BOOK.iter() {
        if move_number < pattern.min_moves {
            continue;
        }
        let score = completion(pos, pattern, color);
        if best.0.is_none() || score > best.1 {
            best = (Some(pattern), score);
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::test_positions;

    #[test]
    fn test_completed_mino() {
        let board = Board::from_sfen(test_positions::MID_2).unwrap();
        assert_eq!(completion(&board, &MINO, Color::Black), 1.0);

        let (target, score) = best_target(&board, Color::Black);
        assert_eq!(target.map(|p| p.name), Some("mino"));
        assert_eq!(score, 1.0);
    }

    #[test]
    fn test_partial_yagura() {
        let board = Board::from_sfen(test_positions::EARLY_3).unwrap();
        // 金 6g、银 7g、步 7f 6f 到位，王和 7h 金未到位
        let score = completion(&board, &YAGURA, Color::Black);
        assert!((score - 4.0 / 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_move_count_gate() {
        // 初始局面手数为 1，没有阵形可选
        let board = Board::startpos();
        assert_eq!(best_target(&board, Color::Black), (None, 0.0));

        // 同样的盘面，手数足够后舟围可选
        let board = Board::from_sfen(
            "lnsgkgsnl/1r5b1/ppppppppp/9/9/9/PPPPPPPPP/1B5R1/LNSGKGSNL b - 7",
        )
        .unwrap();
        let (target, score) = best_target(&board, Color::Black);
        assert_eq!(target.map(|p| p.name), Some("funagakoi"));
        assert!((score - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_white_uses_rotated_squares() {
        let board = Board::from_sfen(test_positions::START).unwrap();
        // 初始局面两边对称，完成度一致
        for &pattern in CASTLE_BOOK.iter() {
            assert_eq!(
                completion(&board, pattern, Color::Black),
                completion(&board, pattern, Color::White)
            );
        }
    }

    #[test]
    fn test_fills_only_missing_requirement() {
        let board = Board::from_sfen(test_positions::EARLY_3).unwrap();
        assert!(YAGURA.fills(&board, Color::Black, PieceType::King, Square::new(7, 1)));
        assert!(!YAGURA.fills(&board, Color::Black, PieceType::Silver, Square::new(6, 2)));
        assert!(!YAGURA.fills(&board, Color::Black, PieceType::Rook, Square::new(7, 1)));
    }
}
