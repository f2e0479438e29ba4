//! 局面哈希（Zobrist）
//!
//! 覆盖完整局面：盘面、双方持驹数量和行棋方。手数不参与哈希，
//! 规则上等价的局面得到相同的键。

use crate::rules::Rules;
use crate::types::{Color, Square, ALL_PIECE_TYPES, HAND_TYPES, SQUARE_COUNT};
use rand::prelude::*;
use std::fmt;

/// 单种持驹的最大数量（步 18 枚）
const MAX_HAND: usize = 18;

/// Zobrist 哈希表
struct ZobristTable {
    /// [square][color * 14 + piece_type]
    pieces: [[u64; 28]; SQUARE_COUNT],
    /// [color][hand_index][count]
    hands: [[[u64; MAX_HAND + 1]; 7]; 2],
    turn: u64,
}

impl ZobristTable {
    #[allow(clippy::needless_range_loop)]
    fn new() -> Self {
        let mut rng = StdRng::seed_from_u64(0x5A0D_1C0F_FEE5_0B1E);
        let mut pieces = [[0u64; 28]; SQUARE_COUNT];
        let mut hands = [[[0u64; MAX_HAND + 1]; 7]; 2];

        for sq in 0..SQUARE_COUNT {
            for idx in 0..28 {
                pieces[sq][idx] = rng.gen();
            }
        }
        for color in 0..2 {
            for kind in 0..7 {
                // 数量为 0 时不贡献
                for count in 1..=MAX_HAND {
                    hands[color][kind][count] = rng.gen();
                }
            }
        }

        ZobristTable {
            pieces,
            hands,
            turn: rng.gen(),
        }
    }
}

lazy_static::lazy_static! {
    static ref ZOBRIST: ZobristTable = ZobristTable::new();
}

/// 局面键，用于置换表和重复局面计数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PositionKey(pub u64);

impl PositionKey {
    /// 计算局面的键
    pub fn of<P: Rules>(pos: &P) -> PositionKey {
        let mut hash = 0u64;

        for idx in 0..SQUARE_COUNT {
            if let Some(piece) = pos.piece_at(Square::from_index(idx)) {
                let slot = piece.color.index() * ALL_PIECE_TYPES.len() + piece.piece_type.index();
                hash ^= ZOBRIST.pieces[idx][slot];
            }
        }

        for color in [Color::Black, Color::White] {
            for pt in HAND_TYPES {
                let count = (pos.hand_count(color, pt) as usize).min(MAX_HAND);
                if let Some(kind) = pt.hand_index() {
                    hash ^= ZOBRIST.hands[color.index()][kind][count];
                }
            }
        }

        if pos.side_to_move() == Color::White {
            hash ^= ZOBRIST.turn;
        }

        PositionKey(hash)
    }
}

impl fmt::Display for PositionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::test_positions;

    #[test]
    fn test_same_position_same_key() {
        let a = Board::startpos();
        let b = Board::from_sfen(test_positions::START).unwrap();
        assert_eq!(PositionKey::of(&a), PositionKey::of(&b));
    }

    #[test]
    fn test_move_number_ignored() {
        let a = Board::from_sfen("4k4/9/9/9/9/9/9/9/4K4 b P 1").unwrap();
        let b = Board::from_sfen("4k4/9/9/9/9/9/9/9/4K4 b P 57").unwrap();
        assert_eq!(PositionKey::of(&a), PositionKey::of(&b));
    }

    #[test]
    fn test_turn_and_hand_distinguish() {
        let base = Board::from_sfen("4k4/9/9/9/9/9/9/9/4K4 b P 1").unwrap();
        let white = Board::from_sfen("4k4/9/9/9/9/9/9/9/4K4 w P 1").unwrap();
        let two = Board::from_sfen("4k4/9/9/9/9/9/9/9/4K4 b 2P 1").unwrap();
        let theirs = Board::from_sfen("4k4/9/9/9/9/9/9/9/4K4 b p 1").unwrap();

        let key = PositionKey::of(&base);
        assert_ne!(key, PositionKey::of(&white));
        assert_ne!(key, PositionKey::of(&two));
        assert_ne!(key, PositionKey::of(&theirs));
    }

    #[test]
    fn test_key_restored_after_undo() {
        let mut board = Board::from_sfen(test_positions::MID_1).unwrap();
        let before = PositionKey::of(&board);
        for mv in board.get_legal_moves() {
            let undo = board.make_move(&mv);
            assert_ne!(PositionKey::of(&board), before);
            board.undo_move(undo);
        }
        assert_eq!(PositionKey::of(&board), before);
    }
}
