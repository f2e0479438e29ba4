//! Shogi AI Engine
//!
//! 将棋 AI 引擎 - 迭代加深 alpha-beta 搜索，支持 SFEN/USI 输入输出

pub mod ai;
pub mod board;
pub mod rules;
pub mod sfen;
pub mod test_positions;
pub mod types;

pub use ai::{
    AIConfig, Difficulty, EvalDetail, Evaluator, FuzzyProfile, MoveOrderer, PositionKey,
    RepetitionTracker, SearchStats, ShogiAI, TranspositionTable, AVAILABLE_DIFFICULTIES,
    AVAILABLE_PROFILES, MATE_SCORE,
};
pub use board::{get_legal_moves_from_sfen, Board, Undo};
pub use rules::Rules;
pub use sfen::{parse_sfen, SfenError, SfenState, STARTPOS};
pub use types::{Color, GameResult, Move, MoveParseError, Piece, PieceType, Square};
