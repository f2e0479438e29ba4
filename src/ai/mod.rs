//! AI 模块
//!
//! 搜索引擎及其组件：局面哈希、评估、走法排序、置换表、重复局面计数、
//! 围的识别和难度预设。

pub mod castle;
pub mod difficulty;
pub mod eval;
pub mod fuzzy;
pub mod hash;
pub mod history;
pub mod ordering;
pub mod search;
pub mod tt;

pub use castle::{best_target, completion, CastlePattern, CASTLE_BOOK};
pub use difficulty::{Difficulty, AVAILABLE_DIFFICULTIES};
pub use eval::{EvalDetail, Evaluator, MATE_SCORE};
pub use fuzzy::{Channel, FuzzyProfile, ProfileError};
pub use hash::PositionKey;
pub use history::{RepetitionTracker, DEFAULT_HISTORY_CAPACITY};
pub use ordering::MoveOrderer;
pub use search::{SearchStats, ShogiAI};
pub use tt::{TTFlag, TranspositionTable, DEFAULT_TT_BITS};

/// 可用的 fuzzy profile 预设
pub const AVAILABLE_PROFILES: &[&str] = &["balanced", "aggressive", "defensive"];

/// AI 配置
#[derive(Debug, Clone, PartialEq)]
pub struct AIConfig {
    /// 最大搜索深度
    pub depth: u32,
    /// 随机种子（走法排序扰动和随机兜底）
    pub seed: Option<u64>,
    /// 时间限制（秒），None 为不限
    pub time_limit: Option<f64>,
    /// 置换表槽位数 = 2^tt_bits
    pub tt_bits: u32,
    /// 重复局面最多记录的局面数
    pub history_capacity: usize,
}

impl AIConfig {
    pub fn from_difficulty(difficulty: Difficulty) -> Self {
        AIConfig {
            depth: difficulty.max_depth(),
            seed: None,
            time_limit: Some(difficulty.time_limit()),
            tt_bits: DEFAULT_TT_BITS,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

impl Default for AIConfig {
    fn default() -> Self {
        AIConfig::from_difficulty(Difficulty::default())
    }
}
