//! 置换表（Position Cache）
//!
//! 固定容量，按 `key & mask` 直接寻址。每个条目记录搜索深度和边界类型，
//! 只有存储深度不小于请求深度时才算命中。

use super::hash::PositionKey;
use log::trace;

/// 默认 2^16 个槽位
pub const DEFAULT_TT_BITS: u32 = 16;

/// 槽位数上限 2^24
const MAX_TT_BITS: u32 = 24;

/// 分数的边界类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TTFlag {
    /// 窗口内的精确值
    Exact,
    /// fail-high，真实值 >= score
    LowerBound,
    /// fail-low，真实值 <= score
    UpperBound,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TTEntry {
    pub key: PositionKey,
    pub depth: u32,
    pub score: f64,
    pub flag: TTFlag,
}

pub struct TranspositionTable {
    entries: Vec<Option<TTEntry>>,
    mask: usize,
    hits: u64,
    misses: u64,
}

impl TranspositionTable {
    pub fn new(bits: u32) -> Self {
        let bits = bits.clamp(1, MAX_TT_BITS);
        let size = 1usize << bits;
        TranspositionTable {
            entries: vec![None; size],
            mask: size - 1,
            hits: 0,
            misses: 0,
        }
    }

    #[inline]
    fn slot(&self, key: PositionKey) -> usize {
        (key.0 as usize) & self.mask
    }

    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    /// 已占用的槽位数
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| e.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(|e| e.is_none())
    }

    /// 查找深度足够的条目（任意边界类型）
    #[inline]
    pub fn probe(&mut self, key: PositionKey, depth: u32) -> Option<TTEntry> {
        match self.entries[self.slot(key)] {
            Some(entry) if entry.key == key && entry.depth >= depth => {
                self.hits += 1;
                Some(entry)
            }
            _ => {
                self.misses += 1;
                None
            }
        }
    }

    /// 只返回精确值
    pub fn get(&mut self, key: PositionKey, depth: u32) -> Option<f64> {
        self.probe(key, depth)
            .filter(|e| e.flag == TTFlag::Exact)
            .map(|e| e.score)
    }

    /// 存入精确值
    pub fn put(&mut self, key: PositionKey, depth: u32, score: f64) {
        self.store(key, depth, score, TTFlag::Exact);
    }

    /// 深度优先替换：不同局面直接覆盖，同一局面只接受更深（或同深）的结果
    #[inline]
    pub fn store(&mut self, key: PositionKey, depth: u32, score: f64, flag: TTFlag) {
        let idx = self.slot(key);
        let replace = match &self.entries[idx] {
            None => true,
            Some(entry) => entry.key != key || depth >= entry.depth,
        };
        if replace {
            self.entries[idx] = Some(TTEntry {
                key,
                depth,
                score,
                flag,
            });
        }
    }

    pub fn clear(&mut self) {
        trace!(
            "clearing transposition table ({} hits, {} misses)",
            self.hits,
            self.misses
        );
        self.entries.iter_mut().for_each(|e| *e = None);
        self.hits = 0;
        self.misses = 0;
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}

impl Default for TranspositionTable {
    fn default() -> Self {
        TranspositionTable::new(DEFAULT_TT_BITS)
    }
}
