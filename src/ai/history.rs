//! 重复局面计数
//!
//! 记录本 AI 在整盘棋中到达过的局面次数，根节点选着时对重复局面扣分。
//! 新对局开始时清空。

use super::hash::PositionKey;
use log::trace;
use std::collections::HashMap;

/// 默认最多记录的局面数
pub const DEFAULT_HISTORY_CAPACITY: usize = 10_000;

/// 每次重复的扣分（步 = 1.0）
const REPETITION_PENALTY: f64 = 0.5;

#[derive(Debug, Clone)]
pub struct RepetitionTracker {
    counts: HashMap<PositionKey, u32>,
    capacity: usize,
}

impl RepetitionTracker {
    pub fn new(capacity: usize) -> Self {
        RepetitionTracker {
            counts: HashMap::new(),
            capacity: capacity.max(2),
        }
    }

    /// 计数加一，返回新的次数
    pub fn touch(&mut self, key: PositionKey) -> u32 {
        // 先裁剪再插入，新局面不会被立即淘汰
        if self.counts.len() >= self.capacity && !self.counts.contains_key(&key) {
            self.prune();
        }
        let entry = self.counts.entry(key).or_insert(0);
        *entry += 1;
        *entry
    }

    /// 当前次数（不修改）
    pub fn count(&self, key: PositionKey) -> u32 {
        self.counts.get(&key).copied().unwrap_or(0)
    }

    /// count >= 1 时严格为负，且随次数单调递减
    pub fn penalty(count: u32) -> f64 {
        -REPETITION_PENALTY * count as f64
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn clear(&mut self) {
        self.counts.clear();
    }

    /// 只保留出现次数最多的一半
    fn prune(&mut self) {
        let keep = self.capacity / 2;
        let mut entries: Vec<(PositionKey, u32)> = self.counts.drain().collect();
        // 次数相同时按键排序，保证结果确定
        entries.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        entries.truncate(keep);
        trace!("pruned repetition history to {} positions", entries.len());
        self.counts = entries.into_iter().collect();
    }
}

impl Default for RepetitionTracker {
    fn default() -> Self {
        RepetitionTracker::new(DEFAULT_HISTORY_CAPACITY)
    }
}
