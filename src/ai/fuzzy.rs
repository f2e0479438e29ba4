//! 模糊空间影响图（fuzzy profile）
//!
//! 五个 9x9 通道，数值都在 [0, 1]，以先手视角存储：
//! 中央控制、侧翼控制、升变潜力、王的安全、打入潜力。
//! 后手取值时上下翻转。每个 AI 实例可以持有不同的 profile 来体现棋风。

use crate::types::{Color, Square};
use log::warn;
use thiserror::Error;

/// 9x9 影响矩阵
pub type Matrix = [[f64; 9]; 9];

/// 通道数
pub const CHANNEL_COUNT: usize = 5;

/// 影响通道
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Center,
    Flank,
    Promotion,
    KingSafety,
    Drop,
}

pub const ALL_CHANNELS: [Channel; CHANNEL_COUNT] = [
    Channel::Center,
    Channel::Flank,
    Channel::Promotion,
    Channel::KingSafety,
    Channel::Drop,
];

impl Channel {
    #[inline]
    fn index(&self) -> usize {
        match self {
            Channel::Center => 0,
            Channel::Flank => 1,
            Channel::Promotion => 2,
            Channel::KingSafety => 3,
            Channel::Drop => 4,
        }
    }
}

/// profile 构造错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProfileError {
    #[error("{channel:?} matrix value {value} at ({row}, {col}) is outside [0, 1]")]
    OutOfRange {
        channel: Channel,
        row: usize,
        col: usize,
        value: f64,
    },
    #[error("weight for {channel:?} must be finite and non-negative, got {value}")]
    BadWeight { channel: Channel, value: f64 },
}

/// 五通道影响图加权重
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyProfile {
    name: String,
    matrices: [Matrix; CHANNEL_COUNT],
    weights: [f64; CHANNEL_COUNT],
}

impl FuzzyProfile {
    /// 构造并校验
    pub fn new(
        name: &str,
        matrices: [Matrix; CHANNEL_COUNT],
        weights: [f64; CHANNEL_COUNT],
    ) -> Result<Self, ProfileError> {
        for channel in ALL_CHANNELS {
            let matrix = &matrices[channel.index()];
            for (row, values) in matrix.iter().enumerate() {
                for (col, &value) in values.iter().enumerate() {
                    if !(0.0..=1.0).contains(&value) {
                        return Err(ProfileError::OutOfRange {
                            channel,
                            row,
                            col,
                            value,
                        });
                    }
                }
            }
            let weight = weights[channel.index()];
            if !weight.is_finite() || weight < 0.0 {
                return Err(ProfileError::BadWeight {
                    channel,
                    value: weight,
                });
            }
        }

        Ok(FuzzyProfile {
            name: name.to_string(),
            matrices,
            weights,
        })
    }

    /// 均衡棋风
    pub fn balanced() -> Self {
        Self::with_weights("balanced", [0.25, 0.1, 0.25, 0.2, 0.2])
    }

    /// 进攻棋风：重视中央、升变和打入
    pub fn aggressive() -> Self {
        Self::with_weights("aggressive", [0.3, 0.1, 0.35, 0.05, 0.3])
    }

    /// 防守棋风：重视王的安全
    pub fn defensive() -> Self {
        Self::with_weights("defensive", [0.15, 0.15, 0.1, 0.45, 0.1])
    }

    /// 按名称选择预设，未知名称回退到 balanced
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "balanced" => Self::balanced(),
            "aggressive" => Self::aggressive(),
            "defensive" => Self::defensive(),
            other => {
                warn!("Unknown profile: {}. Using balanced.", other);
                Self::balanced()
            }
        }
    }

    /// 预设矩阵 + 自定义权重
    fn with_weights(name: &str, weights: [f64; CHANNEL_COUNT]) -> Self {
        FuzzyProfile {
            name: name.to_string(),
            matrices: default_matrices(),
            weights,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn weights(&self) -> &[f64; CHANNEL_COUNT] {
        &self.weights
    }

    /// 取 color 视角下某格某通道的值
    #[inline]
    pub fn sample(&self, channel: Channel, sq: Square, color: Color) -> f64 {
        let sq = match color {
            Color::Black => sq,
            Color::White => sq.mirror(),
        };
        self.matrices[channel.index()][sq.row as usize][sq.col as usize]
    }

    /// 加权和 `w_center·center + w_flank·flank + ...`
    pub fn weighted(&self, sq: Square, color: Color) -> f64 {
        ALL_CHANNELS
            .iter()
            .map(|&ch| self.weights[ch.index()] * self.sample(ch, sq, color))
            .sum()
    }
}

impl Default for FuzzyProfile {
    fn default() -> Self {
        Self::balanced()
    }
}

/// 预设五通道矩阵（先手视角，row 0 为对方底线）
fn default_matrices() -> [Matrix; CHANNEL_COUNT] {
    let mut center = [[0.0; 9]; 9];
    let mut flank = [[0.0; 9]; 9];
    let mut promotion = [[0.0; 9]; 9];
    let mut king_safety = [[0.0; 9]; 9];
    let mut drop = [[0.0; 9]; 9];

    for row in 0..9 {
        for col in 0..9 {
            let dr = (row as f64 - 4.0).abs();
            let dc = (col as f64 - 4.0).abs();

            center[row][col] = 1.0 - dr.max(dc) / 4.0;
            flank[row][col] = dc / 4.0;
            // 敌阵三段为 1，往己方逐段递减
            promotion[row][col] = ((5.0 - row as f64) / 3.0).clamp(0.0, 1.0);
            // 己方后三段、靠边的位置更安全
            king_safety[row][col] =
                ((row as f64 - 4.0) / 4.0).clamp(0.0, 1.0) * (0.5 + 0.5 * dc / 4.0);
            // 打入在敌阵二三段附近最有威胁
            drop[row][col] = (1.0 - (row as f64 - 2.5).abs() / 5.0).clamp(0.0, 1.0);
        }
    }

    [center, flank, promotion, king_safety, drop]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        for profile in [
            FuzzyProfile::balanced(),
            FuzzyProfile::aggressive(),
            FuzzyProfile::defensive(),
        ] {
            let rebuilt =
                FuzzyProfile::new(profile.name(), default_matrices(), *profile.weights());
            assert_eq!(rebuilt, Ok(profile));
        }
    }

    #[test]
    fn test_out_of_range_rejected() {
        let mut matrices = default_matrices();
        matrices[2][3][4] = 1.5;
        let err = FuzzyProfile::new("bad", matrices, [0.2; 5]).unwrap_err();
        assert!(matches!(
            err,
            ProfileError::OutOfRange {
                channel: Channel::Promotion,
                row: 3,
                col: 4,
                ..
            }
        ));

        let err = FuzzyProfile::new("bad", default_matrices(), [0.2, -1.0, 0.2, 0.2, 0.2])
            .unwrap_err();
        assert!(matches!(
            err,
            ProfileError::BadWeight {
                channel: Channel::Flank,
                ..
            }
        ));
    }

    #[test]
    fn test_white_sample_is_mirrored() {
        let profile = FuzzyProfile::balanced();
        let sq = Square::new(1, 3);
        for ch in ALL_CHANNELS {
            assert_eq!(
                profile.sample(ch, sq, Color::White),
                profile.sample(ch, sq.mirror(), Color::Black)
            );
        }
        // 先手在敌阵升变潜力最高，后手在同一格最低
        assert_eq!(profile.sample(Channel::Promotion, sq, Color::Black), 1.0);
        assert_eq!(profile.sample(Channel::Promotion, sq, Color::White), 0.0);
    }

    #[test]
    fn test_unknown_profile_falls_back() {
        assert_eq!(FuzzyProfile::from_name("wild").name(), "balanced");
        assert_eq!(FuzzyProfile::from_name("Aggressive").name(), "aggressive");
    }
}
