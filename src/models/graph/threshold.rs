//! 相似度阈值
//!
//! 阈值统一换算为万分之一的整数，既作为缓存键的一部分，又保证 "0.70" 与 "0.7"
//! 等价写法落到同一个缓存条目。

use std::fmt;

use crate::errors::{RadarError, Result};

/// 阈值精度：小数点后四位
pub const THRESHOLD_SCALE: i64 = 10_000;

/// 未指定阈值时使用的默认值
pub const DEFAULT_MIN_SIMILARITY: f64 = 0.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SimilarityThreshold(i64);

impl SimilarityThreshold {
    pub const ZERO: SimilarityThreshold = SimilarityThreshold(0);

    /// 解析客户端提交的阈值文本
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(RadarError::invalid_argument(
                "minSimilarity must not be empty",
            ));
        }
        let value: f64 = trimmed.parse().map_err(|_| {
            RadarError::invalid_argument(format!("minSimilarity '{trimmed}' is not a number"))
        })?;
        Self::from_f64(value)
    }

    pub fn from_f64(value: f64) -> Result<Self> {
        if !value.is_finite() {
            return Err(RadarError::invalid_argument(format!(
                "minSimilarity must be a finite number, got {value}"
            )));
        }
        if value < 0.0 {
            return Err(RadarError::invalid_argument(format!(
                "minSimilarity must not be negative, got {value}"
            )));
        }
        let scaled = (value * THRESHOLD_SCALE as f64).round();
        if scaled > i64::MAX as f64 {
            return Err(RadarError::invalid_argument(format!(
                "minSimilarity {value} is too large"
            )));
        }
        Ok(Self(scaled as i64))
    }

    /// 用于比较的浮点值
    pub fn value(self) -> f64 {
        self.0 as f64 / THRESHOLD_SCALE as f64
    }

    /// 规范化后的整数表示
    pub fn units(self) -> i64 {
        self.0
    }
}

impl fmt::Display for SimilarityThreshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}
