//! 审阅评分状态机
//!
//! 评分取值 `0..=max_score`，0 表示未审阅。任意状态之间都可以转换，
//! 重复提交当前评分不产生写入。

use crate::config::ReviewConfig;
use crate::errors::{RadarError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewScale {
    pub max_score: i32,
    pub flagged_cutoff: i32,
}

/// 一次评分更新的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewTransition {
    Unchanged(i32),
    Changed { from: i32, to: i32 },
}

impl ReviewTransition {
    /// 更新后的评分
    pub fn score(&self) -> i32 {
        match *self {
            ReviewTransition::Unchanged(score) => score,
            ReviewTransition::Changed { to, .. } => to,
        }
    }

    /// 是否跨越了标记阈值（进入或离开嫌疑名单）
    pub fn crosses(&self, cutoff: i32) -> bool {
        match *self {
            ReviewTransition::Unchanged(_) => false,
            ReviewTransition::Changed { from, to } => (from >= cutoff) != (to >= cutoff),
        }
    }
}

impl ReviewScale {
    pub fn new(max_score: i32, flagged_cutoff: i32) -> Result<Self> {
        if max_score < 1 {
            return Err(RadarError::invalid_argument(format!(
                "review max score must be at least 1, got {max_score}"
            )));
        }
        let scale = Self {
            max_score,
            flagged_cutoff: max_score,
        };
        let flagged_cutoff = scale.validate_cutoff(flagged_cutoff)?;
        Ok(Self {
            max_score,
            flagged_cutoff,
        })
    }

    pub fn from_config(config: &ReviewConfig) -> Result<Self> {
        Self::new(config.max_score, config.flagged_cutoff)
    }

    /// 解析客户端提交的评分，接受整数文本
    pub fn parse_score(&self, raw: &str) -> Result<i32> {
        let trimmed = raw.trim();
        let score: i32 = trimmed.parse().map_err(|_| {
            RadarError::invalid_argument(format!("review score '{trimmed}' is not an integer"))
        })?;
        if !(0..=self.max_score).contains(&score) {
            return Err(RadarError::invalid_argument(format!(
                "review score must be between 0 and {}, got {score}",
                self.max_score
            )));
        }
        Ok(score)
    }

    /// 嫌疑名单阈值必须落在 `1..=max_score`
    pub fn validate_cutoff(&self, cutoff: i32) -> Result<i32> {
        if !(1..=self.max_score).contains(&cutoff) {
            return Err(RadarError::invalid_argument(format!(
                "flagged cutoff must be between 1 and {}, got {cutoff}",
                self.max_score
            )));
        }
        Ok(cutoff)
    }

    pub fn is_flagged(&self, score: i32) -> bool {
        score >= self.flagged_cutoff
    }

    pub fn transition(&self, current: i32, next: i32) -> ReviewTransition {
        if current == next {
            ReviewTransition::Unchanged(current)
        } else {
            ReviewTransition::Changed {
                from: current,
                to: next,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scale() -> ReviewScale {
        ReviewScale::new(10, 5).unwrap()
    }

    #[test]
    fn test_parse_accepts_whole_range() {
        let scale = scale();
        for score in 0..=10 {
            assert_eq!(scale.parse_score(&score.to_string()).unwrap(), score);
        }
        assert_eq!(scale.parse_score(" 7 ").unwrap(), 7);
    }

    #[test]
    fn test_parse_rejects_out_of_range() {
        let scale = scale();
        for raw in ["-1", "11", "999"] {
            let err = scale.parse_score(raw).unwrap_err();
            assert!(matches!(err, RadarError::InvalidArgument(_)), "{raw}");
        }
    }

    #[test]
    fn test_parse_rejects_malformed() {
        let scale = scale();
        for raw in ["", "abc", "5.5", "1e1"] {
            assert!(scale.parse_score(raw).is_err(), "{raw}");
        }
    }

    #[test]
    fn test_cutoff_bounds() {
        let scale = scale();
        assert!(scale.validate_cutoff(0).is_err());
        assert!(scale.validate_cutoff(11).is_err());
        assert_eq!(scale.validate_cutoff(1).unwrap(), 1);
        assert_eq!(scale.validate_cutoff(10).unwrap(), 10);
    }

    #[test]
    fn test_new_rejects_bad_configuration() {
        assert!(ReviewScale::new(0, 1).is_err());
        assert!(ReviewScale::new(10, 0).is_err());
        assert!(ReviewScale::new(10, 11).is_err());
    }

    #[test]
    fn test_transition_is_idempotent() {
        let scale = scale();
        assert_eq!(scale.transition(7, 7), ReviewTransition::Unchanged(7));
        assert_eq!(
            scale.transition(0, 7),
            ReviewTransition::Changed { from: 0, to: 7 }
        );
        assert_eq!(scale.transition(7, 0).score(), 0);
    }

    #[test]
    fn test_crossing_cutoff() {
        let scale = scale();
        assert!(scale.transition(0, 5).crosses(5));
        assert!(scale.transition(9, 4).crosses(5));
        assert!(!scale.transition(5, 9).crosses(5));
        assert!(!scale.transition(1, 4).crosses(5));
        assert!(!scale.transition(6, 6).crosses(5));
        assert!(scale.is_flagged(5));
        assert!(!scale.is_flagged(4));
    }
}
