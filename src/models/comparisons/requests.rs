use serde::Deserialize;

use crate::models::common::raw_value::RawValue;

/// 更新审阅评分请求
#[derive(Debug, Deserialize)]
pub struct UpdateReviewRequest {
    #[serde(default)]
    pub review: Option<RawValue>,
}

/// 相似度引擎写入新比对的请求
#[derive(Debug, Clone, Deserialize)]
pub struct CreateComparisonRequest {
    pub submission_a: i64,
    pub submission_b: i64,
    pub similarity: f64,
}

impl CreateComparisonRequest {
    /// 按 (较小 ID, 较大 ID) 排列的提交对，同一提交自比时返回 `None`
    pub fn ordered_pair(&self) -> Option<(i64, i64)> {
        match self.submission_a.cmp(&self.submission_b) {
            std::cmp::Ordering::Less => Some((self.submission_a, self.submission_b)),
            std::cmp::Ordering::Greater => Some((self.submission_b, self.submission_a)),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// 练习比对列表查询参数
#[derive(Debug, Clone, Deserialize)]
pub struct TopComparisonsQuery {
    pub limit: Option<u64>,
}

/// 比对详情查询参数
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ComparisonDetailQuery {
    /// 出现即交换左右两侧，取值被忽略
    #[serde(default)]
    pub reverse: Option<String>,
}

impl ComparisonDetailQuery {
    pub fn is_reversed(&self) -> bool {
        self.reverse.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::web::Query;

    #[test]
    fn test_ordered_pair() {
        let req = |a, b| CreateComparisonRequest {
            submission_a: a,
            submission_b: b,
            similarity: 0.5,
        };
        assert_eq!(req(3, 7).ordered_pair(), Some((3, 7)));
        assert_eq!(req(7, 3).ordered_pair(), Some((3, 7)));
        assert_eq!(req(5, 5).ordered_pair(), None);
    }

    #[test]
    fn test_reverse_flag_is_presence_only() {
        for query in ["reverse", "reverse=", "reverse=true", "reverse=1"] {
            let parsed = Query::<ComparisonDetailQuery>::from_query(query).unwrap();
            assert!(parsed.is_reversed(), "{query}");
        }
        let parsed = Query::<ComparisonDetailQuery>::from_query("").unwrap();
        assert!(!parsed.is_reversed());
    }
}
