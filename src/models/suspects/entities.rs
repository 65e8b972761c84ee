use serde::Serialize;

use crate::models::comparisons::entities::ComparisonRef;

/// 嫌疑学生条目，每次请求重新计算，不做持久化
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuspectEntry {
    pub student_key: String,
    pub total_score: i64,
    pub comparisons: Vec<ComparisonRef>,
}
