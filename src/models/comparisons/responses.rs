use serde::Serialize;

use super::entities::ComparisonRecord;

#[derive(Debug, Serialize)]
pub struct ReviewUpdateResponse {
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct ComparisonListResponse {
    pub items: Vec<ComparisonRecord>,
}

#[derive(Debug, Serialize)]
pub struct ComparisonDetailResponse {
    pub comparison: ComparisonRecord,
    pub reversed: bool,
    // 左侧学生在同一练习中的全部比对
    pub student_comparisons: Vec<ComparisonRecord>,
}

#[derive(Debug, Serialize)]
pub struct ClearComparisonsResponse {
    pub removed: u64,
}
