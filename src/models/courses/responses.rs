use serde::Serialize;

use super::entities::{Course, Exercise};

#[derive(Debug, Serialize)]
pub struct CourseListResponse {
    pub items: Vec<Course>,
}

#[derive(Debug, Serialize)]
pub struct CourseDetailResponse {
    pub course: Course,
    pub exercises: Vec<Exercise>,
}

/// 相似度区间 `[min, max)`，最后一个区间包含上界
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarityRange {
    pub range: String,
    pub min: f64,
    pub max: f64,
    pub count: u64,
}

#[derive(Debug, Serialize)]
pub struct ExerciseHistogram {
    pub exercise_key: String,
    pub exercise_name: String,
    pub total: u64,
    pub distribution: Vec<SimilarityRange>,
}

#[derive(Debug, Serialize)]
pub struct CourseHistogramResponse {
    pub course_key: String,
    pub exercises: Vec<ExerciseHistogram>,
}
