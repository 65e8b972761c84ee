use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 比对记录（读模型）
///
/// 由存储层把比对、两份提交、学生和练习拼接而成，是核心算法的唯一输入。
/// `submission_a` 为主提交，`submitted_at` 是它的创建时间。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRecord {
    pub id: i64,
    pub exercise_id: i64,
    pub exercise_key: String,
    pub exercise_name: String,
    pub submission_a: i64,
    pub submission_b: i64,
    pub student_a: String,
    pub student_b: String,
    pub similarity: f64,
    pub review: i32,
    pub submitted_at: DateTime<Utc>,
}

impl ComparisonRecord {
    /// 交换左右两侧，用于“反向”查看
    pub fn swapped(self) -> Self {
        Self {
            submission_a: self.submission_b,
            submission_b: self.submission_a,
            student_a: self.student_b,
            student_b: self.student_a,
            ..self
        }
    }

    /// 是否涉及指定学生
    pub fn involves(&self, student_key: &str) -> bool {
        self.student_a == student_key || self.student_b == student_key
    }

    pub fn to_ref(&self) -> ComparisonRef {
        ComparisonRef {
            id: self.id,
            exercise_key: self.exercise_key.clone(),
            student_a: self.student_a.clone(),
            student_b: self.student_b.clone(),
            similarity: self.similarity,
            review: self.review,
        }
    }
}

/// 嫌疑名单中引用的比对摘要
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRef {
    pub id: i64,
    pub exercise_key: String,
    pub student_a: String,
    pub student_b: String,
    pub similarity: f64,
    pub review: i32,
}
