//! 内存比对存储
//!
//! 与数据库实现行为一致，数据保存在进程内，重启即丢失。
//! 用于测试和 `memory://` 演示部署。

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{Storage, sort_by_similarity_desc, sort_by_submission_time};
use crate::errors::{RadarError, Result};
use crate::models::{
    comparisons::{entities::ComparisonRecord, requests::CreateComparisonRequest},
    courses::entities::{Course, Exercise},
};

pub const MEMORY_URL_SCHEME: &str = "memory://";

#[derive(Debug, Clone)]
struct StoredSubmission {
    exercise_id: i64,
    student_key: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct StoredComparison {
    id: i64,
    submission_a: i64,
    submission_b: i64,
    similarity: f64,
    review: i32,
}

#[derive(Debug, Default)]
struct MemoryState {
    courses: HashMap<i64, Course>,
    exercises: HashMap<i64, Exercise>,
    submissions: HashMap<i64, StoredSubmission>,
    comparisons: HashMap<i64, StoredComparison>,
    next_id: i64,
}

impl MemoryState {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn record(&self, cmp: &StoredComparison) -> Option<ComparisonRecord> {
        let sub_a = self.submissions.get(&cmp.submission_a)?;
        let sub_b = self.submissions.get(&cmp.submission_b)?;
        let exercise = self.exercises.get(&sub_a.exercise_id)?;

        Some(ComparisonRecord {
            id: cmp.id,
            exercise_id: exercise.id,
            exercise_key: exercise.key.clone(),
            exercise_name: exercise.name.clone(),
            submission_a: cmp.submission_a,
            submission_b: cmp.submission_b,
            student_a: sub_a.student_key.clone(),
            student_b: sub_b.student_key.clone(),
            similarity: cmp.similarity,
            review: cmp.review,
            submitted_at: sub_a.created_at,
        })
    }

    /// 按谓词筛选比对，结果按比对 ID 升序
    fn records_where<F>(&self, predicate: F) -> Vec<ComparisonRecord>
    where
        F: Fn(&ComparisonRecord) -> bool,
    {
        let mut records: Vec<ComparisonRecord> = self
            .comparisons
            .values()
            .filter_map(|c| self.record(c))
            .filter(|r| predicate(r))
            .collect();
        records.sort_by_key(|r| r.id);
        records
    }

    fn course_of_exercise(&self, exercise_id: i64) -> Option<i64> {
        self.exercises.get(&exercise_id).map(|e| e.course_id)
    }
}

/// 内存比对存储
pub struct MemoryStorage {
    state: RwLock<MemoryState>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(MemoryState::default()),
        }
    }

    /// 创建课程
    pub async fn insert_course(&self, key: &str, name: &str) -> Course {
        let mut state = self.state.write().await;
        let course = Course {
            id: state.next_id(),
            key: key.to_string(),
            name: name.to_string(),
            provider: None,
            created_at: Utc::now(),
        };
        state.courses.insert(course.id, course.clone());
        course
    }

    /// 创建练习
    pub async fn insert_exercise(&self, course_id: i64, key: &str, name: &str) -> Exercise {
        let mut state = self.state.write().await;
        let exercise = Exercise {
            id: state.next_id(),
            course_id,
            key: key.to_string(),
            name: name.to_string(),
            tokenizer: "skip".to_string(),
            minimum_match_tokens: 15,
            paused: false,
            created_at: Utc::now(),
        };
        state.exercises.insert(exercise.id, exercise.clone());
        exercise
    }

    /// 创建提交，返回提交 ID
    pub async fn insert_submission(
        &self,
        exercise_id: i64,
        student_key: &str,
        created_at: DateTime<Utc>,
    ) -> i64 {
        let mut state = self.state.write().await;
        let id = state.next_id();
        state.submissions.insert(
            id,
            StoredSubmission {
                exercise_id,
                student_key: student_key.to_string(),
                created_at,
            },
        );
        id
    }

    /// 直接写入带评分的比对，不做校验，用于准备测试数据
    pub async fn insert_comparison(
        &self,
        submission_a: i64,
        submission_b: i64,
        similarity: f64,
        review: i32,
    ) -> i64 {
        let mut state = self.state.write().await;
        let id = state.next_id();
        state.comparisons.insert(
            id,
            StoredComparison {
                id,
                submission_a,
                submission_b,
                similarity,
                review,
            },
        );
        id
    }

    /// 读取比对当前的审阅评分
    pub async fn review_of(&self, comparison_id: i64) -> Option<i32> {
        let state = self.state.read().await;
        state.comparisons.get(&comparison_id).map(|c| c.review)
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn list_courses(&self) -> Result<Vec<Course>> {
        let state = self.state.read().await;
        let mut courses: Vec<Course> = state.courses.values().cloned().collect();
        courses.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(courses)
    }

    async fn get_course_by_key(&self, course_key: &str) -> Result<Option<Course>> {
        let state = self.state.read().await;
        Ok(state
            .courses
            .values()
            .find(|c| c.key == course_key)
            .cloned())
    }

    async fn list_course_exercises(&self, course_id: i64) -> Result<Vec<Exercise>> {
        let state = self.state.read().await;
        let mut exercises: Vec<Exercise> = state
            .exercises
            .values()
            .filter(|e| e.course_id == course_id)
            .cloned()
            .collect();
        exercises.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(exercises)
    }

    async fn get_exercise_by_key(
        &self,
        course_id: i64,
        exercise_key: &str,
    ) -> Result<Option<Exercise>> {
        let state = self.state.read().await;
        Ok(state
            .exercises
            .values()
            .find(|e| e.course_id == course_id && e.key == exercise_key)
            .cloned())
    }

    async fn list_course_comparisons(
        &self,
        course_id: i64,
        min_similarity: f64,
    ) -> Result<Vec<ComparisonRecord>> {
        let state = self.state.read().await;
        Ok(state.records_where(|r| {
            state.course_of_exercise(r.exercise_id) == Some(course_id)
                && r.similarity >= min_similarity
        }))
    }

    async fn list_flagged_comparisons(
        &self,
        course_id: i64,
        cutoff: i32,
    ) -> Result<Vec<ComparisonRecord>> {
        let state = self.state.read().await;
        let mut records = state.records_where(|r| {
            state.course_of_exercise(r.exercise_id) == Some(course_id) && r.review >= cutoff
        });
        sort_by_submission_time(&mut records);
        Ok(records)
    }

    async fn list_exercise_comparisons(
        &self,
        exercise_id: i64,
        limit: u64,
    ) -> Result<Vec<ComparisonRecord>> {
        let state = self.state.read().await;
        let mut records = state.records_where(|r| r.exercise_id == exercise_id);
        sort_by_similarity_desc(&mut records);
        records.truncate(limit as usize);
        Ok(records)
    }

    async fn list_student_comparisons(
        &self,
        exercise_id: i64,
        student_key: &str,
    ) -> Result<Vec<ComparisonRecord>> {
        let state = self.state.read().await;
        let mut records =
            state.records_where(|r| r.exercise_id == exercise_id && r.involves(student_key));
        sort_by_similarity_desc(&mut records);
        Ok(records)
    }

    async fn get_comparison(
        &self,
        exercise_id: i64,
        comparison_id: i64,
    ) -> Result<Option<ComparisonRecord>> {
        let state = self.state.read().await;
        Ok(state
            .comparisons
            .get(&comparison_id)
            .and_then(|c| state.record(c))
            .filter(|r| r.exercise_id == exercise_id))
    }

    async fn update_comparison_review(&self, comparison_id: i64, review: i32) -> Result<bool> {
        let mut state = self.state.write().await;
        match state.comparisons.get_mut(&comparison_id) {
            Some(cmp) => {
                cmp.review = review;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn create_comparison(
        &self,
        exercise_id: i64,
        req: CreateComparisonRequest,
    ) -> Result<ComparisonRecord> {
        let mut state = self.state.write().await;
        for submission_id in [req.submission_a, req.submission_b] {
            match state.submissions.get(&submission_id) {
                Some(s) if s.exercise_id == exercise_id => {}
                _ => {
                    return Err(RadarError::not_found(format!(
                        "提交 {submission_id} 不属于该练习"
                    )));
                }
            }
        }

        let (low, high) = req.ordered_pair().ok_or_else(|| {
            RadarError::invalid_argument(format!("提交 {} 不能与自身比对", req.submission_a))
        })?;
        if let Some(existing) = state.comparisons.values().find(|c| {
            (c.submission_a.min(c.submission_b), c.submission_a.max(c.submission_b))
                == (low, high)
        }) {
            return Err(RadarError::conflict(format!(
                "提交 {} 与 {} 已存在比对 {}",
                req.submission_a, req.submission_b, existing.id
            )));
        }

        let id = state.next_id();
        let stored = StoredComparison {
            id,
            submission_a: low,
            submission_b: high,
            similarity: req.similarity,
            review: 0,
        };
        let record = state
            .record(&stored)
            .ok_or_else(|| RadarError::store_unavailable("新建比对无法关联到提交"))?;
        state.comparisons.insert(id, stored);
        Ok(record)
    }

    async fn clear_exercise_comparisons(&self, exercise_id: i64) -> Result<u64> {
        let mut state = self.state.write().await;
        let doomed: Vec<i64> = state
            .comparisons
            .values()
            .filter(|c| {
                state
                    .submissions
                    .get(&c.submission_a)
                    .is_some_and(|s| s.exercise_id == exercise_id)
            })
            .map(|c| c.id)
            .collect();
        for id in &doomed {
            state.comparisons.remove(id);
        }
        Ok(doomed.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    async fn seeded() -> (MemoryStorage, Course, Exercise, [i64; 3]) {
        let storage = MemoryStorage::new();
        let course = storage.insert_course("x", "Course X").await;
        let exercise = storage.insert_exercise(course.id, "e", "Exercise E").await;
        let t = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let a = storage.insert_submission(exercise.id, "A", t).await;
        let b = storage.insert_submission(exercise.id, "B", t).await;
        let c = storage.insert_submission(exercise.id, "C", t).await;
        (storage, course, exercise, [a, b, c])
    }

    #[tokio::test]
    async fn test_create_comparison_rejects_reversed_duplicate() {
        let (storage, _, exercise, [a, b, _]) = seeded().await;
        let req = CreateComparisonRequest {
            submission_a: a,
            submission_b: b,
            similarity: 0.5,
        };
        storage.create_comparison(exercise.id, req).await.unwrap();

        let reversed = CreateComparisonRequest {
            submission_a: b,
            submission_b: a,
            similarity: 0.6,
        };
        let err = storage
            .create_comparison(exercise.id, reversed)
            .await
            .unwrap_err();
        assert!(matches!(err, RadarError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_create_comparison_normalizes_pair() {
        let (storage, _, exercise, [a, b, _]) = seeded().await;
        let req = CreateComparisonRequest {
            submission_a: b,
            submission_b: a,
            similarity: 0.5,
        };
        let record = storage.create_comparison(exercise.id, req).await.unwrap();
        assert_eq!((record.submission_a, record.submission_b), (a, b));

        let same = CreateComparisonRequest {
            submission_a: a,
            submission_b: a,
            similarity: 1.0,
        };
        let err = storage.create_comparison(exercise.id, same).await.unwrap_err();
        assert!(matches!(err, RadarError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_create_comparison_rejects_foreign_submission() {
        let (storage, course, _, [a, _, _]) = seeded().await;
        let other = storage.insert_exercise(course.id, "f", "Exercise F").await;
        let foreign = storage
            .insert_submission(other.id, "D", Utc::now())
            .await;
        let req = CreateComparisonRequest {
            submission_a: a,
            submission_b: foreign,
            similarity: 0.5,
        };
        let err = storage.create_comparison(other.id, req).await.unwrap_err();
        assert!(matches!(err, RadarError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_clear_exercise_comparisons() {
        let (storage, course, exercise, [a, b, c]) = seeded().await;
        storage.insert_comparison(a, b, 0.9, 0).await;
        storage.insert_comparison(a, c, 0.4, 7).await;

        assert_eq!(storage.clear_exercise_comparisons(exercise.id).await.unwrap(), 2);
        assert!(
            storage
                .list_course_comparisons(course.id, 0.0)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_exercise_comparisons_ordered_by_similarity() {
        let (storage, _, exercise, [a, b, c]) = seeded().await;
        storage.insert_comparison(a, b, 0.9, 0).await;
        storage.insert_comparison(a, c, 0.4, 7).await;
        storage.insert_comparison(b, c, 0.95, 6).await;

        let top = storage
            .list_exercise_comparisons(exercise.id, 2)
            .await
            .unwrap();
        let sims: Vec<f64> = top.iter().map(|r| r.similarity).collect();
        assert_eq!(sims, vec![0.95, 0.9]);
    }
}
