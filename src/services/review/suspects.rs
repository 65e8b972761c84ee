//! 嫌疑名单
//!
//! 每次请求都从已标记的比对重新计算，不做缓存。

use std::collections::HashMap;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ReviewService;
use super::state::ReviewScale;
use crate::errors::{RadarError, Result};
use crate::models::comparisons::entities::ComparisonRecord;
use crate::models::suspects::entities::SuspectEntry;
use crate::models::suspects::requests::SuspectQuery;
use crate::models::suspects::responses::SuspectListResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::courses::find_course;
use crate::storage::{Storage, sort_by_submission_time};
use crate::utils::error_response::{error_response, error_response_with_code};

/// 汇总已标记比对的审阅评分
///
/// 比对按主提交创建时间、比对 ID 的顺序处理，两侧学生都计入该比对的评分；
/// 同一学生的两份提交之间的比对只计一次。结果按总分降序、学生标识升序排列。
pub fn aggregate_suspects(records: &[ComparisonRecord], cutoff: i32) -> Vec<SuspectEntry> {
    let mut flagged: Vec<ComparisonRecord> = records
        .iter()
        .filter(|r| r.review >= cutoff)
        .cloned()
        .collect();
    sort_by_submission_time(&mut flagged);

    let mut index: HashMap<String, usize> = HashMap::new();
    let mut entries: Vec<SuspectEntry> = Vec::new();

    for record in &flagged {
        // 同一学生的两份提交之间的比对只计一次
        let other = (record.student_b != record.student_a).then_some(&record.student_b);

        for student in std::iter::once(&record.student_a).chain(other) {
            let slot = *index.entry(student.clone()).or_insert_with(|| {
                entries.push(SuspectEntry {
                    student_key: student.clone(),
                    total_score: 0,
                    comparisons: Vec::new(),
                });
                entries.len() - 1
            });
            let entry = &mut entries[slot];
            entry.total_score += i64::from(record.review);
            entry.comparisons.push(record.to_ref());
        }
    }

    entries.sort_by(|a, b| {
        b.total_score
            .cmp(&a.total_score)
            .then_with(|| a.student_key.cmp(&b.student_key))
    });
    entries
}

/// 课程的嫌疑名单，cutoff 缺省时取配置值
pub async fn course_suspects(
    storage: &dyn Storage,
    scale: &ReviewScale,
    course_key: &str,
    cutoff: Option<i32>,
) -> Result<(i32, Vec<SuspectEntry>)> {
    let course = find_course(storage, course_key).await?;
    let cutoff = scale.validate_cutoff(cutoff.unwrap_or(scale.flagged_cutoff))?;
    let records = storage.list_flagged_comparisons(course.id, cutoff).await?;
    Ok((cutoff, aggregate_suspects(&records, cutoff)))
}

pub async fn list_suspects(
    service: &ReviewService,
    request: &HttpRequest,
    course_key: &str,
    query: SuspectQuery,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let scale = match service.get_scale() {
        Ok(scale) => scale,
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("审阅评分配置无效: {e}"),
                )),
            );
        }
    };

    match course_suspects(storage.as_ref(), &scale, course_key, query.cutoff).await {
        Ok((cutoff, items)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            SuspectListResponse { cutoff, items },
            "查询成功",
        ))),
        Err(e @ RadarError::InvalidArgument(_)) => {
            Ok(error_response_with_code(&e, ErrorCode::InvalidCutoff))
        }
        Err(e) => Ok(error_response(&e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record(
        id: i64,
        exercise: &str,
        a: &str,
        b: &str,
        review: i32,
        submitted: i64,
    ) -> ComparisonRecord {
        ComparisonRecord {
            id,
            exercise_id: 1,
            exercise_key: exercise.to_string(),
            exercise_name: exercise.to_string(),
            submission_a: id * 10,
            submission_b: id * 10 + 1,
            student_a: a.to_string(),
            student_b: b.to_string(),
            similarity: 0.5,
            review,
            submitted_at: Utc.timestamp_opt(1_700_000_000 + submitted, 0).unwrap(),
        }
    }

    fn summary(entries: &[SuspectEntry]) -> Vec<(&str, i64)> {
        entries
            .iter()
            .map(|e| (e.student_key.as_str(), e.total_score))
            .collect()
    }

    #[test]
    fn test_course_x_scenario() {
        let records = vec![
            record(1, "E", "A", "B", 0, 1),
            record(2, "E", "A", "C", 7, 2),
            record(3, "E", "B", "C", 6, 3),
        ];
        let suspects = aggregate_suspects(&records, 5);
        assert_eq!(summary(&suspects), vec![("C", 13), ("A", 7), ("B", 6)]);

        let c = &suspects[0];
        let ids: Vec<i64> = c.comparisons.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn test_cutoff_is_inclusive() {
        let records = vec![record(1, "E", "A", "B", 5, 1), record(2, "E", "C", "D", 4, 2)];
        let suspects = aggregate_suspects(&records, 5);
        assert_eq!(summary(&suspects), vec![("A", 5), ("B", 5)]);
    }

    #[test]
    fn test_ties_break_on_student_key() {
        let records = vec![
            record(1, "E", "zed", "amy", 6, 1),
            record(2, "E", "kim", "bob", 6, 2),
        ];
        let suspects = aggregate_suspects(&records, 5);
        assert_eq!(
            summary(&suspects),
            vec![("amy", 6), ("bob", 6), ("kim", 6), ("zed", 6)]
        );
    }

    #[test]
    fn test_aggregates_across_exercises() {
        let records = vec![
            record(1, "e1", "A", "B", 6, 1),
            record(2, "e2", "A", "C", 8, 2),
        ];
        let suspects = aggregate_suspects(&records, 5);
        assert_eq!(summary(&suspects), vec![("A", 14), ("C", 8), ("B", 6)]);
        let exercises: Vec<&str> = suspects[0]
            .comparisons
            .iter()
            .map(|r| r.exercise_key.as_str())
            .collect();
        assert_eq!(exercises, vec!["e1", "e2"]);
    }

    #[test]
    fn test_comparisons_follow_submission_time() {
        let records = vec![
            record(9, "E", "A", "B", 6, 30),
            record(4, "E", "A", "C", 7, 10),
            record(5, "E", "A", "D", 8, 10),
        ];
        let suspects = aggregate_suspects(&records, 5);
        let ids: Vec<i64> = suspects[0].comparisons.iter().map(|r| r.id).collect();
        assert_eq!(suspects[0].student_key, "A");
        assert_eq!(ids, vec![4, 5, 9]);
    }

    #[test]
    fn test_same_student_pair_counts_once() {
        let records = vec![record(1, "E", "A", "A", 9, 1)];
        let suspects = aggregate_suspects(&records, 5);
        assert_eq!(summary(&suspects), vec![("A", 9)]);
        assert_eq!(suspects[0].comparisons.len(), 1);
    }

    #[test]
    fn test_nothing_flagged() {
        let records = vec![record(1, "E", "A", "B", 0, 1)];
        assert!(aggregate_suspects(&records, 5).is_empty());
        assert!(aggregate_suspects(&[], 5).is_empty());
    }

    #[test]
    fn test_output_sorted_for_generated_inputs() {
        let students = ["a", "b", "c", "d", "e"];
        let mut records = Vec::new();
        let mut id = 0;
        for (i, x) in students.iter().enumerate() {
            for y in students.iter().skip(i + 1) {
                id += 1;
                records.push(record(id, "E", x, y, ((id * 7) % 11) as i32, id % 4));
            }
        }
        for cutoff in 1..=10 {
            let suspects = aggregate_suspects(&records, cutoff);
            for pair in suspects.windows(2) {
                assert!(
                    pair[0].total_score > pair[1].total_score
                        || (pair[0].total_score == pair[1].total_score
                            && pair[0].student_key < pair[1].student_key)
                );
            }
        }
    }
}
