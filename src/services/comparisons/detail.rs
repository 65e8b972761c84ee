use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ComparisonService;
use crate::errors::{RadarError, Result};
use crate::models::ApiResponse;
use crate::models::comparisons::requests::ComparisonDetailQuery;
use crate::models::comparisons::responses::ComparisonDetailResponse;
use crate::services::courses::{find_course, find_exercise};
use crate::storage::Storage;
use crate::utils::error_response;

/// 比对详情
///
/// `reverse` 为 true 时交换左右两侧；附带左侧学生在同一练习中的全部比对。
pub async fn comparison_detail(
    storage: &dyn Storage,
    course_key: &str,
    exercise_key: &str,
    comparison_id: i64,
    reverse: bool,
) -> Result<ComparisonDetailResponse> {
    let course = find_course(storage, course_key).await?;
    let exercise = find_exercise(storage, &course, exercise_key).await?;
    let comparison = storage
        .get_comparison(exercise.id, comparison_id)
        .await?
        .ok_or_else(|| RadarError::not_found(format!("比对 {comparison_id} 不存在")))?;

    let comparison = if reverse {
        comparison.swapped()
    } else {
        comparison
    };
    let student_comparisons = storage
        .list_student_comparisons(exercise.id, &comparison.student_a)
        .await?;

    Ok(ComparisonDetailResponse {
        comparison,
        reversed: reverse,
        student_comparisons,
    })
}

pub async fn get_comparison(
    service: &ComparisonService,
    request: &HttpRequest,
    course_key: &str,
    exercise_key: &str,
    comparison_id: i64,
    query: ComparisonDetailQuery,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match comparison_detail(
        storage.as_ref(),
        course_key,
        exercise_key,
        comparison_id,
        query.is_reversed(),
    )
    .await
    {
        Ok(detail) => Ok(HttpResponse::Ok().json(ApiResponse::success(detail, "查询成功"))),
        Err(e) => Ok(error_response(&e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryStorage;
    use chrono::{TimeZone, Utc};

    #[tokio::test]
    async fn test_reverse_swaps_sides_and_follows_left_student() {
        let storage = MemoryStorage::new();
        let course = storage.insert_course("X", "Course X").await;
        let e = storage.insert_exercise(course.id, "E", "Exercise").await;
        let t = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let a = storage.insert_submission(e.id, "A", t).await;
        let b = storage.insert_submission(e.id, "B", t).await;
        let c = storage.insert_submission(e.id, "C", t).await;
        let ab = storage.insert_comparison(a, b, 0.9, 0).await;
        let bc = storage.insert_comparison(b, c, 0.7, 0).await;

        let plain = comparison_detail(&storage, "X", "E", ab, false)
            .await
            .unwrap();
        assert_eq!(plain.comparison.student_a, "A");
        assert_eq!(plain.student_comparisons.len(), 1);

        let reversed = comparison_detail(&storage, "X", "E", ab, true).await.unwrap();
        assert!(reversed.reversed);
        assert_eq!(reversed.comparison.student_a, "B");
        assert_eq!(reversed.comparison.submission_a, b);
        let ids: Vec<i64> = reversed.student_comparisons.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![ab, bc]);
    }

    #[tokio::test]
    async fn test_comparison_of_other_exercise_is_not_found() {
        let storage = MemoryStorage::new();
        let course = storage.insert_course("X", "Course X").await;
        let e1 = storage.insert_exercise(course.id, "e1", "One").await;
        storage.insert_exercise(course.id, "e2", "Two").await;
        let t = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let a = storage.insert_submission(e1.id, "A", t).await;
        let b = storage.insert_submission(e1.id, "B", t).await;
        let id = storage.insert_comparison(a, b, 0.9, 0).await;

        let err = comparison_detail(&storage, "X", "e2", id, false)
            .await
            .unwrap_err();
        assert!(matches!(err, RadarError::NotFound(_)));
    }
}
