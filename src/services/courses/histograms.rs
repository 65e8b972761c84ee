//! 课程相似度分布
//!
//! 按练习统计比对相似度落在各区间的数量，区间均分 `[0, 1]`，大于 1 的相似度计入最后一个区间。

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::collections::HashMap;

use super::{CourseService, find_course};
use crate::errors::{RadarError, Result};
use crate::models::ApiResponse;
use crate::models::courses::requests::HistogramQuery;
use crate::models::courses::responses::{
    CourseHistogramResponse, ExerciseHistogram, SimilarityRange,
};
use crate::models::graph::threshold::THRESHOLD_SCALE;
use crate::storage::Storage;
use crate::utils::error_response;

pub const DEFAULT_BUCKETS: u32 = 10;
pub const MAX_BUCKETS: u32 = 100;

fn validate_buckets(buckets: Option<u32>) -> Result<u32> {
    match buckets.unwrap_or(DEFAULT_BUCKETS) {
        n @ 1..=MAX_BUCKETS => Ok(n),
        n => Err(RadarError::invalid_argument(format!(
            "buckets must be between 1 and {MAX_BUCKETS}, got {n}"
        ))),
    }
}

/// 统计一组相似度的区间分布
pub fn similarity_distribution(
    similarities: impl IntoIterator<Item = f64>,
    buckets: u32,
) -> Vec<SimilarityRange> {
    let n = i64::from(buckets);
    let mut counts = vec![0u64; buckets as usize];

    for similarity in similarities {
        // 先换算到阈值精度，避免 0.29 * 100 落到 28 号区间
        let scaled = (similarity * THRESHOLD_SCALE as f64).round() as i64;
        let index = (scaled * n / THRESHOLD_SCALE).clamp(0, n - 1);
        counts[index as usize] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| {
            let min = i as f64 / buckets as f64;
            let max = (i + 1) as f64 / buckets as f64;
            SimilarityRange {
                range: format!("{min:.2}-{max:.2}"),
                min,
                max,
                count,
            }
        })
        .collect()
}

pub async fn course_histograms(
    storage: &dyn Storage,
    course_key: &str,
    buckets: Option<u32>,
) -> Result<CourseHistogramResponse> {
    let course = find_course(storage, course_key).await?;
    let buckets = validate_buckets(buckets)?;

    let exercises = storage.list_course_exercises(course.id).await?;
    let records = storage.list_course_comparisons(course.id, 0.0).await?;

    let mut by_exercise: HashMap<i64, Vec<f64>> = HashMap::new();
    for record in &records {
        by_exercise
            .entry(record.exercise_id)
            .or_default()
            .push(record.similarity);
    }

    let exercises = exercises
        .into_iter()
        .map(|exercise| {
            let similarities = by_exercise.remove(&exercise.id).unwrap_or_default();
            ExerciseHistogram {
                total: similarities.len() as u64,
                distribution: similarity_distribution(similarities, buckets),
                exercise_key: exercise.key,
                exercise_name: exercise.name,
            }
        })
        .collect();

    Ok(CourseHistogramResponse {
        course_key: course.key,
        exercises,
    })
}

pub async fn get_histograms(
    service: &CourseService,
    request: &HttpRequest,
    course_key: &str,
    query: HistogramQuery,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match course_histograms(storage.as_ref(), course_key, query.buckets).await {
        Ok(histograms) => Ok(HttpResponse::Ok().json(ApiResponse::success(histograms, "查询成功"))),
        Err(e) => Ok(error_response(&e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryStorage;
    use chrono::{TimeZone, Utc};

    fn counts(ranges: &[SimilarityRange]) -> Vec<u64> {
        ranges.iter().map(|r| r.count).collect()
    }

    #[test]
    fn test_distribution_edges() {
        let ranges = similarity_distribution([0.0, 0.1, 0.29, 0.5, 0.99, 1.0, 1.7], 10);
        assert_eq!(counts(&ranges), vec![1, 1, 1, 0, 0, 1, 0, 0, 0, 3]);
        assert_eq!(ranges[0].range, "0.00-0.10");
        assert_eq!(ranges[9].max, 1.0);

        let fine = similarity_distribution([0.29], 100);
        assert_eq!(fine[29].count, 1);
    }

    #[test]
    fn test_bucket_count_is_validated() {
        assert_eq!(validate_buckets(None).unwrap(), DEFAULT_BUCKETS);
        assert_eq!(validate_buckets(Some(4)).unwrap(), 4);
        assert!(validate_buckets(Some(0)).is_err());
        assert!(validate_buckets(Some(MAX_BUCKETS + 1)).is_err());
    }

    #[tokio::test]
    async fn test_course_histograms_per_exercise() {
        let storage = MemoryStorage::new();
        let course = storage.insert_course("X", "Course X").await;
        let e1 = storage.insert_exercise(course.id, "e1", "Exercise 1").await;
        let e2 = storage.insert_exercise(course.id, "e2", "Exercise 2").await;
        storage.insert_exercise(course.id, "e3", "Exercise 3").await;
        let t = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let a1 = storage.insert_submission(e1.id, "A", t).await;
        let b1 = storage.insert_submission(e1.id, "B", t).await;
        let c1 = storage.insert_submission(e1.id, "C", t).await;
        let a2 = storage.insert_submission(e2.id, "A", t).await;
        let c2 = storage.insert_submission(e2.id, "C", t).await;
        storage.insert_comparison(a1, b1, 0.9, 0).await;
        storage.insert_comparison(b1, c1, 0.6, 0).await;
        storage.insert_comparison(a2, c2, 0.4, 0).await;

        let histograms = course_histograms(&storage, "X", Some(5)).await.unwrap();
        assert_eq!(histograms.course_key, "X");
        let keys: Vec<&str> = histograms
            .exercises
            .iter()
            .map(|e| e.exercise_key.as_str())
            .collect();
        assert_eq!(keys, vec!["e1", "e2", "e3"]);
        assert_eq!(histograms.exercises[0].total, 2);
        assert_eq!(counts(&histograms.exercises[0].distribution), vec![0, 0, 0, 1, 1]);
        assert_eq!(counts(&histograms.exercises[1].distribution), vec![0, 0, 1, 0, 0]);
        assert_eq!(histograms.exercises[2].total, 0);
    }

    #[tokio::test]
    async fn test_unknown_course_wins_over_bad_buckets() {
        let storage = MemoryStorage::new();
        storage.insert_course("X", "Course X").await;

        let err = course_histograms(&storage, "nope", Some(0)).await.unwrap_err();
        assert!(matches!(err, RadarError::NotFound(_)));
        let err = course_histograms(&storage, "X", Some(0)).await.unwrap_err();
        assert!(matches!(err, RadarError::InvalidArgument(_)));
    }
}
