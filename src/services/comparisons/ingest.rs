//! 比对写入
//!
//! 相似度引擎在完成比对后调用这里写入结果；重新比对前清空旧结果。
//! 两种写入都会使课程的匹配图缓存失效。

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::ComparisonService;
use crate::cache::GraphCache;
use crate::errors::{RadarError, Result};
use crate::models::comparisons::entities::ComparisonRecord;
use crate::models::comparisons::requests::CreateComparisonRequest;
use crate::models::comparisons::responses::ClearComparisonsResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::courses::{find_course, find_exercise};
use crate::storage::Storage;
use crate::utils::error_response::{error_response, error_response_with_code};

/// 写入一条比对并使课程的匹配图失效
pub async fn ingest_comparison(
    storage: &dyn Storage,
    cache: &GraphCache,
    course_key: &str,
    exercise_key: &str,
    req: CreateComparisonRequest,
) -> Result<ComparisonRecord> {
    let course = find_course(storage, course_key).await?;
    let exercise = find_exercise(storage, &course, exercise_key).await?;

    if !req.similarity.is_finite() || req.similarity < 0.0 {
        return Err(RadarError::invalid_argument(format!(
            "similarity must be a non-negative number, got {}",
            req.similarity
        )));
    }
    if req.ordered_pair().is_none() {
        return Err(RadarError::invalid_argument(format!(
            "submission {} cannot be compared with itself",
            req.submission_a
        )));
    }

    let record = storage.create_comparison(exercise.id, req).await?;
    cache.invalidate(course.id);
    Ok(record)
}

/// 清空练习的全部比对并使课程的匹配图失效
pub async fn clear_exercise(
    storage: &dyn Storage,
    cache: &GraphCache,
    course_key: &str,
    exercise_key: &str,
) -> Result<u64> {
    let course = find_course(storage, course_key).await?;
    let exercise = find_exercise(storage, &course, exercise_key).await?;

    let removed = storage.clear_exercise_comparisons(exercise.id).await?;
    cache.invalidate(course.id);
    info!(
        "Cleared {} comparisons of {}/{}",
        removed, course.key, exercise.key
    );
    Ok(removed)
}

pub async fn create_comparison(
    service: &ComparisonService,
    request: &HttpRequest,
    course_key: &str,
    exercise_key: &str,
    req: CreateComparisonRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let cache = service.get_graph_cache(request);

    match ingest_comparison(storage.as_ref(), cache.as_ref(), course_key, exercise_key, req).await
    {
        Ok(record) => Ok(HttpResponse::Created().json(ApiResponse::success(record, "比对已写入"))),
        Err(e @ RadarError::InvalidArgument(_)) => {
            Ok(error_response_with_code(&e, ErrorCode::InvalidSimilarity))
        }
        Err(e) => Ok(error_response(&e)),
    }
}

pub async fn clear_comparisons(
    service: &ComparisonService,
    request: &HttpRequest,
    course_key: &str,
    exercise_key: &str,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let cache = service.get_graph_cache(request);

    match clear_exercise(storage.as_ref(), cache.as_ref(), course_key, exercise_key).await {
        Ok(removed) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            ClearComparisonsResponse { removed },
            "比对已清空",
        ))),
        Err(e) => Ok(error_response(&e)),
    }
}
