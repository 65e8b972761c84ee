use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ComparisonService;
use crate::config::AppConfig;
use crate::errors::Result;
use crate::models::ApiResponse;
use crate::models::comparisons::entities::ComparisonRecord;
use crate::models::comparisons::requests::TopComparisonsQuery;
use crate::models::comparisons::responses::ComparisonListResponse;
use crate::services::courses::{find_course, find_exercise};
use crate::storage::Storage;
use crate::utils::error_response;

/// 单次请求最多返回的比对数量
const MAX_LIMIT: u64 = 1000;

/// 练习内相似度最高的比对
pub async fn top_comparisons(
    storage: &dyn Storage,
    course_key: &str,
    exercise_key: &str,
    limit: u64,
) -> Result<Vec<ComparisonRecord>> {
    let course = find_course(storage, course_key).await?;
    let exercise = find_exercise(storage, &course, exercise_key).await?;
    storage
        .list_exercise_comparisons(exercise.id, limit.clamp(1, MAX_LIMIT))
        .await
}

pub async fn list_top_comparisons(
    service: &ComparisonService,
    request: &HttpRequest,
    course_key: &str,
    exercise_key: &str,
    query: TopComparisonsQuery,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let limit = query
        .limit
        .unwrap_or(AppConfig::get().review.top_comparisons);

    match top_comparisons(storage.as_ref(), course_key, exercise_key, limit).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            ComparisonListResponse { items },
            "查询成功",
        ))),
        Err(e) => Ok(error_response(&e)),
    }
}
