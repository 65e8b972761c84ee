use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::GraphService;
use crate::cache::GraphCache;
use crate::errors::Result;
use crate::models::ApiResponse;
use crate::services::courses::find_course;
use crate::storage::Storage;
use crate::utils::error_response;

/// 使课程的全部匹配图缓存失效
pub async fn invalidate_course_graph(
    storage: &dyn Storage,
    cache: &GraphCache,
    course_key: &str,
) -> Result<()> {
    let course = find_course(storage, course_key).await?;
    cache.invalidate(course.id);
    Ok(())
}

pub async fn invalidate_graph(
    service: &GraphService,
    request: &HttpRequest,
    course_key: &str,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let cache = service.get_graph_cache(request);

    match invalidate_course_graph(storage.as_ref(), cache.as_ref(), course_key).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::success_empty("匹配图缓存已失效"))),
        Err(e) => Ok(error_response(&e)),
    }
}
