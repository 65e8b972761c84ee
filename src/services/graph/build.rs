use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;
use tracing::debug;

use super::GraphService;
use super::builder::build_match_graph;
use crate::cache::GraphCache;
use crate::config::AppConfig;
use crate::errors::{RadarError, Result};
use crate::models::courses::entities::Course;
use crate::models::graph::entities::MatchGraph;
use crate::models::graph::requests::BuildGraphForm;
use crate::models::graph::threshold::SimilarityThreshold;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::courses::find_course;
use crate::storage::Storage;
use crate::utils::error_response::{error_response, error_response_with_code};

pub const MISSING_THRESHOLD_MESSAGE: &str =
    "Graph build arguments must contain 'minSimilarity' in the body of a POST request.";

/// 解析表单中的阈值，缺失或非法时返回 InvalidArgument
pub fn parse_threshold(raw: Option<&str>) -> Result<SimilarityThreshold> {
    match raw {
        Some(raw) => SimilarityThreshold::parse(raw),
        None => Err(RadarError::invalid_argument(MISSING_THRESHOLD_MESSAGE)),
    }
}

/// 从缓存获取课程匹配图，未命中时读取比对并构建
pub async fn course_graph(
    storage: &Arc<dyn Storage>,
    cache: &GraphCache,
    course: &Course,
    threshold: SimilarityThreshold,
) -> Result<Arc<MatchGraph>> {
    let storage = storage.clone();
    let course_id = course.id;
    let course_key = course.key.clone();

    cache
        .get_or_build(course_id, threshold, move || async move {
            let records = storage
                .list_course_comparisons(course_id, threshold.value())
                .await?;
            debug!(
                "Building graph of course {} from {} comparisons at threshold {}",
                course_key,
                records.len(),
                threshold
            );
            Ok(build_match_graph(&course_key, threshold, &records))
        })
        .await
}

/// 构建匹配图
///
/// 先确认课程存在，再校验阈值：未知课程总是 404。
pub async fn build_course_graph(
    storage: &Arc<dyn Storage>,
    cache: &GraphCache,
    course_key: &str,
    raw_threshold: Option<&str>,
) -> Result<Arc<MatchGraph>> {
    let course = find_course(storage.as_ref(), course_key).await?;
    let threshold = parse_threshold(raw_threshold)?;
    course_graph(storage, cache, &course, threshold).await
}

fn graph_error_response(err: &RadarError) -> HttpResponse {
    match err {
        RadarError::InvalidArgument(_) => error_response_with_code(err, ErrorCode::InvalidThreshold),
        _ => error_response(err),
    }
}

pub async fn build_graph(
    service: &GraphService,
    request: &HttpRequest,
    course_key: &str,
    form: BuildGraphForm,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let cache = service.get_graph_cache(request);

    match build_course_graph(
        &storage,
        cache.as_ref(),
        course_key,
        form.min_similarity.as_deref(),
    )
    .await
    {
        Ok(graph) => Ok(HttpResponse::Ok().json(ApiResponse::success(graph, "构建成功"))),
        Err(e) => Ok(graph_error_response(&e)),
    }
}

/// 使用配置中的默认阈值获取匹配图
pub async fn get_default_graph(
    service: &GraphService,
    request: &HttpRequest,
    course_key: &str,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let cache = service.get_graph_cache(request);

    let result = async {
        let course = find_course(storage.as_ref(), course_key).await?;
        let threshold =
            SimilarityThreshold::from_f64(AppConfig::get().graph.default_min_similarity)?;
        course_graph(&storage, cache.as_ref(), &course, threshold).await
    }
    .await;

    match result {
        Ok(graph) => Ok(HttpResponse::Ok().json(ApiResponse::success(graph, "查询成功"))),
        Err(e) => Ok(graph_error_response(&e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryStorage;
    use chrono::{TimeZone, Utc};
    use std::time::Duration;

    async fn seeded() -> Arc<MemoryStorage> {
        let storage = Arc::new(MemoryStorage::new());
        let course = storage.insert_course("X", "Course X").await;
        let e1 = storage.insert_exercise(course.id, "e1", "Exercise 1").await;
        let e2 = storage.insert_exercise(course.id, "e2", "Exercise 2").await;
        let t = |s: i64| Utc.timestamp_opt(1_700_000_000 + s, 0).unwrap();

        let a1 = storage.insert_submission(e1.id, "A", t(1)).await;
        let b1 = storage.insert_submission(e1.id, "B", t(2)).await;
        let c1 = storage.insert_submission(e1.id, "C", t(3)).await;
        let a2 = storage.insert_submission(e2.id, "A", t(4)).await;
        let c2 = storage.insert_submission(e2.id, "C", t(5)).await;

        storage.insert_comparison(a1, b1, 0.9, 0).await;
        storage.insert_comparison(b1, c1, 0.6, 0).await;
        storage.insert_comparison(a2, c2, 0.4, 0).await;
        storage
    }

    fn cache() -> GraphCache {
        GraphCache::new(100, Duration::from_secs(5))
    }

    #[test]
    fn test_parse_threshold_missing() {
        let err = parse_threshold(None).unwrap_err();
        assert_eq!(err, RadarError::invalid_argument(MISSING_THRESHOLD_MESSAGE));
    }

    #[tokio::test]
    async fn test_build_course_graph() {
        let storage: Arc<dyn Storage> = seeded().await;
        let cache = cache();

        let graph = build_course_graph(&storage, &cache, "X", Some("0.5"))
            .await
            .unwrap();
        assert_eq!(graph.nodes, vec!["A", "B", "C"]);
        assert_eq!(graph.edges.len(), 2);
        assert!(graph.edge("A", "C").is_none());
    }

    #[tokio::test]
    async fn test_unknown_course_wins_over_bad_threshold() {
        let storage: Arc<dyn Storage> = seeded().await;
        let cache = cache();

        let err = build_course_graph(&storage, &cache, "nope", Some("abc"))
            .await
            .unwrap_err();
        assert!(matches!(err, RadarError::NotFound(_)));

        let err = build_course_graph(&storage, &cache, "X", Some("abc"))
            .await
            .unwrap_err();
        assert!(matches!(err, RadarError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_cached_graph_survives_new_comparison_until_invalidated() {
        let memory = seeded().await;
        let storage: Arc<dyn Storage> = memory.clone();
        let cache = cache();

        let before = build_course_graph(&storage, &cache, "X", Some("0.5"))
            .await
            .unwrap();

        let course = storage.get_course_by_key("X").await.unwrap().unwrap();
        let e2 = storage
            .get_exercise_by_key(course.id, "e2")
            .await
            .unwrap()
            .unwrap();
        let d = memory
            .insert_submission(e2.id, "D", Utc.timestamp_opt(1_700_000_100, 0).unwrap())
            .await;
        let a = memory
            .insert_submission(e2.id, "A", Utc.timestamp_opt(1_700_000_101, 0).unwrap())
            .await;
        memory.insert_comparison(a, d, 0.95, 0).await;

        let cached = build_course_graph(&storage, &cache, "X", Some("0.50"))
            .await
            .unwrap();
        assert_eq!(before, cached);

        cache.invalidate(course.id);
        let rebuilt = build_course_graph(&storage, &cache, "X", Some("0.5"))
            .await
            .unwrap();
        assert_eq!(rebuilt.nodes, vec!["A", "B", "C", "D"]);
    }
}
