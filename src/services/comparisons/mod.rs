pub mod detail;
pub mod ingest;
pub mod list;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::cache::GraphCache;
use crate::models::comparisons::requests::{
    ComparisonDetailQuery, CreateComparisonRequest, TopComparisonsQuery,
};
use crate::storage::Storage;

pub struct ComparisonService {
    storage: Option<Arc<dyn Storage>>,
    graph_cache: Option<Arc<GraphCache>>,
}

impl ComparisonService {
    pub fn new_lazy() -> Self {
        Self {
            storage: None,
            graph_cache: None,
        }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        if let Some(storage) = &self.storage {
            storage.clone()
        } else {
            request
                .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
                .expect("Storage not found in app data")
                .get_ref()
                .clone()
        }
    }

    pub(crate) fn get_graph_cache(&self, request: &HttpRequest) -> Arc<GraphCache> {
        if let Some(cache) = &self.graph_cache {
            cache.clone()
        } else {
            request
                .app_data::<actix_web::web::Data<Arc<GraphCache>>>()
                .expect("GraphCache not found in app data")
                .get_ref()
                .clone()
        }
    }

    pub async fn list_top_comparisons(
        &self,
        request: &HttpRequest,
        course_key: &str,
        exercise_key: &str,
        query: TopComparisonsQuery,
    ) -> ActixResult<HttpResponse> {
        list::list_top_comparisons(self, request, course_key, exercise_key, query).await
    }

    pub async fn get_comparison(
        &self,
        request: &HttpRequest,
        course_key: &str,
        exercise_key: &str,
        comparison_id: i64,
        query: ComparisonDetailQuery,
    ) -> ActixResult<HttpResponse> {
        detail::get_comparison(self, request, course_key, exercise_key, comparison_id, query).await
    }

    pub async fn create_comparison(
        &self,
        request: &HttpRequest,
        course_key: &str,
        exercise_key: &str,
        req: CreateComparisonRequest,
    ) -> ActixResult<HttpResponse> {
        ingest::create_comparison(self, request, course_key, exercise_key, req).await
    }

    pub async fn clear_comparisons(
        &self,
        request: &HttpRequest,
        course_key: &str,
        exercise_key: &str,
    ) -> ActixResult<HttpResponse> {
        ingest::clear_comparisons(self, request, course_key, exercise_key).await
    }
}
