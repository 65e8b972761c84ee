pub mod build;
pub mod builder;
pub mod invalidate;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::cache::GraphCache;
use crate::models::graph::requests::BuildGraphForm;
use crate::storage::Storage;

pub use builder::{build_match_graph, student_pair};

pub struct GraphService {
    storage: Option<Arc<dyn Storage>>,
    graph_cache: Option<Arc<GraphCache>>,
}

impl GraphService {
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

    pub async fn build_graph(
        &self,
        request: &HttpRequest,
        course_key: &str,
        form: BuildGraphForm,
    ) -> ActixResult<HttpResponse> {
        build::build_graph(self, request, course_key, form).await
    }

    pub async fn get_default_graph(
        &self,
        request: &HttpRequest,
        course_key: &str,
    ) -> ActixResult<HttpResponse> {
        build::get_default_graph(self, request, course_key).await
    }

    pub async fn invalidate_graph(
        &self,
        request: &HttpRequest,
        course_key: &str,
    ) -> ActixResult<HttpResponse> {
        invalidate::invalidate_graph(self, request, course_key).await
    }
}
