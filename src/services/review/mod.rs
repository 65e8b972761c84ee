pub mod state;
pub mod suspects;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::config::AppConfig;
use crate::errors::Result;
use crate::models::comparisons::requests::UpdateReviewRequest;
use crate::models::suspects::requests::SuspectQuery;
use crate::storage::Storage;

pub use state::{ReviewScale, ReviewTransition};

pub struct ReviewService {
    storage: Option<Arc<dyn Storage>>,
}

impl ReviewService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
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

    pub(crate) fn get_scale(&self) -> Result<ReviewScale> {
        ReviewScale::from_config(&AppConfig::get().review)
    }

    pub async fn update_review(
        &self,
        request: &HttpRequest,
        course_key: &str,
        exercise_key: &str,
        comparison_id: i64,
        req: UpdateReviewRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_review(self, request, course_key, exercise_key, comparison_id, req).await
    }

    pub async fn list_suspects(
        &self,
        request: &HttpRequest,
        course_key: &str,
        query: SuspectQuery,
    ) -> ActixResult<HttpResponse> {
        suspects::list_suspects(self, request, course_key, query).await
    }
}
