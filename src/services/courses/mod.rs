pub mod detail;
pub mod histograms;
pub mod list;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::errors::{RadarError, Result};
use crate::models::courses::entities::{Course, Exercise};
use crate::models::courses::requests::HistogramQuery;
use crate::storage::Storage;
use crate::utils::validate_key;

pub struct CourseService {
    storage: Option<Arc<dyn Storage>>,
}

impl CourseService {
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

    pub async fn list_courses(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        list::list_courses(self, request).await
    }

    pub async fn get_course(
        &self,
        request: &HttpRequest,
        course_key: &str,
    ) -> ActixResult<HttpResponse> {
        detail::get_course(self, request, course_key).await
    }

    pub async fn get_histograms(
        &self,
        request: &HttpRequest,
        course_key: &str,
        query: HistogramQuery,
    ) -> ActixResult<HttpResponse> {
        histograms::get_histograms(self, request, course_key, query).await
    }
}

/// 通过标识查找课程，不存在时返回 NotFound
pub async fn find_course(storage: &dyn Storage, course_key: &str) -> Result<Course> {
    // 非法标识不可能存在，直接视为不存在
    if validate_key(course_key).is_err() {
        return Err(RadarError::not_found(format!("课程 '{course_key}' 不存在")));
    }
    storage
        .get_course_by_key(course_key)
        .await?
        .ok_or_else(|| RadarError::not_found(format!("课程 '{course_key}' 不存在")))
}

/// 在课程内通过标识查找练习
pub async fn find_exercise(
    storage: &dyn Storage,
    course: &Course,
    exercise_key: &str,
) -> Result<Exercise> {
    if validate_key(exercise_key).is_err() {
        return Err(RadarError::not_found(format!(
            "练习 '{exercise_key}' 不存在"
        )));
    }
    storage
        .get_exercise_by_key(course.id, exercise_key)
        .await?
        .ok_or_else(|| {
            RadarError::not_found(format!(
                "课程 '{}' 中不存在练习 '{exercise_key}'",
                course.key
            ))
        })
}
