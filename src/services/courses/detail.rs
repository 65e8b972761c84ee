use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{CourseService, find_course};
use crate::models::ApiResponse;
use crate::models::courses::responses::CourseDetailResponse;
use crate::utils::error_response;

pub async fn get_course(
    service: &CourseService,
    request: &HttpRequest,
    course_key: &str,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let course = match find_course(storage.as_ref(), course_key).await {
        Ok(course) => course,
        Err(e) => return Ok(error_response(&e)),
    };

    match storage.list_course_exercises(course.id).await {
        Ok(exercises) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            CourseDetailResponse { course, exercises },
            "查询成功",
        ))),
        Err(e) => Ok(error_response(&e)),
    }
}
