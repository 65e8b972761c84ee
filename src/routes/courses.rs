use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::models::courses::requests::HistogramQuery;
use crate::services::CourseService;

// 懒加载的全局 CourseService 实例
static COURSE_SERVICE: Lazy<CourseService> = Lazy::new(CourseService::new_lazy);

// 列出课程
pub async fn list_courses(req: HttpRequest) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.list_courses(&req).await
}

// 获取课程详情及练习列表
pub async fn get_course(req: HttpRequest, path: web::Path<String>) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.get_course(&req, &path.into_inner()).await
}

// 获取课程内各练习的相似度分布
pub async fn get_histograms(
    req: HttpRequest,
    path: web::Path<String>,
    query: web::Query<HistogramQuery>,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE
        .get_histograms(&req, &path.into_inner(), query.into_inner())
        .await
}

// 配置路由
pub fn configure_courses_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/courses")
            .service(web::resource("").route(web::get().to(list_courses)))
            .service(web::resource("/{course_key}").route(web::get().to(get_course)))
            .service(
                web::resource("/{course_key}/histograms").route(web::get().to(get_histograms)),
            ),
    );
}
