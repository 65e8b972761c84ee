use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::models::suspects::requests::SuspectQuery;
use crate::services::ReviewService;

// 懒加载的全局 ReviewService 实例
static REVIEW_SERVICE: Lazy<ReviewService> = Lazy::new(ReviewService::new_lazy);

// 列出嫌疑学生
pub async fn list_suspects(
    req: HttpRequest,
    path: web::Path<String>,
    query: web::Query<SuspectQuery>,
) -> ActixResult<HttpResponse> {
    REVIEW_SERVICE
        .list_suspects(&req, &path.into_inner(), query.into_inner())
        .await
}

// 配置路由
pub fn configure_suspects_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/courses/{course_key}/suspects")
            .service(web::resource("").route(web::get().to(list_suspects))),
    );
}
