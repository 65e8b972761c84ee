use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::models::comparisons::requests::{
    ComparisonDetailQuery, CreateComparisonRequest, TopComparisonsQuery, UpdateReviewRequest,
};
use crate::services::{ComparisonService, ReviewService};

// 懒加载的全局服务实例
static COMPARISON_SERVICE: Lazy<ComparisonService> = Lazy::new(ComparisonService::new_lazy);
static REVIEW_SERVICE: Lazy<ReviewService> = Lazy::new(ReviewService::new_lazy);

// 列出练习内相似度最高的比对
pub async fn list_top_comparisons(
    req: HttpRequest,
    path: web::Path<(String, String)>,
    query: web::Query<TopComparisonsQuery>,
) -> ActixResult<HttpResponse> {
    let (course_key, exercise_key) = path.into_inner();
    COMPARISON_SERVICE
        .list_top_comparisons(&req, &course_key, &exercise_key, query.into_inner())
        .await
}

// 相似度引擎写入比对
pub async fn create_comparison(
    req: HttpRequest,
    path: web::Path<(String, String)>,
    body: web::Json<CreateComparisonRequest>,
) -> ActixResult<HttpResponse> {
    let (course_key, exercise_key) = path.into_inner();
    COMPARISON_SERVICE
        .create_comparison(&req, &course_key, &exercise_key, body.into_inner())
        .await
}

// 重新比对前清空练习的比对
pub async fn clear_comparisons(
    req: HttpRequest,
    path: web::Path<(String, String)>,
) -> ActixResult<HttpResponse> {
    let (course_key, exercise_key) = path.into_inner();
    COMPARISON_SERVICE
        .clear_comparisons(&req, &course_key, &exercise_key)
        .await
}

// 获取比对详情
pub async fn get_comparison(
    req: HttpRequest,
    path: web::Path<(String, String, i64)>,
    query: web::Query<ComparisonDetailQuery>,
) -> ActixResult<HttpResponse> {
    let (course_key, exercise_key, comparison_id) = path.into_inner();
    COMPARISON_SERVICE
        .get_comparison(
            &req,
            &course_key,
            &exercise_key,
            comparison_id,
            query.into_inner(),
        )
        .await
}

// 更新审阅评分
pub async fn update_review(
    req: HttpRequest,
    path: web::Path<(String, String, i64)>,
    body: web::Json<UpdateReviewRequest>,
) -> ActixResult<HttpResponse> {
    let (course_key, exercise_key, comparison_id) = path.into_inner();
    REVIEW_SERVICE
        .update_review(
            &req,
            &course_key,
            &exercise_key,
            comparison_id,
            body.into_inner(),
        )
        .await
}

// 配置路由
pub fn configure_comparisons_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/courses/{course_key}/exercises/{exercise_key}/comparisons")
            .service(
                web::resource("")
                    .route(web::get().to(list_top_comparisons))
                    .route(web::post().to(create_comparison))
                    .route(web::delete().to(clear_comparisons)),
            )
            .service(web::resource("/{id}").route(web::get().to(get_comparison)))
            .service(web::resource("/{id}/review").route(web::post().to(update_review))),
    );
}
