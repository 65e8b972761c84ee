use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::RateLimit;
use crate::models::graph::requests::BuildGraphForm;
use crate::services::GraphService;

// 懒加载的全局 GraphService 实例
static GRAPH_SERVICE: Lazy<GraphService> = Lazy::new(GraphService::new_lazy);

// 以表单中的阈值构建匹配图
pub async fn build_graph(
    req: HttpRequest,
    path: web::Path<String>,
    form: web::Form<BuildGraphForm>,
) -> ActixResult<HttpResponse> {
    GRAPH_SERVICE
        .build_graph(&req, &path.into_inner(), form.into_inner())
        .await
}

// 以默认阈值获取匹配图
pub async fn get_default_graph(
    req: HttpRequest,
    path: web::Path<String>,
) -> ActixResult<HttpResponse> {
    GRAPH_SERVICE
        .get_default_graph(&req, &path.into_inner())
        .await
}

// 使课程的匹配图缓存失效
pub async fn invalidate_graph(
    req: HttpRequest,
    path: web::Path<String>,
) -> ActixResult<HttpResponse> {
    GRAPH_SERVICE
        .invalidate_graph(&req, &path.into_inner())
        .await
}

// 配置路由
pub fn configure_graph_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/courses/{course_key}/graph")
            .service(
                web::resource("")
                    .route(web::get().to(get_default_graph))
                    // 构建可能读取整个课程的比对，限制请求频率
                    .route(web::post().to(build_graph).wrap(RateLimit::graph_build())),
            )
            .service(web::resource("/invalidate").route(web::post().to(invalidate_graph))),
    );
}
