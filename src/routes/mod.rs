pub mod comparisons;

pub mod courses;

pub mod graph;

pub mod suspects;

use actix_web::web;

pub use comparisons::configure_comparisons_routes;
pub use courses::configure_courses_routes;
pub use graph::configure_graph_routes;
pub use suspects::configure_suspects_routes;

/// 注册全部 API 路由
///
/// actix 按注册顺序匹配 scope，前缀命中后不会回退，
/// 所以更具体的课程子路径必须在 `/api/v1/courses` 之前注册。
pub fn configure_api_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(configure_graph_routes)
        .configure(configure_suspects_routes)
        .configure(configure_comparisons_routes)
        .configure(configure_courses_routes);
}
