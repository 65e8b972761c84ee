//! 速率限制中间件
//!
//! 匹配图构建在缓存未命中时需要读取整个课程的比对，这里按客户端 IP 和固定时间窗口
//! 限制其请求频率，超过限制返回 429 并带上 `Retry-After`。

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use moka::future::Cache;
use once_cell::sync::Lazy;
use std::rc::Rc;
use std::time::Duration;
use tracing::warn;

use crate::config::AppConfig;
use crate::models::{ApiResponse, ErrorCode};

/// 支持的最长时间窗口（秒）
const MAX_WINDOW_SECS: u64 = 3600;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct WindowKey {
    scope: &'static str,
    client: String,
    window: u64,
}

/// 各窗口的请求计数，条目存活不超过最长窗口
static WINDOW_COUNTS: Lazy<Cache<WindowKey, u32>> = Lazy::new(|| {
    Cache::builder()
        .time_to_live(Duration::from_secs(MAX_WINDOW_SECS))
        .max_capacity(100_000)
        .build()
});

#[derive(Clone)]
pub struct RateLimit {
    scope: &'static str,
    max_requests: u32,
    window_secs: u64,
}

impl RateLimit {
    /// `scope` 区分不同端点的计数
    pub fn new(scope: &'static str, max_requests: u32, window_secs: u64) -> Self {
        Self {
            scope,
            max_requests,
            window_secs: window_secs.clamp(1, MAX_WINDOW_SECS),
        }
    }

    /// 匹配图构建限制，取自配置 `rate_limit`
    pub fn graph_build() -> Self {
        let config = &AppConfig::get().rate_limit;
        Self::new("graph_build", config.graph_build_requests, config.window_secs)
    }

    fn key_for(&self, req: &ServiceRequest) -> WindowKey {
        let now = chrono::Utc::now().timestamp().max(0) as u64;
        WindowKey {
            scope: self.scope,
            client: req
                .connection_info()
                .realip_remote_addr()
                .unwrap_or("unknown")
                .to_string(),
            window: now / self.window_secs,
        }
    }

    /// 计数加一，返回本窗口内的请求序号
    async fn hit(key: WindowKey) -> u32 {
        WINDOW_COUNTS
            .entry(key)
            .and_upsert_with(|current| async move {
                current.map(|e| e.into_value().saturating_add(1)).unwrap_or(1)
            })
            .await
            .into_value()
    }
}

fn too_many_requests(retry_after: u64) -> HttpResponse {
    HttpResponse::build(StatusCode::TOO_MANY_REQUESTS)
        .insert_header(("Retry-After", retry_after.to_string()))
        .json(ApiResponse::<()>::error_empty(
            ErrorCode::RateLimitExceeded,
            "请求过于频繁，请稍后再试",
        ))
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddleware {
            service: Rc::new(service),
            limit: self.clone(),
        }))
    }
}

pub struct RateLimitMiddleware<S> {
    service: Rc<S>,
    limit: RateLimit,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    actix_service::forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let limit = self.limit.clone();

        Box::pin(async move {
            let key = limit.key_for(&req);
            let count = RateLimit::hit(key.clone()).await;

            if count > limit.max_requests {
                warn!(
                    "Rate limit exceeded for {} on {} ({}/{} in window {})",
                    key.client, key.scope, count, limit.max_requests, key.window
                );
                let response = too_many_requests(limit.window_secs);
                return Ok(req.into_response(response).map_into_right_body());
            }

            Ok(srv.call(req).await?.map_into_left_body())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, test as actix_test, web};

    #[test]
    fn test_window_is_clamped() {
        let limit = RateLimit::new("clamp", 5, 0);
        assert_eq!(limit.window_secs, 1);
        let limit = RateLimit::new("clamp", 5, 86_400);
        assert_eq!(limit.window_secs, MAX_WINDOW_SECS);
    }

    #[test]
    fn test_graph_build_preset_uses_config() {
        let limit = RateLimit::graph_build();
        let config = &AppConfig::get().rate_limit;
        assert_eq!(limit.max_requests, config.graph_build_requests);
        assert_eq!(limit.scope, "graph_build");
    }

    #[actix_web::test]
    async fn test_requests_over_limit_are_rejected() {
        let app = actix_test::init_service(
            App::new().service(
                web::resource("/limited")
                    .wrap(RateLimit::new("test_over_limit", 2, 3600))
                    .route(web::post().to(|| async { HttpResponse::Ok().finish() })),
            ),
        )
        .await;

        for _ in 0..2 {
            let req = actix_test::TestRequest::post().uri("/limited").to_request();
            let resp = actix_test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::OK);
        }

        let req = actix_test::TestRequest::post().uri("/limited").to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(resp.headers().contains_key("Retry-After"));
    }

    #[actix_web::test]
    async fn test_scopes_are_counted_separately() {
        let app = actix_test::init_service(
            App::new()
                .service(
                    web::resource("/a")
                        .wrap(RateLimit::new("test_scope_a", 1, 3600))
                        .route(web::post().to(|| async { HttpResponse::Ok().finish() })),
                )
                .service(
                    web::resource("/b")
                        .wrap(RateLimit::new("test_scope_b", 1, 3600))
                        .route(web::post().to(|| async { HttpResponse::Ok().finish() })),
                ),
        )
        .await;

        for uri in ["/a", "/b"] {
            let req = actix_test::TestRequest::post().uri(uri).to_request();
            let resp = actix_test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::OK);
        }
    }
}
