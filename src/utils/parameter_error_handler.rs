//! 提取器错误处理
//!
//! 把 actix 的 JSON、查询参数和表单解析错误包装成统一的响应结构。

use actix_web::error::{JsonPayloadError, QueryPayloadError, UrlencodedError};
use actix_web::{Error, HttpRequest, HttpResponse};
use tracing::debug;

use crate::models::{ApiResponse, ErrorCode};

fn bad_request(kind: &str, detail: String) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse::error_empty(
        ErrorCode::BadRequest,
        format!("{kind}参数错误: {detail}"),
    ))
}

pub fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> Error {
    debug!("JSON payload error on {}: {}", req.path(), err);
    let response = bad_request("JSON", err.to_string());
    actix_web::error::InternalError::from_response(err, response).into()
}

pub fn query_error_handler(err: QueryPayloadError, req: &HttpRequest) -> Error {
    debug!("Query payload error on {}: {}", req.path(), err);
    let response = bad_request("查询", err.to_string());
    actix_web::error::InternalError::from_response(err, response).into()
}

pub fn form_error_handler(err: UrlencodedError, req: &HttpRequest) -> Error {
    debug!("Form payload error on {}: {}", req.path(), err);
    let response = bad_request("表单", err.to_string());
    actix_web::error::InternalError::from_response(err, response).into()
}
