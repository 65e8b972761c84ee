use actix_web::{HttpResponse, http::StatusCode};
use tracing::{error, warn};

use crate::errors::RadarError;
use crate::models::{ApiResponse, ErrorCode};

/// 错误对应的 HTTP 状态码
pub fn status_of(err: &RadarError) -> StatusCode {
    match err {
        RadarError::NotFound(_) => StatusCode::NOT_FOUND,
        RadarError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
        RadarError::ConcurrencyTimeout(_) => StatusCode::SERVICE_UNAVAILABLE,
        RadarError::Conflict(_) => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// 把业务错误转换为统一的错误响应，错误码由错误类型推断
pub fn error_response(err: &RadarError) -> HttpResponse {
    error_response_with_code(err, ErrorCode::from(err))
}

/// 使用指定业务错误码的错误响应
pub fn error_response_with_code(err: &RadarError, code: ErrorCode) -> HttpResponse {
    let status = status_of(err);
    if status.is_server_error() {
        match err {
            RadarError::ConcurrencyTimeout(_) => warn!("{}", err.format_simple()),
            _ => error!("{}", err.format_simple()),
        }
    }
    HttpResponse::build(status).json(ApiResponse::error_empty(code, err.message()))
}
