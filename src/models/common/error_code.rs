use serde::{Deserialize, Serialize};

use crate::errors::RadarError;

/// 业务错误码
///
/// 0 表示成功；1xxx 为参数错误，2xxx 为资源不存在或冲突，5xxx 为服务端错误。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    BadRequest = 1000,
    InvalidThreshold = 1001,
    InvalidReviewScore = 1002,
    InvalidCutoff = 1003,
    InvalidSimilarity = 1004,

    NotFound = 2000,
    ComparisonAlreadyExists = 2001,

    RateLimitExceeded = 4290,

    InternalServerError = 5000,
    StoreUnavailable = 5001,
    GraphBuildTimeout = 5030,
}

impl From<&RadarError> for ErrorCode {
    fn from(err: &RadarError) -> Self {
        match err {
            RadarError::NotFound(_) => ErrorCode::NotFound,
            RadarError::InvalidArgument(_) => ErrorCode::BadRequest,
            RadarError::ConcurrencyTimeout(_) => ErrorCode::GraphBuildTimeout,
            RadarError::StoreUnavailable(_) => ErrorCode::StoreUnavailable,
            RadarError::Conflict(_) => ErrorCode::ComparisonAlreadyExists,
            _ => ErrorCode::InternalServerError,
        }
    }
}
