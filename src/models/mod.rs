pub mod common;
pub mod comparisons;
pub mod courses;
pub mod graph;
pub mod suspects;

pub use common::error_code::ErrorCode;
pub use common::response::ApiResponse;

