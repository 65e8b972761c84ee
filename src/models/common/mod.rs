pub mod error_code;
pub mod raw_value;
pub mod response;
