pub mod error_response;
pub mod parameter_error_handler;
pub mod validate;

pub use error_response::error_response;
pub use parameter_error_handler::{form_error_handler, json_error_handler, query_error_handler};
pub use validate::validate_key;
