pub mod api_response;
pub mod employee_id;
pub mod error;
