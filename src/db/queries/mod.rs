pub mod departments;
pub mod employees;
pub mod requests;
pub mod workflows;
