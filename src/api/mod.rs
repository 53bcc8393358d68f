pub mod departments;
pub mod docs;
pub mod employees;
pub mod health;
pub mod requests;
pub mod workflows;
