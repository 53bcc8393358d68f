//! Storage seams.
//!
//! Handlers and the workflow engine are written against these traits only.
//! [`PgRepository`](super::postgres::PgRepository) backs production and
//! [`MemoryRepository`](super::memory::MemoryRepository) backs tests and
//! database-less development runs.

use std::sync::Arc;

use async_trait::async_trait;

use crate::db::models::department::{Department, NewDepartment, UpdateDepartment};
use crate::db::models::employee::{Employee, EmployeeDraft, UpdateEmployee};
use crate::db::models::requests::{Request, RequestChanges, RequestDraft, RequestStatus};
use crate::db::models::workflow::{Workflow, WorkflowDraft, WorkflowStatus};

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by a repository implementation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i32 },

    #[error("{0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: i32) -> Self {
        StoreError::NotFound { entity, id }
    }
}

#[async_trait]
pub trait DepartmentStore: Send + Sync {
    async fn list_departments(&self) -> StoreResult<Vec<Department>>;
    async fn find_department(&self, id: i32) -> StoreResult<Option<Department>>;
    /// Fails with `Conflict` when the name is taken, ignoring case.
    async fn insert_department(&self, new: &NewDepartment) -> StoreResult<Department>;
    async fn update_department(&self, id: i32, changes: &UpdateDepartment) -> StoreResult<Department>;
    /// Employees of a deleted department become unassigned.
    async fn delete_department(&self, id: i32) -> StoreResult<()>;
}

#[async_trait]
pub trait EmployeeStore: Send + Sync {
    async fn list_employees(&self) -> StoreResult<Vec<Employee>>;
    async fn find_employee(&self, id: i32) -> StoreResult<Option<Employee>>;
    async fn find_employee_by_account(&self, account_id: i32) -> StoreResult<Option<Employee>>;
    /// Every stored human-readable code starting with `prefix`.
    async fn employee_codes_with_prefix(&self, prefix: &str) -> StoreResult<Vec<String>>;
    /// Fails with `Conflict` when the code is already assigned.
    async fn insert_employee(&self, draft: &EmployeeDraft) -> StoreResult<Employee>;
    async fn update_employee(&self, id: i32, changes: &UpdateEmployee) -> StoreResult<Employee>;
    /// Cascades to the employee's requests and workflows.
    async fn delete_employee(&self, id: i32) -> StoreResult<()>;
}

#[async_trait]
pub trait RequestStore: Send + Sync {
    /// All requests with their items, optionally restricted to one employee.
    async fn list_requests(&self, employee_id: Option<i32>) -> StoreResult<Vec<Request>>;
    async fn find_request(&self, id: i32) -> StoreResult<Option<Request>>;
    async fn insert_request(&self, draft: &RequestDraft) -> StoreResult<Request>;
    /// Applies the present fields; `items: Some(_)` replaces every item.
    async fn update_request(&self, id: i32, changes: &RequestChanges) -> StoreResult<Request>;
    async fn set_request_status(&self, id: i32, status: RequestStatus) -> StoreResult<Request>;
    /// Items are deleted with the request.
    async fn delete_request(&self, id: i32) -> StoreResult<()>;
}

#[async_trait]
pub trait WorkflowStore: Send + Sync {
    async fn list_workflows(&self) -> StoreResult<Vec<Workflow>>;
    async fn list_workflows_for_employee(&self, employee_id: i32) -> StoreResult<Vec<Workflow>>;
    async fn find_workflow(&self, id: i32) -> StoreResult<Option<Workflow>>;
    async fn insert_workflow(&self, draft: &WorkflowDraft) -> StoreResult<Workflow>;
    async fn set_workflow_status(&self, id: i32, status: WorkflowStatus) -> StoreResult<Workflow>;
}

/// Everything the HTTP layer needs from storage.
#[async_trait]
pub trait Repository: DepartmentStore + EmployeeStore + RequestStore + WorkflowStore {
    /// Reachability check used by `/health/ready`.
    async fn ping(&self) -> StoreResult<()>;
}

pub type SharedRepository = Arc<dyn Repository>;
