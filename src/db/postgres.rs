use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use crate::db::models::department::{Department, NewDepartment, UpdateDepartment};
use crate::db::models::employee::{Employee, EmployeeDraft, UpdateEmployee};
use crate::db::models::requests::{ItemDraft, Request, RequestChanges, RequestDraft, RequestItem, RequestStatus};
use crate::db::models::workflow::{Workflow, WorkflowDraft, WorkflowStatus};
use crate::db::repository::{
    DepartmentStore, EmployeeStore, Repository, RequestStore, StoreError, StoreResult, WorkflowStore,
};

const DEPARTMENT_COLUMNS: &str = "d.id, d.name, d.description, d.created_at, d.updated_at, \
     (SELECT COUNT(*) FROM employees e WHERE e.department_id = d.id) AS employee_count";

const EMPLOYEE_COLUMNS: &str =
    "id, employee_id, account_id, department_id, position, hire_date, status, created_at, updated_at";

const REQUEST_COLUMNS: &str = "id, employee_id, request_type, status, created_at, updated_at";

const WORKFLOW_COLUMNS: &str =
    "id, employee_id, workflow_type, details, request_id, status, created_at, updated_at";

/// PostgreSQL-backed repository. Enum columns are plain TEXT guarded by
/// CHECK constraints (see `migrations/`).
#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn attach_items(&self, mut requests: Vec<Request>) -> StoreResult<Vec<Request>> {
        if requests.is_empty() {
            return Ok(requests);
        }
        let ids: Vec<i32> = requests.iter().map(|r| r.id).collect();
        let items = sqlx::query_as::<_, RequestItem>(
            "SELECT id, request_id, name, quantity FROM request_items WHERE request_id = ANY($1) ORDER BY id",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_request: HashMap<i32, Vec<RequestItem>> = HashMap::new();
        for item in items {
            by_request.entry(item.request_id).or_default().push(item);
        }
        for request in &mut requests {
            request.request_items = by_request.remove(&request.id).unwrap_or_default();
        }
        Ok(requests)
    }

    async fn attach_items_one(&self, mut request: Request) -> StoreResult<Request> {
        request.request_items = sqlx::query_as::<_, RequestItem>(
            "SELECT id, request_id, name, quantity FROM request_items WHERE request_id = $1 ORDER BY id",
        )
        .bind(request.id)
        .fetch_all(&self.pool)
        .await?;
        Ok(request)
    }
}

fn unique_violation(err: sqlx::Error, message: impl Into<String>) -> StoreError {
    let is_unique = err
        .as_database_error()
        .and_then(|db_err| db_err.code())
        .map(|code| code == "23505")
        .unwrap_or(false);
    if is_unique {
        StoreError::Conflict(message.into())
    } else {
        StoreError::Database(err)
    }
}

async fn insert_items(
    tx: &mut Transaction<'_, Postgres>,
    request_id: i32,
    items: &[ItemDraft],
) -> Result<(), sqlx::Error> {
    for item in items {
        sqlx::query("INSERT INTO request_items (request_id, name, quantity) VALUES ($1, $2, $3)")
            .bind(request_id)
            .bind(&item.name)
            .bind(item.quantity)
            .execute(&mut **tx)
            .await?;
    }
    Ok(())
}

#[async_trait]
impl DepartmentStore for PgRepository {
    async fn list_departments(&self) -> StoreResult<Vec<Department>> {
        let sql = format!("SELECT {DEPARTMENT_COLUMNS} FROM departments d ORDER BY d.id");
        Ok(sqlx::query_as::<_, Department>(&sql).fetch_all(&self.pool).await?)
    }

    async fn find_department(&self, id: i32) -> StoreResult<Option<Department>> {
        let sql = format!("SELECT {DEPARTMENT_COLUMNS} FROM departments d WHERE d.id = $1");
        Ok(sqlx::query_as::<_, Department>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn insert_department(&self, new: &NewDepartment) -> StoreResult<Department> {
        let id: i32 = sqlx::query_scalar("INSERT INTO departments (name, description) VALUES ($1, $2) RETURNING id")
            .bind(&new.name)
            .bind(&new.description)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| unique_violation(e, "Department with this name already exists"))?;

        self.find_department(id)
            .await?
            .ok_or(StoreError::not_found("department", id))
    }

    async fn update_department(&self, id: i32, changes: &UpdateDepartment) -> StoreResult<Department> {
        let result = sqlx::query(
            "UPDATE departments SET name = COALESCE($1, name), description = COALESCE($2, description), \
             updated_at = NOW() WHERE id = $3",
        )
        .bind(&changes.name)
        .bind(&changes.description)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| unique_violation(e, "Department with this name already exists"))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("department", id));
        }
        self.find_department(id)
            .await?
            .ok_or(StoreError::not_found("department", id))
    }

    async fn delete_department(&self, id: i32) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM departments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("department", id));
        }
        Ok(())
    }
}

#[async_trait]
impl EmployeeStore for PgRepository {
    async fn list_employees(&self) -> StoreResult<Vec<Employee>> {
        let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees ORDER BY id");
        Ok(sqlx::query_as::<_, Employee>(&sql).fetch_all(&self.pool).await?)
    }

    async fn find_employee(&self, id: i32) -> StoreResult<Option<Employee>> {
        let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE id = $1");
        Ok(sqlx::query_as::<_, Employee>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_employee_by_account(&self, account_id: i32) -> StoreResult<Option<Employee>> {
        let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE account_id = $1 ORDER BY id LIMIT 1");
        Ok(sqlx::query_as::<_, Employee>(&sql)
            .bind(account_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn employee_codes_with_prefix(&self, prefix: &str) -> StoreResult<Vec<String>> {
        Ok(sqlx::query_scalar::<_, String>("SELECT employee_id FROM employees WHERE employee_id LIKE $1")
            .bind(format!("{prefix}%"))
            .fetch_all(&self.pool)
            .await?)
    }

    async fn insert_employee(&self, draft: &EmployeeDraft) -> StoreResult<Employee> {
        let sql = format!(
            "INSERT INTO employees (employee_id, account_id, department_id, position, hire_date, status) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {EMPLOYEE_COLUMNS}"
        );
        sqlx::query_as::<_, Employee>(&sql)
            .bind(&draft.employee_id)
            .bind(draft.account_id)
            .bind(draft.department_id)
            .bind(&draft.position)
            .bind(draft.hire_date)
            .bind(draft.status.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| unique_violation(e, format!("Employee with ID {} already exists.", draft.employee_id)))
    }

    async fn update_employee(&self, id: i32, changes: &UpdateEmployee) -> StoreResult<Employee> {
        let sql = format!(
            "UPDATE employees SET account_id = COALESCE($1, account_id), \
             department_id = COALESCE($2, department_id), position = COALESCE($3, position), \
             hire_date = COALESCE($4, hire_date), status = COALESCE($5, status), updated_at = NOW() \
             WHERE id = $6 RETURNING {EMPLOYEE_COLUMNS}"
        );
        sqlx::query_as::<_, Employee>(&sql)
            .bind(changes.account_id)
            .bind(changes.department_id)
            .bind(&changes.position)
            .bind(changes.hire_date)
            .bind(changes.status.map(|s| s.as_str()))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::not_found("employee", id))
    }

    async fn delete_employee(&self, id: i32) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM employees WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("employee", id));
        }
        Ok(())
    }
}

#[async_trait]
impl RequestStore for PgRepository {
    async fn list_requests(&self, employee_id: Option<i32>) -> StoreResult<Vec<Request>> {
        let sql = format!(
            "SELECT {REQUEST_COLUMNS} FROM requests WHERE ($1::INT IS NULL OR employee_id = $1) ORDER BY id"
        );
        let requests = sqlx::query_as::<_, Request>(&sql)
            .bind(employee_id)
            .fetch_all(&self.pool)
            .await?;
        self.attach_items(requests).await
    }

    async fn find_request(&self, id: i32) -> StoreResult<Option<Request>> {
        let sql = format!("SELECT {REQUEST_COLUMNS} FROM requests WHERE id = $1");
        let request = sqlx::query_as::<_, Request>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        match request {
            Some(request) => Ok(Some(self.attach_items_one(request).await?)),
            None => Ok(None),
        }
    }

    async fn insert_request(&self, draft: &RequestDraft) -> StoreResult<Request> {
        let mut tx = self.pool.begin().await?;
        let sql = format!(
            "INSERT INTO requests (employee_id, request_type) VALUES ($1, $2) RETURNING {REQUEST_COLUMNS}"
        );
        let request = sqlx::query_as::<_, Request>(&sql)
            .bind(draft.employee_id)
            .bind(draft.request_type.as_str())
            .fetch_one(&mut *tx)
            .await?;
        insert_items(&mut tx, request.id, &draft.items).await?;
        tx.commit().await?;

        self.attach_items_one(request).await
    }

    async fn update_request(&self, id: i32, changes: &RequestChanges) -> StoreResult<Request> {
        let mut tx = self.pool.begin().await?;
        let sql = format!(
            "UPDATE requests SET request_type = COALESCE($1, request_type), status = COALESCE($2, status), \
             updated_at = NOW() WHERE id = $3 RETURNING {REQUEST_COLUMNS}"
        );
        let request = sqlx::query_as::<_, Request>(&sql)
            .bind(changes.request_type.map(|t| t.as_str()))
            .bind(changes.status.map(|s| s.as_str()))
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(StoreError::not_found("request", id))?;

        if let Some(items) = &changes.items {
            sqlx::query("DELETE FROM request_items WHERE request_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            insert_items(&mut tx, id, items).await?;
        }
        tx.commit().await?;

        self.attach_items_one(request).await
    }

    async fn set_request_status(&self, id: i32, status: RequestStatus) -> StoreResult<Request> {
        let sql = format!(
            "UPDATE requests SET status = $1, updated_at = NOW() WHERE id = $2 RETURNING {REQUEST_COLUMNS}"
        );
        let request = sqlx::query_as::<_, Request>(&sql)
            .bind(status.as_str())
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::not_found("request", id))?;
        self.attach_items_one(request).await
    }

    async fn delete_request(&self, id: i32) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM requests WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("request", id));
        }
        Ok(())
    }
}

#[async_trait]
impl WorkflowStore for PgRepository {
    async fn list_workflows(&self) -> StoreResult<Vec<Workflow>> {
        let sql = format!("SELECT {WORKFLOW_COLUMNS} FROM workflows ORDER BY id");
        Ok(sqlx::query_as::<_, Workflow>(&sql).fetch_all(&self.pool).await?)
    }

    async fn list_workflows_for_employee(&self, employee_id: i32) -> StoreResult<Vec<Workflow>> {
        let sql = format!("SELECT {WORKFLOW_COLUMNS} FROM workflows WHERE employee_id = $1 ORDER BY id");
        Ok(sqlx::query_as::<_, Workflow>(&sql)
            .bind(employee_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn find_workflow(&self, id: i32) -> StoreResult<Option<Workflow>> {
        let sql = format!("SELECT {WORKFLOW_COLUMNS} FROM workflows WHERE id = $1");
        Ok(sqlx::query_as::<_, Workflow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn insert_workflow(&self, draft: &WorkflowDraft) -> StoreResult<Workflow> {
        let sql = format!(
            "INSERT INTO workflows (employee_id, workflow_type, details, request_id, status) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {WORKFLOW_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Workflow>(&sql)
            .bind(draft.employee_id)
            .bind(draft.workflow_type.as_str())
            .bind(draft.details.to_storage_text())
            .bind(draft.request_id)
            .bind(draft.status.as_str())
            .fetch_one(&self.pool)
            .await?)
    }

    async fn set_workflow_status(&self, id: i32, status: WorkflowStatus) -> StoreResult<Workflow> {
        let sql = format!(
            "UPDATE workflows SET status = $1, updated_at = NOW() WHERE id = $2 RETURNING {WORKFLOW_COLUMNS}"
        );
        sqlx::query_as::<_, Workflow>(&sql)
            .bind(status.as_str())
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::not_found("workflow", id))
    }
}

#[async_trait]
impl Repository for PgRepository {
    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }
}
