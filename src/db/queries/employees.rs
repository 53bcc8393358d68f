use axum::{
    extract::{Path, State},
    Extension, Json,
};
use tracing::{debug, info};
use utoipa::OpenApi;

use crate::app_state::AppState;
use crate::db::models::department::DepartmentSummary;
use crate::db::models::employee::{
    Employee, EmployeeDraft, EmployeeStatus, EmployeeWithDetails, NewEmployee, NextEmployeeId,
    TransferEmployee, UpdateEmployee,
};
use crate::middleware::auth::UserPermissions;
use crate::utils::api_response::{ApiResponse, ApiResult};
use crate::utils::employee_id::PREFIX;
use crate::utils::error::AppError;
use crate::workflow::audit;

/// Next human-readable code under the configured strategy.
async fn next_employee_code(state: &AppState) -> Result<String, AppError> {
    let codes = state.repo.employee_codes_with_prefix(PREFIX).await?;
    Ok(state.config.employee_id_strategy.next_code(&codes))
}

async fn ensure_department_exists(state: &AppState, department_id: i32) -> Result<(), AppError> {
    match state.repo.find_department(department_id).await? {
        Some(_) => Ok(()),
        None => Err(AppError::validation(format!(
            "Department {department_id} does not exist"
        ))),
    }
}

async fn load_employee(state: &AppState, employee_id: i32) -> Result<Employee, AppError> {
    state
        .repo
        .find_employee(employee_id)
        .await?
        .ok_or_else(|| AppError::not_found("Employee"))
}

#[utoipa::path(
    get,
    path = "/employees",
    responses(
        (status = 200, description = "Employees retrieved", body = [Employee]),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employees",
    security(("bearerAuth" = []))
)]
pub async fn get_employees(State(state): State<AppState>) -> ApiResult<Vec<Employee>> {
    let employees = state.repo.list_employees().await?;
    Ok(ApiResponse::ok("Employees retrieved", employees))
}

#[utoipa::path(
    get,
    path = "/employees/{employee_id}",
    params(("employee_id" = i32, Path, description = "Employee row ID")),
    responses(
        (status = 200, description = "Employee found", body = Employee),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employees",
    security(("bearerAuth" = []))
)]
pub async fn get_employee(
    State(state): State<AppState>,
    Path(employee_id): Path<i32>,
) -> ApiResult<Employee> {
    let employee = load_employee(&state, employee_id).await?;
    Ok(ApiResponse::ok("Employee found", employee))
}

/// Employee with its department embedded
#[utoipa::path(
    get,
    path = "/employees/{employee_id}/with-details",
    params(("employee_id" = i32, Path, description = "Employee row ID")),
    responses(
        (status = 200, description = "Employee found", body = EmployeeWithDetails),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employees",
    security(("bearerAuth" = []))
)]
pub async fn get_employee_with_details(
    State(state): State<AppState>,
    Path(employee_id): Path<i32>,
) -> ApiResult<EmployeeWithDetails> {
    let employee = load_employee(&state, employee_id).await?;
    let department = match employee.department_id {
        Some(department_id) => state.repo.find_department(department_id).await?,
        None => None,
    };

    Ok(ApiResponse::ok(
        "Employee found",
        EmployeeWithDetails {
            employee,
            department: department.as_ref().map(DepartmentSummary::from),
        },
    ))
}

/// Preview of the code the next created employee would receive
#[utoipa::path(
    get,
    path = "/employees/nextId",
    responses(
        (status = 200, description = "Next employee code", body = NextEmployeeId)
    ),
    tag = "Employees",
    security(("bearerAuth" = []))
)]
pub async fn get_next_employee_id(State(state): State<AppState>) -> ApiResult<NextEmployeeId> {
    let employee_id = next_employee_code(&state).await?;
    Ok(ApiResponse::ok("Next employee ID generated", NextEmployeeId { employee_id }))
}

/// Create an employee and open its onboarding workflow
#[utoipa::path(
    post,
    path = "/employees",
    request_body = NewEmployee,
    responses(
        (status = 201, description = "Employee created", body = Employee),
        (status = 400, description = "Invalid employee payload"),
        (status = 403, description = "Admin role required"),
        (status = 409, description = "Employee ID already assigned")
    ),
    tag = "Employees",
    security(("bearerAuth" = []))
)]
pub async fn create_employee(
    State(state): State<AppState>,
    Extension(permissions): Extension<UserPermissions>,
    Json(payload): Json<NewEmployee>,
) -> ApiResult<Employee> {
    permissions.require_admin()?;
    if payload.position.trim().is_empty() {
        return Err(AppError::validation("Position must not be empty").into());
    }
    if let Some(department_id) = payload.department_id {
        ensure_department_exists(&state, department_id).await?;
    }

    let code = match payload.employee_id.as_deref().map(str::trim) {
        Some(code) if !code.is_empty() => code.to_string(),
        _ => {
            let generated = next_employee_code(&state).await?;
            debug!("Generated employee ID {}", generated);
            generated
        }
    };

    let employee = state
        .repo
        .insert_employee(&EmployeeDraft {
            employee_id: code,
            account_id: payload.account_id,
            department_id: payload.department_id,
            position: payload.position.trim().to_string(),
            hire_date: payload.hire_date,
            status: payload.status.unwrap_or(EmployeeStatus::Active),
        })
        .await?;
    state.permission_cache.invalidate_all();
    info!("Employee {} ({}) created", employee.id, employee.employee_id);

    let workflow = state.repo.insert_workflow(&audit::onboarding(&employee)).await?;
    debug!("Onboarding workflow {} opened for employee {}", workflow.id, employee.id);

    Ok(ApiResponse::created("Employee created", employee))
}

#[utoipa::path(
    put,
    path = "/employees/{employee_id}",
    params(("employee_id" = i32, Path, description = "Employee row ID")),
    request_body = UpdateEmployee,
    responses(
        (status = 200, description = "Employee updated", body = Employee),
        (status = 400, description = "Invalid update"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employees",
    security(("bearerAuth" = []))
)]
pub async fn update_employee(
    State(state): State<AppState>,
    Extension(permissions): Extension<UserPermissions>,
    Path(employee_id): Path<i32>,
    Json(payload): Json<UpdateEmployee>,
) -> ApiResult<Employee> {
    permissions.require_admin()?;
    if payload.is_empty() {
        return Err(AppError::validation("No fields to update").into());
    }
    if payload.position.as_deref().is_some_and(|p| p.trim().is_empty()) {
        return Err(AppError::validation("Position must not be empty").into());
    }
    if let Some(department_id) = payload.department_id {
        ensure_department_exists(&state, department_id).await?;
    }

    let employee = state.repo.update_employee(employee_id, &payload).await?;
    state.permission_cache.invalidate_all();
    info!("Employee {} updated", employee.id);
    Ok(ApiResponse::ok("Employee updated", employee))
}

/// Delete an employee together with its requests and workflows
#[utoipa::path(
    delete,
    path = "/employees/{employee_id}",
    params(("employee_id" = i32, Path, description = "Employee row ID")),
    responses(
        (status = 200, description = "Employee deleted"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employees",
    security(("bearerAuth" = []))
)]
pub async fn delete_employee(
    State(state): State<AppState>,
    Extension(permissions): Extension<UserPermissions>,
    Path(employee_id): Path<i32>,
) -> ApiResult<()> {
    permissions.require_admin()?;
    state.repo.delete_employee(employee_id).await?;
    state.permission_cache.invalidate_all();
    info!("Employee {} deleted", employee_id);
    Ok(ApiResponse::ok("Employee deleted", ()))
}

/// Move an employee to another department and record the transfer
#[utoipa::path(
    post,
    path = "/employees/{employee_id}/transfer",
    params(("employee_id" = i32, Path, description = "Employee row ID")),
    request_body = TransferEmployee,
    responses(
        (status = 200, description = "Employee transferred", body = Employee),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Employee or department not found")
    ),
    tag = "Employees",
    security(("bearerAuth" = []))
)]
pub async fn transfer_employee(
    State(state): State<AppState>,
    Extension(permissions): Extension<UserPermissions>,
    Path(employee_id): Path<i32>,
    Json(payload): Json<TransferEmployee>,
) -> ApiResult<Employee> {
    permissions.require_admin()?;
    let employee = load_employee(&state, employee_id).await?;
    let target = state
        .repo
        .find_department(payload.department_id)
        .await?
        .ok_or_else(|| AppError::not_found("Department"))?;
    let previous = match employee.department_id {
        Some(department_id) => state.repo.find_department(department_id).await?,
        None => None,
    };

    let changes = UpdateEmployee {
        department_id: Some(target.id),
        ..UpdateEmployee::default()
    };
    let employee = state.repo.update_employee(employee.id, &changes).await?;
    state.permission_cache.invalidate_all();
    info!(
        "Employee {} transferred to department {}",
        employee.id, target.id
    );

    state
        .repo
        .insert_workflow(&audit::department_transfer(&employee, previous.as_ref(), Some(&target)))
        .await?;

    Ok(ApiResponse::ok("Employee transferred", employee))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        get_employees,
        get_employee,
        get_employee_with_details,
        get_next_employee_id,
        create_employee,
        update_employee,
        delete_employee,
        transfer_employee,
    ),
    components(schemas(
        Employee,
        EmployeeStatus,
        NewEmployee,
        UpdateEmployee,
        TransferEmployee,
        EmployeeWithDetails,
        NextEmployeeId,
        DepartmentSummary
    )),
    tags((name = "Employees", description = "Employee records and ID generation"))
)]
pub struct EmployeeDoc;
