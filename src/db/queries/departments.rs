use axum::{
    extract::{Path, State},
    Extension, Json,
};
use tracing::info;
use utoipa::OpenApi;

use crate::app_state::AppState;
use crate::db::models::department::{Department, NewDepartment, UpdateDepartment};
use crate::middleware::auth::UserPermissions;
use crate::utils::api_response::{ApiResponse, ApiResult};
use crate::utils::error::AppError;

fn validate_name(name: &str) -> Result<(), AppError> {
    if name.trim().is_empty() {
        return Err(AppError::validation("Department name must not be empty"));
    }
    Ok(())
}

/// List every department with its employee count
#[utoipa::path(
    get,
    path = "/departments",
    responses(
        (status = 200, description = "Departments retrieved", body = [Department]),
        (status = 500, description = "Internal server error")
    ),
    tag = "Departments",
    security(("bearerAuth" = []))
)]
pub async fn get_departments(State(state): State<AppState>) -> ApiResult<Vec<Department>> {
    let departments = state.repo.list_departments().await?;
    Ok(ApiResponse::ok("Departments retrieved", departments))
}

#[utoipa::path(
    get,
    path = "/departments/{department_id}",
    params(("department_id" = i32, Path, description = "Department ID")),
    responses(
        (status = 200, description = "Department found", body = Department),
        (status = 404, description = "Department not found")
    ),
    tag = "Departments",
    security(("bearerAuth" = []))
)]
pub async fn get_department(
    State(state): State<AppState>,
    Path(department_id): Path<i32>,
) -> ApiResult<Department> {
    let department = state
        .repo
        .find_department(department_id)
        .await?
        .ok_or_else(|| AppError::not_found("Department"))?;
    Ok(ApiResponse::ok("Department found", department))
}

/// Create a department (admin only)
#[utoipa::path(
    post,
    path = "/departments",
    request_body = NewDepartment,
    responses(
        (status = 201, description = "Department created", body = Department),
        (status = 400, description = "Invalid department payload"),
        (status = 403, description = "Admin role required"),
        (status = 409, description = "Department name already in use")
    ),
    tag = "Departments",
    security(("bearerAuth" = []))
)]
pub async fn create_department(
    State(state): State<AppState>,
    Extension(permissions): Extension<UserPermissions>,
    Json(payload): Json<NewDepartment>,
) -> ApiResult<Department> {
    permissions.require_admin()?;
    validate_name(&payload.name)?;

    let department = state.repo.insert_department(&payload).await?;
    info!("Department {} ({}) created", department.id, department.name);
    Ok(ApiResponse::created("Department created", department))
}

#[utoipa::path(
    put,
    path = "/departments/{department_id}",
    params(("department_id" = i32, Path, description = "Department ID")),
    request_body = UpdateDepartment,
    responses(
        (status = 200, description = "Department updated", body = Department),
        (status = 400, description = "Nothing to update"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Department not found"),
        (status = 409, description = "Department name already in use")
    ),
    tag = "Departments",
    security(("bearerAuth" = []))
)]
pub async fn update_department(
    State(state): State<AppState>,
    Extension(permissions): Extension<UserPermissions>,
    Path(department_id): Path<i32>,
    Json(payload): Json<UpdateDepartment>,
) -> ApiResult<Department> {
    permissions.require_admin()?;
    if payload.is_empty() {
        return Err(AppError::validation("No fields to update").into());
    }
    if let Some(name) = &payload.name {
        validate_name(name)?;
    }

    let department = state.repo.update_department(department_id, &payload).await?;
    info!("Department {} updated", department.id);
    Ok(ApiResponse::ok("Department updated", department))
}

/// Delete a department; its employees become unassigned
#[utoipa::path(
    delete,
    path = "/departments/{department_id}",
    params(("department_id" = i32, Path, description = "Department ID")),
    responses(
        (status = 200, description = "Department deleted"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Department not found")
    ),
    tag = "Departments",
    security(("bearerAuth" = []))
)]
pub async fn delete_department(
    State(state): State<AppState>,
    Extension(permissions): Extension<UserPermissions>,
    Path(department_id): Path<i32>,
) -> ApiResult<()> {
    permissions.require_admin()?;
    state.repo.delete_department(department_id).await?;
    info!("Department {} deleted", department_id);
    Ok(ApiResponse::ok("Department deleted", ()))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        get_departments,
        get_department,
        create_department,
        update_department,
        delete_department,
    ),
    components(schemas(Department, NewDepartment, UpdateDepartment)),
    tags((name = "Departments", description = "Department management"))
)]
pub struct DepartmentDoc;
