use axum::{
    extract::{Path, State},
    Extension, Json,
};
use tracing::{debug, info};
use utoipa::OpenApi;

use crate::app_state::AppState;
use crate::db::models::employee::Employee;
use crate::db::models::workflow::{
    NewWorkflow, OnboardingWorkflow, UpdateWorkflowStatus, Workflow, WorkflowDraft, WorkflowStatus,
    WorkflowType,
};
use crate::middleware::auth::UserPermissions;
use crate::utils::api_response::{ApiResponse, ApiResult};
use crate::utils::error::AppError;
use crate::workflow::{audit, backref, update_workflow_status, StatusSync};

async fn load_employee(state: &AppState, employee_id: i32) -> Result<Employee, AppError> {
    state
        .repo
        .find_employee(employee_id)
        .await?
        .ok_or_else(|| AppError::not_found("Employee"))
}

#[utoipa::path(
    get,
    path = "/workflows",
    responses(
        (status = 200, description = "Workflows retrieved", body = [Workflow])
    ),
    tag = "Workflows",
    security(("bearerAuth" = []))
)]
pub async fn get_workflows(State(state): State<AppState>) -> ApiResult<Vec<Workflow>> {
    let workflows = state.repo.list_workflows().await?;
    Ok(ApiResponse::ok("Workflows retrieved", workflows))
}

#[utoipa::path(
    get,
    path = "/workflows/{workflow_id}",
    params(("workflow_id" = i32, Path, description = "Workflow ID")),
    responses(
        (status = 200, description = "Workflow found", body = Workflow),
        (status = 404, description = "Workflow not found")
    ),
    tag = "Workflows",
    security(("bearerAuth" = []))
)]
pub async fn get_workflow(
    State(state): State<AppState>,
    Path(workflow_id): Path<i32>,
) -> ApiResult<Workflow> {
    let workflow = state
        .repo
        .find_workflow(workflow_id)
        .await?
        .ok_or_else(|| AppError::not_found("Workflow"))?;
    Ok(ApiResponse::ok("Workflow found", workflow))
}

#[utoipa::path(
    get,
    path = "/workflows/employee/{employee_id}",
    params(("employee_id" = i32, Path, description = "Employee row ID")),
    responses(
        (status = 200, description = "Workflows retrieved", body = [Workflow])
    ),
    tag = "Workflows",
    security(("bearerAuth" = []))
)]
pub async fn get_employee_workflows(
    State(state): State<AppState>,
    Path(employee_id): Path<i32>,
) -> ApiResult<Vec<Workflow>> {
    let workflows = state.repo.list_workflows_for_employee(employee_id).await?;
    Ok(ApiResponse::ok("Workflows retrieved", workflows))
}

/// Record an arbitrary workflow (admin only)
#[utoipa::path(
    post,
    path = "/workflows",
    request_body = NewWorkflow,
    responses(
        (status = 201, description = "Workflow created", body = Workflow),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Employee not found")
    ),
    tag = "Workflows",
    security(("bearerAuth" = []))
)]
pub async fn create_workflow(
    State(state): State<AppState>,
    Extension(permissions): Extension<UserPermissions>,
    Json(payload): Json<NewWorkflow>,
) -> ApiResult<Workflow> {
    permissions.require_admin()?;
    load_employee(&state, payload.employee_id).await?;

    let workflow = state
        .repo
        .insert_workflow(&WorkflowDraft {
            employee_id: payload.employee_id,
            workflow_type: payload.workflow_type,
            details: payload.details.unwrap_or_default(),
            request_id: payload.request_id.filter(|id| *id > 0),
            status: payload.status.unwrap_or_default(),
        })
        .await?;
    info!(
        "Workflow {} ({}) created for employee {}",
        workflow.id, workflow.workflow_type, workflow.employee_id
    );
    Ok(ApiResponse::created("Workflow created", workflow))
}

/// Open a pending onboarding workflow for an existing employee
#[utoipa::path(
    post,
    path = "/workflows/onboarding",
    request_body = OnboardingWorkflow,
    responses(
        (status = 201, description = "Onboarding workflow created", body = Workflow),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Employee not found")
    ),
    tag = "Workflows",
    security(("bearerAuth" = []))
)]
pub async fn create_onboarding_workflow(
    State(state): State<AppState>,
    Extension(permissions): Extension<UserPermissions>,
    Json(payload): Json<OnboardingWorkflow>,
) -> ApiResult<Workflow> {
    permissions.require_admin()?;
    let employee = load_employee(&state, payload.employee_id).await?;

    let mut draft = audit::onboarding(&employee);
    if let Some(details) = payload.details {
        draft.details = details;
    }
    let workflow = state.repo.insert_workflow(&draft).await?;
    info!("Onboarding workflow {} created for employee {}", workflow.id, employee.id);
    Ok(ApiResponse::created("Onboarding workflow created", workflow))
}

/// Change a workflow's status. Request-approval workflows carry the new
/// status over to the request they refer to.
#[utoipa::path(
    put,
    path = "/workflows/{workflow_id}/status",
    params(("workflow_id" = i32, Path, description = "Workflow ID")),
    request_body = UpdateWorkflowStatus,
    responses(
        (status = 200, description = "Workflow status updated", body = Workflow),
        (status = 400, description = "Unknown workflow status"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Workflow not found")
    ),
    tag = "Workflows",
    security(("bearerAuth" = []))
)]
pub async fn update_workflow_status_handler(
    State(state): State<AppState>,
    Extension(permissions): Extension<UserPermissions>,
    Path(workflow_id): Path<i32>,
    Json(payload): Json<UpdateWorkflowStatus>,
) -> ApiResult<Workflow> {
    permissions.require_admin()?;
    let status: WorkflowStatus = payload.status.trim().parse().map_err(AppError::from)?;
    let explicit_request_id = payload.request_id.as_ref().and_then(backref::coerce_request_id);
    if payload.request_id.is_some() && explicit_request_id.is_none() {
        debug!("Ignoring unusable requestId {:?}", payload.request_id);
    }

    let update = update_workflow_status(state.repo.as_ref(), workflow_id, status, explicit_request_id)
        .await?;

    if let StatusSync::Propagated { request_id, status, .. } = &update.sync {
        info!("Workflow {} moved request {} to {}", workflow_id, request_id, status);
    } else {
        debug!("Workflow {} status sync: {:?}", workflow_id, update.sync);
    }

    Ok(ApiResponse::ok("Workflow status updated", update.workflow))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        get_workflows,
        get_workflow,
        get_employee_workflows,
        create_workflow,
        create_onboarding_workflow,
        update_workflow_status_handler,
    ),
    components(schemas(
        Workflow,
        WorkflowType,
        WorkflowStatus,
        NewWorkflow,
        OnboardingWorkflow,
        UpdateWorkflowStatus
    )),
    tags((name = "Workflows", description = "Audit workflows and approval status"))
)]
pub struct WorkflowDoc;
