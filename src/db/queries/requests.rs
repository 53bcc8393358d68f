use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use tracing::{debug, info};
use utoipa::OpenApi;

use crate::app_state::AppState;
use crate::db::models::requests::{
    ItemDraft, NewRequest, NewRequestItem, Request, RequestChanges, RequestDraft, RequestItem,
    RequestListQuery, RequestStatus, RequestType, UpdateRequest,
};
use crate::middleware::auth::UserPermissions;
use crate::utils::api_response::{ApiResponse, ApiResult};
use crate::utils::error::AppError;
use crate::workflow::audit;

/// Validates submitted line items, defaulting a missing quantity to 1.
fn item_drafts(items: &[NewRequestItem]) -> Result<Vec<ItemDraft>, AppError> {
    items
        .iter()
        .map(|item| {
            let name = item.name.trim();
            if name.is_empty() {
                return Err(AppError::validation("Item name must not be empty"));
            }
            let quantity = item.quantity.unwrap_or(1);
            if quantity < 1 {
                return Err(AppError::validation(format!(
                    "Item '{name}' must have a quantity of at least 1"
                )));
            }
            Ok(ItemDraft { name: name.to_string(), quantity })
        })
        .collect()
}

async fn load_request(state: &AppState, request_id: i32) -> Result<Request, AppError> {
    state
        .repo
        .find_request(request_id)
        .await?
        .ok_or_else(|| AppError::not_found("Request"))
}

/// Opens the approval workflow for a freshly written request.
async fn open_approval(state: &AppState, request: &Request, updated: bool) -> Result<(), AppError> {
    let requester_code = state
        .repo
        .find_employee(request.employee_id)
        .await?
        .map(|employee| employee.employee_id)
        .unwrap_or_else(|| request.employee_id.to_string());

    let workflow = state
        .repo
        .insert_workflow(&audit::request_approval(request, &requester_code, updated))
        .await?;
    debug!("Approval workflow {} opened for request {}", workflow.id, request.id);
    Ok(())
}

/// List requests; non-admins only ever see their own
#[utoipa::path(
    get,
    path = "/requests",
    params(RequestListQuery),
    responses(
        (status = 200, description = "Requests retrieved", body = [Request]),
        (status = 403, description = "Cannot list another employee's requests")
    ),
    tag = "Requests",
    security(("bearerAuth" = []))
)]
pub async fn get_requests(
    State(state): State<AppState>,
    Extension(permissions): Extension<UserPermissions>,
    Query(query): Query<RequestListQuery>,
) -> ApiResult<Vec<Request>> {
    let filter = if permissions.is_admin() {
        query.employee_id
    } else {
        if let Some(employee_id) = query.employee_id {
            permissions.ensure_can_access(employee_id)?;
        }
        match permissions.employee_id {
            Some(own) => Some(own),
            None => return Ok(ApiResponse::ok("Requests retrieved", Vec::new())),
        }
    };

    let requests = state.repo.list_requests(filter).await?;
    Ok(ApiResponse::ok("Requests retrieved", requests))
}

#[utoipa::path(
    get,
    path = "/requests/{request_id}",
    params(("request_id" = i32, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Request found", body = Request),
        (status = 403, description = "Request belongs to another employee"),
        (status = 404, description = "Request not found")
    ),
    tag = "Requests",
    security(("bearerAuth" = []))
)]
pub async fn get_request(
    State(state): State<AppState>,
    Extension(permissions): Extension<UserPermissions>,
    Path(request_id): Path<i32>,
) -> ApiResult<Request> {
    let request = load_request(&state, request_id).await?;
    permissions.ensure_can_access(request.employee_id)?;
    Ok(ApiResponse::ok("Request found", request))
}

/// Submit a request and open its approval workflow
#[utoipa::path(
    post,
    path = "/requests",
    request_body = NewRequest,
    responses(
        (status = 201, description = "Request created", body = Request),
        (status = 400, description = "Invalid request payload"),
        (status = 403, description = "Cannot submit for another employee"),
        (status = 404, description = "Employee not found")
    ),
    tag = "Requests",
    security(("bearerAuth" = []))
)]
pub async fn create_request(
    State(state): State<AppState>,
    Extension(permissions): Extension<UserPermissions>,
    Json(payload): Json<NewRequest>,
) -> ApiResult<Request> {
    let employee_id = payload
        .employee_id
        .or(permissions.employee_id)
        .ok_or_else(|| AppError::validation("employeeId is required"))?;
    permissions.ensure_can_access(employee_id)?;

    if state.repo.find_employee(employee_id).await?.is_none() {
        return Err(AppError::not_found("Employee").into());
    }
    let items = item_drafts(payload.submitted_items())?;

    let request = state
        .repo
        .insert_request(&RequestDraft {
            employee_id,
            request_type: payload.request_type,
            items,
        })
        .await?;
    info!(
        "Request {} ({}) created for employee {}",
        request.id, request.request_type, employee_id
    );

    open_approval(&state, &request, false).await?;
    Ok(ApiResponse::created("Request created", request))
}

/// Edit a request; every edit opens a fresh approval workflow
#[utoipa::path(
    put,
    path = "/requests/{request_id}",
    params(("request_id" = i32, Path, description = "Request ID")),
    request_body = UpdateRequest,
    responses(
        (status = 200, description = "Request updated", body = Request),
        (status = 400, description = "Invalid request payload"),
        (status = 403, description = "Request belongs to another employee"),
        (status = 404, description = "Request not found")
    ),
    tag = "Requests",
    security(("bearerAuth" = []))
)]
pub async fn update_request(
    State(state): State<AppState>,
    Extension(permissions): Extension<UserPermissions>,
    Path(request_id): Path<i32>,
    Json(payload): Json<UpdateRequest>,
) -> ApiResult<Request> {
    let existing = load_request(&state, request_id).await?;
    permissions.ensure_can_access(existing.employee_id)?;

    let changes = RequestChanges {
        request_type: payload.request_type,
        status: payload.status,
        items: payload.submitted_items().map(item_drafts).transpose()?,
    };
    let request = state.repo.update_request(request_id, &changes).await?;
    info!("Request {} updated", request.id);

    open_approval(&state, &request, true).await?;
    Ok(ApiResponse::ok("Request updated", request))
}

/// Delete a request and its items (admin only)
#[utoipa::path(
    delete,
    path = "/requests/{request_id}",
    params(("request_id" = i32, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Request deleted"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Request not found")
    ),
    tag = "Requests",
    security(("bearerAuth" = []))
)]
pub async fn delete_request(
    State(state): State<AppState>,
    Extension(permissions): Extension<UserPermissions>,
    Path(request_id): Path<i32>,
) -> ApiResult<()> {
    permissions.require_admin()?;
    state.repo.delete_request(request_id).await?;
    info!("Request {} deleted", request_id);
    Ok(ApiResponse::ok("Request deleted", ()))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        get_requests,
        get_request,
        create_request,
        update_request,
        delete_request,
    ),
    components(schemas(
        Request,
        RequestItem,
        RequestType,
        RequestStatus,
        NewRequest,
        NewRequestItem,
        UpdateRequest
    )),
    tags((name = "Requests", description = "Employee requests and their line items"))
)]
pub struct RequestDoc;
