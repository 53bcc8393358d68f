use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use moka::sync::Cache;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error};

use crate::app_state::AppState;
use crate::utils::api_response::ApiResponse;
use crate::utils::error::AppError;

pub const ADMIN_ROLE: &str = "Admin";

/// Claims issued by the identity provider. `sub` is the account id.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    /// Expiration timestamp (UNIX time)
    pub exp: usize,
}

/// Account id -> the caller's own employee row, if one is linked.
pub type PermissionCache = Arc<Cache<i32, Option<i32>>>;

pub fn create_permission_cache() -> PermissionCache {
    Arc::new(
        Cache::builder()
            .time_to_live(Duration::from_secs(600))
            .build(),
    )
}

/// What the current caller may touch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPermissions {
    pub account_id: i32,
    pub role: String,
    /// Employee record owned by the caller's account.
    pub employee_id: Option<i32>,
}

impl UserPermissions {
    pub fn is_admin(&self) -> bool {
        self.role.eq_ignore_ascii_case(ADMIN_ROLE)
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::forbidden("Unauthorized"))
        }
    }

    /// Admins see everything, everyone else only their own employee's records.
    pub fn can_access_employee(&self, employee_id: i32) -> bool {
        self.is_admin() || self.employee_id == Some(employee_id)
    }

    pub fn ensure_can_access(&self, employee_id: i32) -> Result<(), AppError> {
        if self.can_access_employee(employee_id) {
            Ok(())
        } else {
            Err(AppError::forbidden("Unauthorized"))
        }
    }
}

fn reject(status: StatusCode, message: &str) -> Response {
    ApiResponse::<()>::error(status, message, None).into_response()
}

/// Verifies the bearer token and stores its [`Claims`] in the request.
/// With `AUTH_DISABLED` every caller is treated as an administrator.
pub async fn jwt_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    if state.config.auth_disabled {
        req.extensions_mut().insert(Claims {
            sub: "0".to_string(),
            role: ADMIN_ROLE.to_string(),
            exp: usize::MAX,
        });
        return Ok(next.run(req).await);
    }

    let auth_header = req.headers().get("Authorization").ok_or_else(|| {
        debug!("Missing Authorization header");
        reject(StatusCode::UNAUTHORIZED, "Missing Authorization header")
    })?;

    let token = auth_header
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| {
            debug!("Malformed Authorization header");
            reject(StatusCode::UNAUTHORIZED, "Invalid token format (expected 'Bearer <token>')")
        })?;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(state.config.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        debug!("JWT decoding failed: {:?}", e);
        ApiResponse::<()>::error(
            StatusCode::UNAUTHORIZED,
            "Invalid token",
            Some(json!({ "error": e.to_string() })),
        )
        .into_response()
    })?;

    req.extensions_mut().insert(token_data.claims);
    Ok(next.run(req).await)
}

/// Resolves [`UserPermissions`] for the verified claims, caching the
/// account-to-employee link.
pub async fn rbac_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    let claims = req.extensions().get::<Claims>().cloned().ok_or_else(|| {
        error!("Missing JWT claims in request");
        reject(StatusCode::UNAUTHORIZED, "Missing JWT claims in request")
    })?;

    let account_id: i32 = claims.sub.parse().map_err(|_| {
        debug!("Invalid account id in JWT claims: {}", claims.sub);
        reject(StatusCode::UNAUTHORIZED, "Invalid user ID format in JWT claims")
    })?;

    let employee_id = match state.permission_cache.get(&account_id) {
        Some(cached) => cached,
        None => {
            let linked = state
                .repo
                .find_employee_by_account(account_id)
                .await
                .map_err(|e| {
                    error!("Failed to load employee for account {}: {}", account_id, e);
                    ApiResponse::<()>::error(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Failed to load user permissions",
                        Some(json!({ "error": e.to_string() })),
                    )
                    .into_response()
                })?
                .map(|employee| employee.id);
            state.permission_cache.insert(account_id, linked);
            linked
        }
    };

    req.extensions_mut().insert(UserPermissions {
        account_id,
        role: claims.role,
        employee_id,
    });
    Ok(next.run(req).await)
}
