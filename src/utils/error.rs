use axum::http::StatusCode;
use serde_json::json;
use tracing::error;

use crate::db::models::UnknownVariant;
use crate::db::repository::StoreError;
use crate::utils::api_response::ApiResponse;

/// Failures surfaced to API callers.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Store(StoreError),
}

impl AppError {
    pub fn not_found(what: impl Into<String>) -> Self {
        AppError::NotFound(what.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        AppError::Forbidden(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, .. } => AppError::NotFound(capitalize(entity)),
            StoreError::Conflict(message) => AppError::Conflict(message),
            other => AppError::Store(other),
        }
    }
}

impl From<UnknownVariant> for AppError {
    fn from(err: UnknownVariant) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<AppError> for ApiResponse<()> {
    fn from(err: AppError) -> Self {
        match &err {
            AppError::Store(inner) => {
                error!("Storage failure: {}", inner);
                ApiResponse::error(
                    err.status(),
                    "Internal server error",
                    Some(json!({ "error": inner.to_string() })),
                )
            }
            _ => ApiResponse::error(err.status(), err.to_string(), None),
        }
    }
}

impl From<StoreError> for ApiResponse<()> {
    fn from(err: StoreError) -> Self {
        AppError::from(err).into()
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_http_statuses() {
        let not_found: AppError = StoreError::not_found("request", 4).into();
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);
        assert_eq!(not_found.to_string(), "Request not found");

        let conflict: AppError = StoreError::Conflict("dup".into()).into();
        assert_eq!(conflict.status(), StatusCode::CONFLICT);

        let db: AppError = StoreError::Database(sqlx::Error::PoolTimedOut).into();
        assert_eq!(db.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn error_envelope_carries_message() {
        let response: ApiResponse<()> = AppError::forbidden("Unauthorized").into();
        assert!(!response.success);
        assert_eq!(response.status_code, 403);
        assert_eq!(response.message, "Unauthorized");
    }
}
