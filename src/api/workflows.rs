use axum::{
    routing::{get, post, put},
    Router,
};

use crate::app_state::AppState;
use crate::db::queries::workflows::*;

pub fn workflow_routes() -> Router<AppState> {
    Router::new()
        .route("/workflows", get(get_workflows).post(create_workflow))
        .route("/workflows/onboarding", post(create_onboarding_workflow))
        .route("/workflows/employee/{employee_id}", get(get_employee_workflows))
        .route("/workflows/{workflow_id}", get(get_workflow))
        .route("/workflows/{workflow_id}/status", put(update_workflow_status_handler))
}
