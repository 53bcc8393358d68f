use axum::{
    routing::{get, post},
    Router,
};

use crate::app_state::AppState;
use crate::db::queries::employees::*;

pub fn employee_routes() -> Router<AppState> {
    Router::new()
        .route("/employees", get(get_employees).post(create_employee))
        .route("/employees/nextId", get(get_next_employee_id))
        .route(
            "/employees/{employee_id}",
            get(get_employee).put(update_employee).delete(delete_employee),
        )
        .route("/employees/{employee_id}/with-details", get(get_employee_with_details))
        .route("/employees/{employee_id}/transfer", post(transfer_employee))
}
