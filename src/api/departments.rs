use axum::{routing::get, Router};

use crate::app_state::AppState;
use crate::db::queries::departments::*;

pub fn department_routes() -> Router<AppState> {
    Router::new()
        .route("/departments", get(get_departments).post(create_department))
        .route(
            "/departments/{department_id}",
            get(get_department).put(update_department).delete(delete_department),
        )
}
