use axum::{routing::get, Router};

use crate::app_state::AppState;
use crate::db::queries::requests::*;

pub fn request_routes() -> Router<AppState> {
    Router::new()
        .route("/requests", get(get_requests).post(create_request))
        .route(
            "/requests/{request_id}",
            get(get_request).put(update_request).delete(delete_request),
        )
}
