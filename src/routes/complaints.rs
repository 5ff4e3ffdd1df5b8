use axum::{
    routing::{get, post, put},
    Router,
};

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(crate::handlers::complaints::create_complaint))
        .route("/", get(crate::handlers::complaints::list_my_complaints))
        .route("/:id", get(crate::handlers::complaints::get_complaint))
}

/// Kiosk tracking screen, no auth. Nested under /api/track.
pub fn tracking_routes() -> Router<AppState> {
    Router::new().route("/:number", get(crate::handlers::complaints::track_complaint))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(crate::handlers::complaints::admin_list_complaints))
        .route("/:id/status", put(crate::handlers::complaints::admin_update_status))
}
