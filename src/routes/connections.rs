use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(crate::handlers::connections::link_connection))
        .route("/", get(crate::handlers::connections::list_connections))
        .route("/:id", delete(crate::handlers::connections::unlink_connection))
}
