use axum::{
    routing::{get, put},
    Router,
};

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(crate::handlers::notifications::list_notifications))
        .route("/read", put(crate::handlers::notifications::mark_all_read))
}
