use axum::{
    routing::{get, put},
    Router,
};

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(crate::handlers::user_profile::get_profile))
        .route("/me", put(crate::handlers::user_profile::update_profile))
}
