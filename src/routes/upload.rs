use axum::{routing::post, Router};

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/complaint-photo",
        post(crate::handlers::upload::upload_complaint_photo),
    )
}
