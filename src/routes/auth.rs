use axum::{routing::post, Router};

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/send-otp", post(crate::handlers::auth::send_otp))
        .route("/verify-otp", post(crate::handlers::auth::verify_otp))
}
