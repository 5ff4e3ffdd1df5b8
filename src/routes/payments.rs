use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/intent", post(crate::handlers::payments::create_intent))
        .route("/", get(crate::handlers::payments::list_payments))
        .route("/:id/receipt", get(crate::handlers::payments::get_receipt))
}

/// Provider callback, authenticated by signature rather than session.
/// Nested under /api/webhooks.
pub fn webhook_routes() -> Router<AppState> {
    Router::new().route("/payment", post(crate::handlers::payments::payment_webhook))
}
