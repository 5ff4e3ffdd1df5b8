use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::{http::Method, middleware as axum_middleware, response::Json, routing::get, Router};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

mod config;
mod database;
mod dtos;
mod errors;
mod handlers;
mod middleware;
mod models;
mod routes;
mod services;
mod state;

use config::{AppConfig, ClassifierConfig, PaymentConfig, SmsConfig, StorageConfig};
use database::connection::get_db_client;
use middleware::auth::{auth_middleware, require_admin};
use services::classifier_service::ClassifierService;
use services::payment_service::PaymentService;
use services::storage_service::StorageService;
use state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let config = AppConfig::from_env();
    let db = get_db_client(&config).await;
    let app_state = initialize_app_state(db, config).await;

    let server_config = app_state.config.clone();
    let app = build_router(app_state);
    start_server(app, &server_config).await;
}

async fn initialize_app_state(db: mongodb::Database, config: AppConfig) -> AppState {
    let mut app_state = AppState::new(db, config, SmsConfig::from_env());

    match ClassifierConfig::from_env() {
        Some(classifier_config) => {
            tracing::info!("Classifier service initialized ({})", classifier_config.model);
            app_state = app_state.with_classifier(Arc::new(ClassifierService::new(classifier_config)));
        }
        None => {
            tracing::warn!("CLASSIFIER_API_KEY not set; complaints will use the fallback classification");
        }
    }

    match PaymentConfig::from_env() {
        Some(payment_config) => {
            tracing::info!("Payment service initialized");
            app_state = app_state.with_payment(Arc::new(PaymentService::new(payment_config)));
        }
        None => {
            tracing::warn!("PAYMENT_SECRET_KEY not set; bill payment endpoints disabled");
        }
    }

    match StorageConfig::from_env() {
        Some(storage_config) => {
            tracing::info!("Storage service initialized");
            app_state = app_state.with_storage(Arc::new(StorageService::new(storage_config)));
        }
        None => {
            tracing::warn!("CLOUDINARY_CLOUD_NAME not set; photo uploads and receipts disabled");
        }
    }

    app_state
}

fn build_router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    let protected = Router::new()
        .nest("/api/complaints", routes::complaints::routes())
        .nest("/api/connections", routes::connections::routes())
        .nest("/api/payments", routes::payments::routes())
        .nest("/api/notifications", routes::notifications::routes())
        .nest("/api/profile", routes::user_profile::routes())
        .nest("/api/uploads", routes::upload::routes())
        .route_layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_middleware,
        ));

    // Admin gate runs inside the session check.
    let admin = Router::new()
        .nest("/api/admin/complaints", routes::complaints::admin_routes())
        .route_layer(axum_middleware::from_fn(require_admin))
        .route_layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_check))
        .route("/api/health", get(api_health_check))
        .nest("/api/auth", routes::auth::routes())
        .nest("/api/track", routes::complaints::tracking_routes())
        .nest("/api/webhooks", routes::payments::webhook_routes())
        .merge(protected)
        .merge(admin)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

async fn start_server(app: Router, config: &AppConfig) {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    tracing::info!("Server starting on {}", addr);

    match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => {
            axum::serve(listener, app).await.expect("Server failed");
        }
        Err(e) => {
            tracing::error!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    }
}

async fn root_handler() -> &'static str {
    "SUVIDHA Citizen Services API"
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn api_health_check(State(state): State<AppState>) -> Json<Value> {
    use mongodb::bson::doc;

    let db_status = match state.db.run_command(doc! { "ping": 1 }).await {
        Ok(_) => "connected",
        Err(_) => "disconnected",
    };

    Json(json!({
        "status": "healthy",
        "database": db_status,
        "classifier": state.classifier_service.is_some(),
        "payments": state.payment_service.is_some(),
        "storage": state.storage_service.is_some(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
