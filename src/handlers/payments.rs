use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::Json,
    Extension,
};
use chrono::Utc;
use futures_util::TryStreamExt;
use mongodb::bson::{self, doc, oid::ObjectId};
use mongodb::options::ReturnDocument;
use mongodb::Collection;
use serde_json::{json, Value};
use validator::Validate;

use crate::dtos::payment_dtos::{CreateIntentRequest, CreateIntentResponse, ReceiptResponse};
use crate::errors::{AppError, Result};
use crate::models::connection::UtilityConnection;
use crate::models::payment::{Payment, PaymentResponse, PaymentStatus};
use crate::models::user::{Claims, User};
use crate::services::payment_service::{PaymentService, WebhookEvent};
use crate::services::receipt_service;
use crate::state::AppState;

fn payment_service(state: &AppState) -> Result<&PaymentService> {
    state
        .payment_service
        .as_deref()
        .ok_or_else(|| AppError::ServiceUnavailable("Payment service not configured".to_string()))
}

/// Create a provider payment intent for a bill. The provider call is the
/// entire point of this request, so its failure surfaces directly.
pub async fn create_intent(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateIntentRequest>,
) -> Result<Json<CreateIntentResponse>> {
    req.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let service = payment_service(&state)?;
    let user_id = ObjectId::parse_str(&claims.sub)?;

    // A referenced connection must belong to the caller.
    let connection_id = match &req.connection_id {
        Some(raw) => {
            let id = ObjectId::parse_str(raw)?;
            let connections: Collection<UtilityConnection> = state.db.collection("connections");
            connections
                .find_one(doc! { "_id": id, "user_id": user_id })
                .await?
                .ok_or(AppError::DocumentNotFound)?;
            Some(id)
        }
        None => None,
    };

    let user_hex = user_id.to_hex();
    let metadata = [("user_id", user_hex.as_str()), ("utility", req.utility.as_str())];
    let intent = service.create_intent(req.amount_paise, "inr", &metadata).await?;

    let now = Utc::now();
    let payment = Payment {
        _id: None,
        user_id,
        connection_id,
        utility: req.utility,
        amount_paise: req.amount_paise,
        currency: "inr".to_string(),
        provider_intent_id: intent.id,
        status: PaymentStatus::Created,
        receipt_url: None,
        created_at: now,
        updated_at: now,
    };

    let payments: Collection<Payment> = state.db.collection("payments");
    let result = payments.insert_one(&payment).await?;
    let payment_id = result
        .inserted_id
        .as_object_id()
        .map(|id| id.to_hex())
        .unwrap_or_default();

    tracing::info!("Payment intent created for {} paise", req.amount_paise);

    Ok(Json(CreateIntentResponse {
        success: true,
        payment_id,
        client_secret: intent.client_secret,
    }))
}

/// Provider callback. The body is only trusted after its signature checks
/// out against the raw bytes.
pub async fn payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<Value>> {
    let service = payment_service(&state)?;

    let signature = headers
        .get("stripe-signature")
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    if !service.verify_signature(signature, &body) {
        tracing::warn!("Webhook signature verification failed");
        return Err(AppError::Unauthorized);
    }

    let event: WebhookEvent = serde_json::from_str(&body)?;
    let intent_id = event.data.object.id;
    let payments: Collection<Payment> = state.db.collection("payments");
    let now = bson::DateTime::from_chrono(Utc::now());

    match event.event_type.as_str() {
        "payment_intent.succeeded" => {
            let updated = payments
                .find_one_and_update(
                    doc! { "provider_intent_id": &intent_id },
                    doc! { "$set": { "status": "SUCCEEDED", "updated_at": now } },
                )
                .return_document(ReturnDocument::After)
                .await?;

            match updated {
                Some(payment) => {
                    tracing::info!("Payment {} settled", intent_id);
                    attach_receipt(&state, payment).await;
                }
                None => tracing::warn!("Webhook for unknown intent {}", intent_id),
            }
        }
        "payment_intent.payment_failed" => {
            payments
                .update_one(
                    doc! { "provider_intent_id": &intent_id },
                    doc! { "$set": { "status": "FAILED", "updated_at": now } },
                )
                .await?;
            tracing::info!("Payment {} failed", intent_id);
        }
        other => {
            tracing::debug!("Ignoring webhook event type {}", other);
        }
    }

    Ok(Json(json!({ "received": true })))
}

/// Receipt generation is best-effort: a storage or lookup failure leaves
/// the payment settled with no receipt URL.
async fn attach_receipt(state: &AppState, payment: Payment) {
    let Some(storage) = &state.storage_service else {
        return;
    };
    let Some(payment_id) = payment._id else {
        return;
    };

    let users: Collection<User> = state.db.collection("users");
    let user = match users.find_one(doc! { "_id": payment.user_id }).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            tracing::warn!("No user found for settled payment {}", payment_id.to_hex());
            return;
        }
        Err(e) => {
            tracing::warn!("User lookup failed for receipt: {}", e);
            return;
        }
    };

    match receipt_service::generate_receipt(storage, &payment, &user).await {
        Ok(url) => {
            let payments: Collection<Payment> = state.db.collection("payments");
            if let Err(e) = payments
                .update_one(
                    doc! { "_id": payment_id },
                    doc! { "$set": { "receipt_url": &url } },
                )
                .await
            {
                tracing::warn!("Failed to store receipt URL: {}", e);
            }
        }
        Err(e) => tracing::warn!("Receipt generation failed: {}", e),
    }
}

pub async fn list_payments(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<PaymentResponse>>> {
    let user_id = ObjectId::parse_str(&claims.sub)?;
    let payments: Collection<Payment> = state.db.collection("payments");

    let cursor = payments
        .find(doc! { "user_id": user_id })
        .sort(doc! { "created_at": -1 })
        .await?;
    let items: Vec<Payment> = cursor.try_collect().await?;

    Ok(Json(items.iter().map(PaymentResponse::from).collect()))
}

pub async fn get_receipt(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<ReceiptResponse>> {
    let user_id = ObjectId::parse_str(&claims.sub)?;
    let object_id = ObjectId::parse_str(&id)?;
    let payments: Collection<Payment> = state.db.collection("payments");

    let payment = payments
        .find_one(doc! { "_id": object_id, "user_id": user_id })
        .await?
        .ok_or(AppError::DocumentNotFound)?;

    let receipt_url = payment.receipt_url.ok_or(AppError::ReceiptNotAvailable)?;

    Ok(Json(ReceiptResponse {
        success: true,
        receipt_url,
    }))
}
