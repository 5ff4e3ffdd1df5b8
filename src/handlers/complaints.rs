use axum::{
    extract::{Path, Query, State},
    response::Json,
    Extension,
};
use chrono::{Duration, Utc};
use futures_util::TryStreamExt;
use mongodb::bson::{self, doc, oid::ObjectId, Document};
use mongodb::options::ReturnDocument;
use mongodb::Collection;
use uuid::Uuid;
use validator::Validate;

use crate::dtos::complaint_dtos::{AdminComplaintQuery, CreateComplaintRequest, UpdateStatusRequest};
use crate::errors::{AppError, Result};
use crate::models::complaint::{
    Complaint, ComplaintResponse, ComplaintStatus, TrackingResponse,
};
use crate::models::notification::Notification;
use crate::models::user::{Claims, User, UserRole};
use crate::services::classifier_service::Classification;
use crate::state::AppState;

/// An open complaint by the same user for the same utility inside this
/// window is treated as a duplicate. Pure time-and-key policy; the
/// classifier has no say in it.
const DUP_WINDOW_DAYS: i64 = 7;

const OPEN_STATUSES: [&str; 2] = ["SUBMITTED", "IN_PROGRESS"];

fn new_complaint_number() -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("SUV-{}", id[..8].to_uppercase())
}

pub async fn create_complaint(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateComplaintRequest>,
) -> Result<Json<ComplaintResponse>> {
    req.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let user_id = ObjectId::parse_str(&claims.sub)?;
    let complaints: Collection<Complaint> = state.db.collection("complaints");

    let window_start = bson::DateTime::from_chrono(Utc::now() - Duration::days(DUP_WINDOW_DAYS));
    let duplicate = complaints
        .find_one(doc! {
            "user_id": user_id,
            "utility": req.utility.as_str(),
            "status": { "$in": OPEN_STATUSES.to_vec() },
            "created_at": { "$gte": window_start },
        })
        .await?;

    if let Some(existing) = duplicate {
        return Err(AppError::DuplicateComplaint(existing.complaint_number));
    }

    let classification = match &state.classifier_service {
        Some(classifier) => classifier.classify(req.utility, &req.description).await,
        None => Classification::fallback(),
    };

    // Kiosk-selected category wins; the classifier fills the gap.
    let category = req
        .category
        .map(|c| c.trim().to_ascii_uppercase())
        .filter(|c| !c.is_empty())
        .unwrap_or(classification.category);

    let now = Utc::now();
    let mut complaint = Complaint {
        _id: None,
        complaint_number: new_complaint_number(),
        user_id,
        utility: req.utility,
        category,
        priority: classification.priority,
        description: req.description,
        location: req.location,
        photo_url: req.photo_url,
        status: ComplaintStatus::Submitted,
        created_at: now,
        updated_at: now,
    };

    let result = complaints.insert_one(&complaint).await?;
    complaint._id = result.inserted_id.as_object_id();

    tracing::info!(
        "Complaint {} registered ({} / {:?})",
        complaint.complaint_number,
        complaint.utility.as_str(),
        complaint.priority
    );

    notify_user(
        &state,
        user_id,
        &claims.mobile,
        "complaint_created",
        "Complaint registered",
        &format!(
            "Your SUVIDHA complaint {} has been registered. Use this number to track its status.",
            complaint.complaint_number
        ),
    )
    .await;

    Ok(Json(ComplaintResponse::from(&complaint)))
}

pub async fn list_my_complaints(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<ComplaintResponse>>> {
    let user_id = ObjectId::parse_str(&claims.sub)?;
    let complaints: Collection<Complaint> = state.db.collection("complaints");

    let cursor = complaints
        .find(doc! { "user_id": user_id })
        .sort(doc! { "created_at": -1 })
        .await?;
    let items: Vec<Complaint> = cursor.try_collect().await?;

    Ok(Json(items.iter().map(ComplaintResponse::from).collect()))
}

pub async fn get_complaint(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<ComplaintResponse>> {
    let object_id = ObjectId::parse_str(&id)?;
    let complaints: Collection<Complaint> = state.db.collection("complaints");

    let complaint = complaints
        .find_one(doc! { "_id": object_id })
        .await?
        .ok_or(AppError::DocumentNotFound)?;

    // Citizens may only read their own complaints.
    if claims.role != UserRole::Admin && complaint.user_id.to_hex() != claims.sub {
        return Err(AppError::Forbidden);
    }

    Ok(Json(ComplaintResponse::from(&complaint)))
}

/// Public kiosk tracking: status projection by complaint number, no auth.
pub async fn track_complaint(
    State(state): State<AppState>,
    Path(number): Path<String>,
) -> Result<Json<TrackingResponse>> {
    let number = number.trim().to_ascii_uppercase();
    let complaints: Collection<Complaint> = state.db.collection("complaints");

    let complaint = complaints
        .find_one(doc! { "complaint_number": &number })
        .await?
        .ok_or(AppError::DocumentNotFound)?;

    Ok(Json(TrackingResponse::from(&complaint)))
}

pub async fn admin_list_complaints(
    State(state): State<AppState>,
    Query(query): Query<AdminComplaintQuery>,
) -> Result<Json<Vec<ComplaintResponse>>> {
    let complaints: Collection<Complaint> = state.db.collection("complaints");

    let mut filter = Document::new();
    if let Some(status) = query.status {
        filter.insert("status", status.as_str());
    }
    if let Some(utility) = query.utility {
        filter.insert("utility", utility.as_str());
    }

    let cursor = complaints.find(filter).sort(doc! { "created_at": -1 }).await?;
    let items: Vec<Complaint> = cursor.try_collect().await?;

    Ok(Json(items.iter().map(ComplaintResponse::from).collect()))
}

pub async fn admin_update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<ComplaintResponse>> {
    let object_id = ObjectId::parse_str(&id)?;
    let complaints: Collection<Complaint> = state.db.collection("complaints");

    let updated = complaints
        .find_one_and_update(
            doc! { "_id": object_id },
            doc! { "$set": {
                "status": req.status.as_str(),
                "updated_at": bson::DateTime::from_chrono(Utc::now()),
            }},
        )
        .return_document(ReturnDocument::After)
        .await?
        .ok_or(AppError::DocumentNotFound)?;

    tracing::info!(
        "Complaint {} moved to {}",
        updated.complaint_number,
        updated.status.as_str()
    );

    let users: Collection<User> = state.db.collection("users");
    if let Ok(Some(user)) = users.find_one(doc! { "_id": updated.user_id }).await {
        notify_user(
            &state,
            updated.user_id,
            &user.mobile,
            "status_update",
            "Complaint status updated",
            &format!(
                "Your SUVIDHA complaint {} is now {}.",
                updated.complaint_number,
                updated.status.as_str()
            ),
        )
        .await;
    }

    Ok(Json(ComplaintResponse::from(&updated)))
}

/// Best-effort fan-out: a persisted notification row plus an SMS. Neither
/// failure fails the request that triggered it.
async fn notify_user(
    state: &AppState,
    user_id: ObjectId,
    mobile: &str,
    notification_type: &str,
    title: &str,
    body: &str,
) {
    let notifications: Collection<Notification> = state.db.collection("notifications");
    let row = Notification {
        _id: None,
        user_id,
        notification_type: notification_type.to_string(),
        title: title.to_string(),
        body: body.to_string(),
        is_read: false,
        created_at: Utc::now(),
    };

    if let Err(e) = notifications.insert_one(row).await {
        tracing::warn!("Failed to persist notification: {}", e);
    }

    if let Err(e) = state.sms_service.send_text(mobile, body).await {
        tracing::warn!("Notification SMS failed: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complaint_numbers_have_kiosk_format() {
        let number = new_complaint_number();
        assert!(number.starts_with("SUV-"));
        assert_eq!(number.len(), 12);
        assert!(number[4..].chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn complaint_numbers_are_distinct() {
        let a = new_complaint_number();
        let b = new_complaint_number();
        assert_ne!(a, b);
    }
}
