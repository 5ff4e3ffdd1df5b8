use axum::{extract::State, response::Json, Extension};
use chrono::Utc;
use mongodb::bson::{self, doc, oid::ObjectId, Document};
use mongodb::options::ReturnDocument;
use mongodb::Collection;
use validator::Validate;

use crate::dtos::profile_dtos::UpdateProfileRequest;
use crate::errors::{AppError, Result};
use crate::models::user::{Claims, ProfileResponse, User};
use crate::state::AppState;

pub async fn get_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ProfileResponse>> {
    let user_id = ObjectId::parse_str(&claims.sub)?;
    let users: Collection<User> = state.db.collection("users");

    let user = users
        .find_one(doc! { "_id": user_id })
        .await?
        .ok_or(AppError::DocumentNotFound)?;

    Ok(Json(ProfileResponse::from(&user)))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>> {
    req.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let user_id = ObjectId::parse_str(&claims.sub)?;
    let users: Collection<User> = state.db.collection("users");

    let mut updates = Document::new();
    if let Some(name) = req.name {
        updates.insert("name", name.trim());
    }
    if let Some(address) = req.address {
        updates.insert("address", address.trim());
    }
    if let Some(city_ward) = req.city_ward {
        updates.insert("city_ward", city_ward.trim());
    }

    if updates.is_empty() {
        return Err(AppError::invalid_data("No profile fields provided"));
    }
    updates.insert("updated_at", bson::DateTime::from_chrono(Utc::now()));

    let user = users
        .find_one_and_update(doc! { "_id": user_id }, doc! { "$set": updates })
        .return_document(ReturnDocument::After)
        .await?
        .ok_or(AppError::DocumentNotFound)?;

    Ok(Json(ProfileResponse::from(&user)))
}
