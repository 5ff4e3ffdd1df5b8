use axum::{
    extract::{Path, State},
    response::Json,
    Extension,
};
use chrono::Utc;
use futures_util::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::Collection;
use serde_json::{json, Value};
use validator::Validate;

use crate::dtos::connection_dtos::CreateConnectionRequest;
use crate::errors::{AppError, Result};
use crate::models::connection::{ConnectionResponse, UtilityConnection};
use crate::models::user::Claims;
use crate::state::AppState;

pub async fn link_connection(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateConnectionRequest>,
) -> Result<Json<ConnectionResponse>> {
    req.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let user_id = ObjectId::parse_str(&claims.sub)?;
    let consumer_number = req.consumer_number.trim().to_string();
    let connections: Collection<UtilityConnection> = state.db.collection("connections");

    let existing = connections
        .find_one(doc! {
            "user_id": user_id,
            "utility": req.utility.as_str(),
            "consumer_number": &consumer_number,
        })
        .await?;

    if existing.is_some() {
        return Err(AppError::DuplicateKey);
    }

    let mut connection = UtilityConnection {
        _id: None,
        user_id,
        utility: req.utility,
        consumer_number,
        nickname: req.nickname,
        created_at: Utc::now(),
    };

    let result = connections.insert_one(&connection).await?;
    connection._id = result.inserted_id.as_object_id();

    Ok(Json(ConnectionResponse::from(&connection)))
}

pub async fn list_connections(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<ConnectionResponse>>> {
    let user_id = ObjectId::parse_str(&claims.sub)?;
    let connections: Collection<UtilityConnection> = state.db.collection("connections");

    let cursor = connections
        .find(doc! { "user_id": user_id })
        .sort(doc! { "created_at": -1 })
        .await?;
    let items: Vec<UtilityConnection> = cursor.try_collect().await?;

    Ok(Json(items.iter().map(ConnectionResponse::from).collect()))
}

pub async fn unlink_connection(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let user_id = ObjectId::parse_str(&claims.sub)?;
    let object_id = ObjectId::parse_str(&id)?;
    let connections: Collection<UtilityConnection> = state.db.collection("connections");

    let result = connections
        .delete_one(doc! { "_id": object_id, "user_id": user_id })
        .await?;

    if result.deleted_count == 0 {
        return Err(AppError::DocumentNotFound);
    }

    Ok(Json(json!({
        "success": true,
        "message": "Connection removed",
    })))
}
