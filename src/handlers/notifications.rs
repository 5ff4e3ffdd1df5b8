use axum::{extract::State, response::Json, Extension};
use futures_util::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::Collection;
use serde_json::{json, Value};

use crate::errors::Result;
use crate::models::notification::{Notification, NotificationResponse};
use crate::models::user::Claims;
use crate::state::AppState;

pub async fn list_notifications(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<NotificationResponse>>> {
    let user_id = ObjectId::parse_str(&claims.sub)?;
    let notifications: Collection<Notification> = state.db.collection("notifications");

    let cursor = notifications
        .find(doc! { "user_id": user_id })
        .sort(doc! { "created_at": -1 })
        .limit(50)
        .await?;
    let items: Vec<Notification> = cursor.try_collect().await?;

    Ok(Json(items.iter().map(NotificationResponse::from).collect()))
}

pub async fn mark_all_read(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Value>> {
    let user_id = ObjectId::parse_str(&claims.sub)?;
    let notifications: Collection<Notification> = state.db.collection("notifications");

    let result = notifications
        .update_many(
            doc! { "user_id": user_id, "is_read": false },
            doc! { "$set": { "is_read": true } },
        )
        .await?;

    Ok(Json(json!({
        "success": true,
        "updated": result.modified_count,
    })))
}
