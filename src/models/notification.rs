use chrono::{DateTime, Utc};
use mongodb::bson;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,
    pub user_id: ObjectId,

    /// "complaint_created" or "status_update"
    pub notification_type: String,
    pub title: String,
    pub body: String,
    pub is_read: bool,

    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct NotificationResponse {
    pub id: String,
    pub notification_type: String,
    pub title: String,
    pub body: String,
    pub is_read: bool,
    pub created_at: String,
}

impl From<&Notification> for NotificationResponse {
    fn from(n: &Notification) -> Self {
        NotificationResponse {
            id: n._id.map(|id| id.to_hex()).unwrap_or_default(),
            notification_type: n.notification_type.clone(),
            title: n.title.clone(),
            body: n.body.clone(),
            is_read: n.is_read,
            created_at: n.created_at.to_rfc3339(),
        }
    }
}
