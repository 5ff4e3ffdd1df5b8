use chrono::{DateTime, Utc};
use mongodb::bson;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::models::complaint::Utility;

/// A utility account linked to a citizen, e.g. an electricity meter
/// identified by its consumer number. Used to prefill bill payments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UtilityConnection {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,
    pub user_id: ObjectId,
    pub utility: Utility,
    pub consumer_number: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,

    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ConnectionResponse {
    pub id: String,
    pub utility: Utility,
    pub consumer_number: String,
    pub nickname: Option<String>,
    pub created_at: String,
}

impl From<&UtilityConnection> for ConnectionResponse {
    fn from(c: &UtilityConnection) -> Self {
        ConnectionResponse {
            id: c._id.map(|id| id.to_hex()).unwrap_or_default(),
            utility: c.utility,
            consumer_number: c.consumer_number.clone(),
            nickname: c.nickname.clone(),
            created_at: c.created_at.to_rfc3339(),
        }
    }
}
