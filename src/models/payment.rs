use chrono::{DateTime, Utc};
use mongodb::bson;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::models::complaint::Utility;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Created,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,
    pub user_id: ObjectId,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_id: Option<ObjectId>,

    pub utility: Utility,

    /// Amount in the smallest currency unit (paise).
    pub amount_paise: i64,
    pub currency: String,

    /// Intent id assigned by the payment provider; the webhook keys on it.
    pub provider_intent_id: String,
    pub status: PaymentStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt_url: Option<String>,

    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,

    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub id: String,
    pub utility: Utility,
    pub amount_paise: i64,
    pub currency: String,
    pub status: PaymentStatus,
    pub receipt_url: Option<String>,
    pub created_at: String,
}

impl From<&Payment> for PaymentResponse {
    fn from(p: &Payment) -> Self {
        PaymentResponse {
            id: p._id.map(|id| id.to_hex()).unwrap_or_default(),
            utility: p.utility,
            amount_paise: p.amount_paise,
            currency: p.currency.clone(),
            status: p.status,
            receipt_url: p.receipt_url.clone(),
            created_at: p.created_at.to_rfc3339(),
        }
    }
}
