use chrono::{DateTime, Utc};
use mongodb::bson;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Live OTP record, at most one per normalized mobile number.
///
/// The record's existence is the only state signal: expiry, lockout and
/// successful verification all delete it. The plaintext code is never
/// persisted, only its bcrypt hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpRecord {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,
    pub mobile: String,
    pub code_hash: String,
    pub attempts: i32,

    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub expires_at: DateTime<Utc>,

    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

/// One row per send-otp call, used for the per-number trailing-hour
/// rate limit. Persisted so the limit holds across processes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpRequestLog {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,
    pub mobile: String,

    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub requested_at: DateTime<Utc>,
}
