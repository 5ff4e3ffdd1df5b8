use chrono::{DateTime, Utc};
use mongodb::bson;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Utility {
    Electricity,
    Water,
    Gas,
    Waste,
    Municipal,
}

impl Utility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Utility::Electricity => "ELECTRICITY",
            Utility::Water => "WATER",
            Utility::Gas => "GAS",
            Utility::Waste => "WASTE",
            Utility::Municipal => "MUNICIPAL",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LOW" => Some(Priority::Low),
            "MEDIUM" => Some(Priority::Medium),
            "HIGH" => Some(Priority::High),
            "URGENT" => Some(Priority::Urgent),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplaintStatus {
    Submitted,
    InProgress,
    Resolved,
    Rejected,
}

impl ComplaintStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComplaintStatus::Submitted => "SUBMITTED",
            ComplaintStatus::InProgress => "IN_PROGRESS",
            ComplaintStatus::Resolved => "RESOLVED",
            ComplaintStatus::Rejected => "REJECTED",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Complaint {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    /// Human-readable tracking number shown on the kiosk, e.g. SUV-1A2B3C4D.
    pub complaint_number: String,
    pub user_id: ObjectId,
    pub utility: Utility,
    pub category: String,
    pub priority: Priority,
    pub description: String,
    pub location: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,

    pub status: ComplaintStatus,

    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,

    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ComplaintResponse {
    pub id: String,
    pub complaint_number: String,
    pub utility: Utility,
    pub category: String,
    pub priority: Priority,
    pub description: String,
    pub location: String,
    pub photo_url: Option<String>,
    pub status: ComplaintStatus,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Complaint> for ComplaintResponse {
    fn from(c: &Complaint) -> Self {
        ComplaintResponse {
            id: c._id.map(|id| id.to_hex()).unwrap_or_default(),
            complaint_number: c.complaint_number.clone(),
            utility: c.utility,
            category: c.category.clone(),
            priority: c.priority,
            description: c.description.clone(),
            location: c.location.clone(),
            photo_url: c.photo_url.clone(),
            status: c.status,
            created_at: c.created_at.to_rfc3339(),
            updated_at: c.updated_at.to_rfc3339(),
        }
    }
}

/// Status-only projection for the public tracking screen. No PII.
#[derive(Debug, Serialize)]
pub struct TrackingResponse {
    pub complaint_number: String,
    pub utility: Utility,
    pub status: ComplaintStatus,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Complaint> for TrackingResponse {
    fn from(c: &Complaint) -> Self {
        TrackingResponse {
            complaint_number: c.complaint_number.clone(),
            utility: c.utility,
            status: c.status,
            created_at: c.created_at.to_rfc3339(),
            updated_at: c.updated_at.to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utility_serializes_screaming_snake_case() {
        assert_eq!(serde_json::to_string(&Utility::Electricity).unwrap(), "\"ELECTRICITY\"");
        assert_eq!(serde_json::to_string(&Utility::Municipal).unwrap(), "\"MUNICIPAL\"");
    }

    #[test]
    fn status_round_trips_through_serde() {
        let status: ComplaintStatus = serde_json::from_str("\"IN_PROGRESS\"").unwrap();
        assert_eq!(status, ComplaintStatus::InProgress);
        assert_eq!(status.as_str(), "IN_PROGRESS");
    }

    #[test]
    fn priority_parse_is_case_insensitive() {
        assert_eq!(Priority::parse("high"), Some(Priority::High));
        assert_eq!(Priority::parse(" URGENT "), Some(Priority::Urgent));
        assert_eq!(Priority::parse("critical"), None);
    }
}
