use chrono::{DateTime, Utc};
use mongodb::bson;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Citizen,
    Admin,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,
    pub mobile: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub city_ward: Option<String>,

    pub role: UserRole,

    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,

    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Fresh citizen record for a mobile number that just passed OTP
    /// verification. Profile fields are filled in later.
    pub fn new_citizen(mobile: String) -> Self {
        let now = Utc::now();
        User {
            _id: None,
            mobile,
            name: None,
            address: None,
            city_ward: None,
            role: UserRole::Citizen,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Minimal projection returned alongside the session token.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub mobile: String,
    pub role: UserRole,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: String,
    pub mobile: String,
    pub name: Option<String>,
    pub address: Option<String>,
    pub city_ward: Option<String>,
    pub role: UserRole,
}

impl From<&User> for ProfileResponse {
    fn from(user: &User) -> Self {
        ProfileResponse {
            id: user._id.map(|id| id.to_hex()).unwrap_or_default(),
            mobile: user.mobile.clone(),
            name: user.name.clone(),
            address: user.address.clone(),
            city_ward: user.city_ward.clone(),
            role: user.role,
        }
    }
}

/// JWT session claims. Stateless, 60-minute validity.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub mobile: String,
    pub role: UserRole,
    pub exp: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_serializes_screaming_snake_case() {
        assert_eq!(serde_json::to_string(&UserRole::Citizen).unwrap(), "\"CITIZEN\"");
        assert_eq!(serde_json::to_string(&UserRole::Admin).unwrap(), "\"ADMIN\"");
    }

    #[test]
    fn new_citizen_has_empty_profile() {
        let user = User::new_citizen("+919876543210".to_string());
        assert_eq!(user.role, UserRole::Citizen);
        assert!(user.name.is_none());
        assert!(user.address.is_none());
        assert!(user.city_ward.is_none());
    }
}
