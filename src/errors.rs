// src/errors.rs
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("MongoDB error: {0}")]
    MongoDB(#[from] mongodb::error::Error),

    #[error("Multipart error: {0}")]
    Multipart(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid ObjectId: {0}")]
    InvalidObjectId(String),

    #[error("No file provided")]
    NoFileProvided,

    #[error("Invalid file format")]
    InvalidFileFormat,

    #[error("File too large")]
    FileTooLarge,

    #[error("Authentication failed")]
    Unauthorized,

    #[error("Invalid OTP")]
    InvalidOtp,

    #[error("OTP expired")]
    OtpExpired,

    #[error("OTP locked due to too many attempts")]
    OtpLocked,

    #[error("Access denied")]
    Forbidden,

    #[error("OTP not found or expired")]
    OtpNotFound,

    #[error("Document not found")]
    DocumentNotFound,

    #[error("Receipt not available")]
    ReceiptNotAvailable,

    #[error("Duplicate complaint: {0}")]
    DuplicateComplaint(String),

    #[error("Duplicate entry")]
    DuplicateKey,

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("SMS delivery failed: {0}")]
    SmsDelivery(String),

    #[error("Payment provider error: {0}")]
    PaymentProvider(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("External API error: {0}")]
    ExternalApi(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Service error: {0}")]
    ServiceError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::MongoDB(e) => {
                tracing::error!("Database error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
            }
            AppError::Multipart(_) => (StatusCode::BAD_REQUEST, "Invalid multipart data".to_string()),
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::InvalidObjectId(_) => (StatusCode::BAD_REQUEST, "Invalid ID format".to_string()),
            AppError::NoFileProvided => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::InvalidFileFormat => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::FileTooLarge => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::InvalidOtp => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::OtpExpired => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::OtpLocked => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::Forbidden => (StatusCode::FORBIDDEN, self.to_string()),
            AppError::OtpNotFound => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::DocumentNotFound => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::ReceiptNotAvailable => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::DuplicateComplaint(number) => (
                StatusCode::CONFLICT,
                format!("An open complaint already exists for this utility: {}", number),
            ),
            AppError::DuplicateKey => (StatusCode::CONFLICT, "Duplicate entry".to_string()),
            AppError::RateLimitExceeded => (StatusCode::TOO_MANY_REQUESTS, self.to_string()),
            AppError::SmsDelivery(e) => {
                tracing::error!("SMS delivery failed: {}", e);
                (StatusCode::BAD_GATEWAY, "Failed to send OTP".to_string())
            }
            AppError::PaymentProvider(e) => {
                tracing::error!("Payment provider error: {}", e);
                (StatusCode::BAD_GATEWAY, "Payment provider error".to_string())
            }
            AppError::StorageError(e) => {
                tracing::error!("Storage error: {}", e);
                (StatusCode::BAD_GATEWAY, "File storage error".to_string())
            }
            AppError::ExternalApi(e) => {
                tracing::error!("External API error: {}", e);
                (StatusCode::BAD_GATEWAY, "External API error".to_string())
            }
            AppError::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
            AppError::ServiceError(e) => {
                tracing::error!("Service error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = Json(json!({
            "success": false,
            "message": message,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        }));

        (status, body).into_response()
    }
}

// Manual From implementations
impl From<axum::extract::multipart::MultipartError> for AppError {
    fn from(err: axum::extract::multipart::MultipartError) -> Self {
        AppError::Multipart(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::ValidationError(format!("JSON parsing error: {}", err))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::ExternalApi(format!("HTTP request failed: {}", err))
    }
}

impl From<mongodb::bson::oid::Error> for AppError {
    fn from(err: mongodb::bson::oid::Error) -> Self {
        AppError::InvalidObjectId(err.to_string())
    }
}

// Helper conversion functions
impl AppError {
    pub fn invalid_data(msg: impl Into<String>) -> Self {
        AppError::ValidationError(msg.into())
    }

    pub fn external_api(msg: impl Into<String>) -> Self {
        AppError::ExternalApi(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        AppError::StorageError(msg.into())
    }

    pub fn payment(msg: impl Into<String>) -> Self {
        AppError::PaymentProvider(msg.into())
    }

    pub fn service(msg: impl Into<String>) -> Self {
        AppError::ServiceError(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn otp_errors_map_to_expected_statuses() {
        assert_eq!(status_of(AppError::OtpNotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_of(AppError::OtpExpired), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(AppError::OtpLocked), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(AppError::InvalidOtp), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(AppError::RateLimitExceeded), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn domain_errors_map_to_expected_statuses() {
        assert_eq!(status_of(AppError::Forbidden), StatusCode::FORBIDDEN);
        assert_eq!(
            status_of(AppError::DuplicateComplaint("SUV-1234ABCD".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(status_of(AppError::SmsDelivery("timeout".into())), StatusCode::BAD_GATEWAY);
        assert_eq!(
            status_of(AppError::ValidationError("bad mobile".into())),
            StatusCode::BAD_REQUEST
        );
    }
}
