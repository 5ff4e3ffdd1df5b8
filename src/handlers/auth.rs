use axum::{extract::State, response::Json};
use mongodb::bson::doc;
use mongodb::{Collection, Database};
use validator::Validate;

use crate::dtos::auth_dtos::{SendOtpRequest, SendOtpResponse, VerifyOtpRequest, VerifyOtpResponse};
use crate::errors::{AppError, Result};
use crate::middleware::auth::{session_claims, sign_token};
use crate::models::user::{User, UserResponse};
use crate::services::otp_service::mask_mobile;
use crate::state::AppState;

/// Issue a code and dispatch it over SMS. The record is persisted before
/// dispatch, so a failed send surfaces as a delivery error while the code
/// stays valid for a resend.
pub async fn send_otp(
    State(state): State<AppState>,
    Json(req): Json<SendOtpRequest>,
) -> Result<Json<SendOtpResponse>> {
    req.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let (mobile, code) = state.otp_service.issue_code(&req.mobile).await?;
    state.sms_service.send_otp(&mobile, &code).await?;

    tracing::info!("OTP issued for {}", mask_mobile(&mobile));

    Ok(Json(SendOtpResponse {
        success: true,
        message: "OTP sent".to_string(),
    }))
}

/// Verify the code, then mint a session: find-or-create the user for the
/// normalized number and sign a 60-minute token.
pub async fn verify_otp(
    State(state): State<AppState>,
    Json(req): Json<VerifyOtpRequest>,
) -> Result<Json<VerifyOtpResponse>> {
    req.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let verified = state.otp_service.verify_code(&req.mobile, &req.otp).await?;
    if !verified {
        return Err(AppError::InvalidOtp);
    }

    let mobile = state.otp_service.normalize(&req.mobile)?;
    let user = find_or_create_user(&state.db, &mobile).await?;
    let user_id = user
        ._id
        .ok_or_else(|| AppError::service("User record missing id"))?;

    let claims = session_claims(&user_id, &user.mobile, user.role);
    let token = sign_token(&claims, &state.config.jwt_secret)?;

    tracing::info!("Session issued for {}", mask_mobile(&mobile));

    Ok(Json(VerifyOtpResponse {
        success: true,
        token,
        user: UserResponse {
            id: user_id.to_hex(),
            mobile: user.mobile,
            role: user.role,
        },
    }))
}

async fn find_or_create_user(db: &Database, mobile: &str) -> Result<User> {
    let users: Collection<User> = db.collection("users");

    if let Some(user) = users.find_one(doc! { "mobile": mobile }).await? {
        return Ok(user);
    }

    let mut user = User::new_citizen(mobile.to_string());
    let result = users.insert_one(&user).await?;
    user._id = result.inserted_id.as_object_id();

    tracing::info!("Created citizen account for {}", mask_mobile(mobile));
    Ok(user)
}
