use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::user::UserResponse;

#[derive(Debug, Deserialize, Validate)]
pub struct SendOtpRequest {
    #[validate(length(min = 10, max = 14, message = "Mobile number must be 10-13 digits"))]
    pub mobile: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct VerifyOtpRequest {
    #[validate(length(min = 10, max = 14, message = "Mobile number must be 10-13 digits"))]
    pub mobile: String,

    #[validate(length(min = 6, max = 6, message = "OTP must be 6 digits"))]
    pub otp: String,
}

#[derive(Debug, Serialize)]
pub struct SendOtpResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyOtpResponse {
    pub success: bool,
    pub token: String,
    pub user: UserResponse,
}
