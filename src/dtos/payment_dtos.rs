use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::complaint::Utility;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateIntentRequest {
    /// Smallest currency unit; one rupee minimum.
    #[validate(range(min = 100, max = 10_000_000, message = "Amount out of range"))]
    pub amount_paise: i64,

    pub utility: Utility,

    pub connection_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateIntentResponse {
    pub success: bool,
    pub payment_id: String,
    pub client_secret: String,
}

#[derive(Debug, Serialize)]
pub struct ReceiptResponse {
    pub success: bool,
    pub receipt_url: String,
}
