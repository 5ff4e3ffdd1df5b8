use serde::Deserialize;
use validator::Validate;

use crate::models::complaint::Utility;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateConnectionRequest {
    pub utility: Utility,

    #[validate(length(min = 4, max = 30, message = "Consumer number must be 4-30 characters"))]
    pub consumer_number: String,

    #[validate(length(max = 50, message = "Nickname too long"))]
    pub nickname: Option<String>,
}
