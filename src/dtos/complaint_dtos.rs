use serde::Deserialize;
use validator::Validate;

use crate::models::complaint::{ComplaintStatus, Utility};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateComplaintRequest {
    pub utility: Utility,

    #[validate(length(min = 10, max = 1000, message = "Description must be 10-1000 characters"))]
    pub description: String,

    #[validate(length(min = 3, max = 200, message = "Location must be 3-200 characters"))]
    pub location: String,

    /// Kiosk-selected category. When present it wins over the classifier.
    #[validate(length(min = 2, max = 60, message = "Category must be 2-60 characters"))]
    pub category: Option<String>,

    #[validate(length(max = 500, message = "Photo URL too long"))]
    pub photo_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: ComplaintStatus,
}

#[derive(Debug, Deserialize)]
pub struct AdminComplaintQuery {
    pub status: Option<ComplaintStatus>,
    pub utility: Option<Utility>,
}
