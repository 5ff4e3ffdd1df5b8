use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 2, max = 100, message = "Name must be 2-100 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 300, message = "Address too long"))]
    pub address: Option<String>,

    #[validate(length(max = 100, message = "Ward too long"))]
    pub city_ward: Option<String>,
}
