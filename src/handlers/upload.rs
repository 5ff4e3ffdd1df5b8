use axum::{extract::Multipart, extract::State, response::Json};
use serde_json::{json, Value};

use crate::errors::{AppError, Result};
use crate::state::AppState;

const MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;

/// Upload a complaint photo and hand back the stored URL, which the kiosk
/// attaches to the complaint it is about to submit.
pub async fn upload_complaint_photo(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Value>> {
    let storage = state
        .storage_service
        .as_ref()
        .ok_or_else(|| AppError::ServiceUnavailable("File storage not configured".to_string()))?;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("photo") {
            continue;
        }

        let data = field.bytes().await?;
        if data.is_empty() {
            return Err(AppError::NoFileProvided);
        }
        if data.len() > MAX_PHOTO_BYTES {
            return Err(AppError::FileTooLarge);
        }

        // Sniff the real content type; the client-declared one is untrusted.
        let is_image = infer::get(&data)
            .map(|kind| kind.mime_type().starts_with("image/"))
            .unwrap_or(false);
        if !is_image {
            return Err(AppError::InvalidFileFormat);
        }

        let (url, _public_id) = storage.upload_image(&data, "complaints").await?;

        return Ok(Json(json!({
            "success": true,
            "url": url,
        })));
    }

    Err(AppError::NoFileProvided)
}
