use reqwest::multipart;
use serde_json::Value;

use crate::config::StorageConfig;
use crate::errors::{AppError, Result};

/// Cloudinary-style signed uploads. Complaint photos go up as images,
/// receipts as raw documents; both come back as a public URL.
#[derive(Clone)]
pub struct StorageService {
    config: StorageConfig,
    client: reqwest::Client,
}

impl StorageService {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    pub async fn upload_image(&self, data: &[u8], folder: &str) -> Result<(String, String)> {
        self.upload(data, folder, "image", "photo.jpg", "image/jpeg").await
    }

    pub async fn upload_raw(&self, data: &[u8], folder: &str, file_name: &str) -> Result<(String, String)> {
        self.upload(data, folder, "raw", file_name, "text/plain").await
    }

    async fn upload(
        &self,
        data: &[u8],
        folder: &str,
        resource_type: &str,
        file_name: &str,
        mime: &str,
    ) -> Result<(String, String)> {
        let timestamp = chrono::Utc::now().timestamp().to_string();

        // Signature covers the signed params in alphabetical order, then the secret.
        let signature_data = format!("folder={}&timestamp={}{}", folder, timestamp, self.config.api_secret);
        let signature = format!("{:x}", md5::compute(signature_data));

        let upload_url = format!(
            "https://api.cloudinary.com/v1_1/{}/{}/upload",
            self.config.cloud_name, resource_type
        );

        let form = multipart::Form::new()
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp)
            .text("signature", signature)
            .text("folder", folder.to_string())
            .part(
                "file",
                multipart::Part::bytes(data.to_vec())
                    .file_name(file_name.to_string())
                    .mime_str(mime)
                    .map_err(|e| AppError::storage(e.to_string()))?,
            );

        let response = self
            .client
            .post(&upload_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::storage(format!("upload failed: {}", e)))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_else(|_| "unknown error".to_string());
            return Err(AppError::storage(format!("storage API error: {}", error_text)));
        }

        let result: Value = response
            .json()
            .await
            .map_err(|e| AppError::storage(format!("failed to parse response: {}", e)))?;

        if let Some(error) = result.get("error") {
            let message = error["message"].as_str().unwrap_or("unknown storage error");
            return Err(AppError::storage(message.to_string()));
        }

        let secure_url = result["secure_url"]
            .as_str()
            .ok_or_else(|| AppError::storage("no secure URL in response"))?
            .to_string();

        let public_id = result["public_id"]
            .as_str()
            .ok_or_else(|| AppError::storage("no public ID in response"))?
            .to_string();

        Ok((secure_url, public_id))
    }
}
