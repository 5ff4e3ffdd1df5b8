use reqwest::Client;

use crate::config::SmsConfig;
use crate::errors::{AppError, Result};
use crate::services::otp_service::{mask_mobile, OTP_TTL_MINUTES};

#[derive(Clone)]
pub struct SmsService {
    config: SmsConfig,
    client: Client,
}

impl SmsService {
    pub fn new(config: SmsConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    pub async fn send_otp(&self, mobile: &str, code: &str) -> Result<()> {
        let message = format!(
            "Your SUVIDHA verification code is {}. Valid for {} minutes.",
            code, OTP_TTL_MINUTES
        );
        self.send_text(mobile, &message).await
    }

    /// Free-text notification (complaint confirmations, status updates).
    pub async fn send_text(&self, mobile: &str, body: &str) -> Result<()> {
        let url = format!(
            "https://api.twilio.com/2010-04-01/Accounts/{}/Messages.json",
            self.config.account_sid
        );

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&[
                ("To", mobile),
                ("From", self.config.from_number.as_str()),
                ("Body", body),
            ])
            .send()
            .await
            .map_err(|e| AppError::SmsDelivery(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            tracing::info!("SMS dispatched to {}", mask_mobile(mobile));
            Ok(())
        } else {
            let error_body = response.text().await.unwrap_or_default();
            Err(AppError::SmsDelivery(format!("provider returned {}: {}", status, error_body)))
        }
    }
}
