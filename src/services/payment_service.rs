use std::time::Duration;

use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::Deserialize;
use sha2::Sha256;

use crate::config::PaymentConfig;
use crate::errors::{AppError, Result};

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
}

/// Webhook envelope. Only the event type and the intent id are trusted,
/// and only after the signature check passes.
#[derive(Debug, Deserialize)]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: WebhookData,
}

#[derive(Debug, Deserialize)]
pub struct WebhookData {
    pub object: WebhookObject,
}

#[derive(Debug, Deserialize)]
pub struct WebhookObject {
    pub id: String,
}

/// Verify a `t=<unix>,v1=<hex hmac>` signature header against the raw
/// request body. The HMAC-SHA256 input is `"<t>.<body>"`; comparison is
/// constant-time via the Mac verifier.
pub fn verify_webhook_signature(secret: &str, header: &str, payload: &str) -> bool {
    let mut timestamp: Option<&str> = None;
    let mut candidates: Vec<&str> = Vec::new();

    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = Some(value),
            Some(("v1", value)) => candidates.push(value),
            _ => {}
        }
    }

    let Some(timestamp) = timestamp else {
        return false;
    };
    if candidates.is_empty() {
        return false;
    }

    let signed_payload = format!("{}.{}", timestamp, payload);

    candidates.into_iter().any(|candidate| {
        let Ok(expected) = hex::decode(candidate) else {
            return false;
        };
        let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
            return false;
        };
        mac.update(signed_payload.as_bytes());
        mac.verify_slice(&expected).is_ok()
    })
}

#[derive(Clone)]
pub struct PaymentService {
    config: PaymentConfig,
    client: Client,
}

impl PaymentService {
    pub fn new(config: PaymentConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        PaymentService { config, client }
    }

    /// Create a payment intent with the provider. This call is the entire
    /// purpose of the request that triggers it, so failures surface
    /// directly instead of degrading.
    pub async fn create_intent(
        &self,
        amount_paise: i64,
        currency: &str,
        metadata: &[(&str, &str)],
    ) -> Result<PaymentIntent> {
        let url = format!("{}/payment_intents", self.config.api_base);

        let mut form: Vec<(String, String)> = vec![
            ("amount".to_string(), amount_paise.to_string()),
            ("currency".to_string(), currency.to_string()),
        ];
        for (key, value) in metadata {
            form.push((format!("metadata[{}]", key), value.to_string()));
        }

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.secret_key)
            .form(&form)
            .send()
            .await
            .map_err(|e| AppError::payment(format!("intent request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(AppError::payment(format!("provider returned {}: {}", status, error_body)));
        }

        response
            .json::<PaymentIntent>()
            .await
            .map_err(|e| AppError::payment(format!("unreadable intent response: {}", e)))
    }

    pub fn verify_signature(&self, header: &str, payload: &str) -> bool {
        verify_webhook_signature(&self.config.webhook_secret, header, payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(secret: &str, timestamp: &str, payload: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(format!("{}.{}", timestamp, payload).as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn accepts_valid_signature() {
        let payload = r#"{"type":"payment_intent.succeeded"}"#;
        let header = format!("t=1700000000,v1={}", sign("whsec_test", "1700000000", payload));
        assert!(verify_webhook_signature("whsec_test", &header, payload));
    }

    #[test]
    fn accepts_any_matching_v1_among_several() {
        let payload = "{}";
        let good = sign("whsec_test", "1700000000", payload);
        let header = format!("t=1700000000,v1=deadbeef,v1={}", good);
        assert!(verify_webhook_signature("whsec_test", &header, payload));
    }

    #[test]
    fn rejects_tampered_payload() {
        let header = format!("t=1700000000,v1={}", sign("whsec_test", "1700000000", "{\"a\":1}"));
        assert!(!verify_webhook_signature("whsec_test", &header, "{\"a\":2}"));
    }

    #[test]
    fn rejects_wrong_secret() {
        let payload = "{}";
        let header = format!("t=1700000000,v1={}", sign("whsec_other", "1700000000", payload));
        assert!(!verify_webhook_signature("whsec_test", &header, payload));
    }

    #[test]
    fn rejects_malformed_header() {
        assert!(!verify_webhook_signature("whsec_test", "", "{}"));
        assert!(!verify_webhook_signature("whsec_test", "v1=abcd", "{}"));
        assert!(!verify_webhook_signature("whsec_test", "t=1700000000", "{}"));
        assert!(!verify_webhook_signature("whsec_test", "t=1700000000,v1=nothex", "{}"));
    }

    #[test]
    fn webhook_event_deserializes() {
        let event: WebhookEvent = serde_json::from_str(
            r#"{"type":"payment_intent.succeeded","data":{"object":{"id":"pi_123"}}}"#,
        )
        .unwrap();
        assert_eq!(event.event_type, "payment_intent.succeeded");
        assert_eq!(event.data.object.id, "pi_123");
    }
}
