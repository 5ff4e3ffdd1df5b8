use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::config::ClassifierConfig;
use crate::errors::{AppError, Result};
use crate::models::complaint::{Priority, Utility};

/// Category and priority assigned to a complaint's free text. Advisory
/// input only: nothing downstream (duplicate detection included) depends
/// on it being accurate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub category: String,
    pub priority: Priority,
}

impl Classification {
    /// Fixed fallback used whenever the provider cannot be reached or
    /// returns something unusable.
    pub fn fallback() -> Self {
        Classification {
            category: "GENERAL".to_string(),
            priority: Priority::Medium,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawClassification {
    category: String,
    priority: String,
}

/// Extract a `{category, priority}` object from model output. Tolerates
/// markdown code fences and surrounding prose around the JSON payload.
pub fn parse_classification(text: &str) -> Option<Classification> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }

    let raw: RawClassification = serde_json::from_str(&text[start..=end]).ok()?;
    let category = raw.category.trim().to_ascii_uppercase();
    if category.is_empty() {
        return None;
    }

    Some(Classification {
        category,
        priority: Priority::parse(&raw.priority)?,
    })
}

#[derive(Clone)]
pub struct ClassifierService {
    config: ClassifierConfig,
    client: Client,
}

impl ClassifierService {
    pub fn new(config: ClassifierConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    /// Classify a complaint description. Never fails: every provider error
    /// degrades to the fixed fallback so complaint creation is not held
    /// hostage by the classifier.
    pub async fn classify(&self, utility: Utility, description: &str) -> Classification {
        match self.request_classification(utility, description).await {
            Ok(classification) => classification,
            Err(e) => {
                tracing::warn!("Classification failed, using fallback: {}", e);
                Classification::fallback()
            }
        }
    }

    async fn request_classification(&self, utility: Utility, description: &str) -> Result<Classification> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.config.api_base, self.config.model, self.config.api_key
        );

        let prompt = format!(
            "You are triaging a {} utility complaint for a municipal helpdesk. \
             Reply with only a JSON object {{\"category\": string, \"priority\": \
             \"LOW\"|\"MEDIUM\"|\"HIGH\"|\"URGENT\"}}.\n\nComplaint: {}",
            utility.as_str(),
            description
        );

        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": { "temperature": 0.1 }
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::external_api(format!("classifier request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::external_api(format!(
                "classifier returned {}",
                response.status()
            )));
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AppError::external_api(format!("classifier response unreadable: {}", e)))?;

        let text = payload["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .ok_or_else(|| AppError::external_api("classifier response missing text"))?;

        parse_classification(text)
            .ok_or_else(|| AppError::external_api("classifier output was not valid JSON"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_json() {
        let c = parse_classification(r#"{"category": "power outage", "priority": "HIGH"}"#).unwrap();
        assert_eq!(c.category, "POWER OUTAGE");
        assert_eq!(c.priority, Priority::High);
    }

    #[test]
    fn parses_fenced_json() {
        let text = "```json\n{\"category\": \"billing\", \"priority\": \"low\"}\n```";
        let c = parse_classification(text).unwrap();
        assert_eq!(c.category, "BILLING");
        assert_eq!(c.priority, Priority::Low);
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_classification("sorry, I cannot help with that").is_none());
        assert!(parse_classification("{}").is_none());
        assert!(parse_classification(r#"{"category": "x", "priority": "SEVERE"}"#).is_none());
        assert!(parse_classification(r#"{"category": "  ", "priority": "LOW"}"#).is_none());
    }

    #[test]
    fn fallback_is_general_medium() {
        let fallback = Classification::fallback();
        assert_eq!(fallback.category, "GENERAL");
        assert_eq!(fallback.priority, Priority::Medium);
    }
}
