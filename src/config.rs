// config.rs
use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub database_name: String,
    pub jwt_secret: String,
    pub default_country_code: String,
    pub port: u16,
    pub host: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        AppConfig {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            database_name: env::var("DATABASE_NAME").unwrap_or_else(|_| "suvidha".to_string()),
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
            default_country_code: env::var("DEFAULT_COUNTRY_CODE")
                .unwrap_or_else(|_| "+91".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("PORT must be a number"),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
        }
    }
}

/// SMS provider credentials (Twilio Messages API).
#[derive(Debug, Clone)]
pub struct SmsConfig {
    pub account_sid: String,
    pub auth_token: String,
    pub from_number: String,
}

impl SmsConfig {
    pub fn from_env() -> Self {
        SmsConfig {
            account_sid: env::var("TWILIO_ACCOUNT_SID").unwrap_or_default(),
            auth_token: env::var("TWILIO_AUTH_TOKEN").unwrap_or_default(),
            from_number: env::var("TWILIO_FROM_NUMBER").unwrap_or_else(|_| "SUVIDHA".to_string()),
        }
    }
}

/// Payment-intent provider credentials. Absent keys disable the service.
#[derive(Debug, Clone)]
pub struct PaymentConfig {
    pub secret_key: String,
    pub webhook_secret: String,
    pub api_base: String,
}

impl PaymentConfig {
    pub fn from_env() -> Option<Self> {
        let secret_key = env::var("PAYMENT_SECRET_KEY").ok()?;
        Some(PaymentConfig {
            secret_key,
            webhook_secret: env::var("PAYMENT_WEBHOOK_SECRET").unwrap_or_default(),
            api_base: env::var("PAYMENT_API_BASE")
                .unwrap_or_else(|_| "https://api.stripe.com/v1".to_string()),
        })
    }
}

/// Generative-language classification provider.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    pub api_key: String,
    pub model: String,
    pub api_base: String,
}

impl ClassifierConfig {
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("CLASSIFIER_API_KEY").ok()?;
        Some(ClassifierConfig {
            api_key,
            model: env::var("CLASSIFIER_MODEL").unwrap_or_else(|_| "gemini-1.5-flash".to_string()),
            api_base: env::var("CLASSIFIER_API_BASE")
                .unwrap_or_else(|_| "https://generativelanguage.googleapis.com/v1beta".to_string()),
        })
    }
}

/// Object storage (Cloudinary-style signed uploads).
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

impl StorageConfig {
    pub fn from_env() -> Option<Self> {
        let cloud_name = env::var("CLOUDINARY_CLOUD_NAME").ok()?;
        Some(StorageConfig {
            cloud_name,
            api_key: env::var("CLOUDINARY_API_KEY").unwrap_or_default(),
            api_secret: env::var("CLOUDINARY_API_SECRET").unwrap_or_default(),
        })
    }
}
