use std::sync::Arc;

use mongodb::Database;

use crate::config::{AppConfig, SmsConfig};
use crate::services::classifier_service::ClassifierService;
use crate::services::otp_service::OtpService;
use crate::services::payment_service::PaymentService;
use crate::services::sms_service::SmsService;
use crate::services::storage_service::StorageService;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: AppConfig,
    pub otp_service: OtpService,
    pub sms_service: SmsService,
    pub classifier_service: Option<Arc<ClassifierService>>,
    pub payment_service: Option<Arc<PaymentService>>,
    pub storage_service: Option<Arc<StorageService>>,
}

impl AppState {
    pub fn new(db: Database, config: AppConfig, sms_config: SmsConfig) -> Self {
        let otp_service = OtpService::new(db.clone(), config.default_country_code.clone());
        AppState {
            db,
            config,
            otp_service,
            sms_service: SmsService::new(sms_config),
            classifier_service: None,
            payment_service: None,
            storage_service: None,
        }
    }

    pub fn with_classifier(mut self, classifier: Arc<ClassifierService>) -> Self {
        self.classifier_service = Some(classifier);
        self
    }

    pub fn with_payment(mut self, payment: Arc<PaymentService>) -> Self {
        self.payment_service = Some(payment);
        self
    }

    pub fn with_storage(mut self, storage: Arc<StorageService>) -> Self {
        self.storage_service = Some(storage);
        self
    }
}
