use crate::errors::Result;
use crate::models::payment::Payment;
use crate::models::user::User;
use crate::services::storage_service::StorageService;

/// Render the receipt document for a settled payment.
pub fn render_receipt(payment: &Payment, user: &User) -> String {
    let payment_id = payment._id.map(|id| id.to_hex()).unwrap_or_default();
    let rupees = payment.amount_paise as f64 / 100.0;

    format!(
        "SUVIDHA CITIZEN SERVICES\n\
         PAYMENT RECEIPT\n\
         ========================================\n\
         Receipt for   : {name}\n\
         Mobile        : {mobile}\n\
         Payment ID    : {payment_id}\n\
         Utility       : {utility}\n\
         Amount        : INR {rupees:.2}\n\
         Reference     : {reference}\n\
         Paid at       : {paid_at}\n\
         ========================================\n\
         This is a system-generated receipt.\n",
        name = user.name.as_deref().unwrap_or("Citizen"),
        mobile = user.mobile,
        payment_id = payment_id,
        utility = payment.utility.as_str(),
        rupees = rupees,
        reference = payment.provider_intent_id,
        paid_at = payment.updated_at.to_rfc3339(),
    )
}

/// Render and store the receipt, returning its public URL.
pub async fn generate_receipt(storage: &StorageService, payment: &Payment, user: &User) -> Result<String> {
    let document = render_receipt(payment, user);
    let file_name = format!(
        "receipt-{}.txt",
        payment._id.map(|id| id.to_hex()).unwrap_or_default()
    );

    let (url, _public_id) = storage.upload_raw(document.as_bytes(), "receipts", &file_name).await?;
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::complaint::Utility;
    use crate::models::payment::PaymentStatus;
    use chrono::Utc;
    use mongodb::bson::oid::ObjectId;

    #[test]
    fn receipt_carries_payment_and_user_details() {
        let now = Utc::now();
        let mut user = User::new_citizen("+919876543210".to_string());
        user.name = Some("Asha Rao".to_string());

        let payment = Payment {
            _id: Some(ObjectId::new()),
            user_id: ObjectId::new(),
            connection_id: None,
            utility: Utility::Electricity,
            amount_paise: 125_050,
            currency: "inr".to_string(),
            provider_intent_id: "pi_test_123".to_string(),
            status: PaymentStatus::Succeeded,
            receipt_url: None,
            created_at: now,
            updated_at: now,
        };

        let receipt = render_receipt(&payment, &user);
        assert!(receipt.contains("Asha Rao"));
        assert!(receipt.contains("+919876543210"));
        assert!(receipt.contains("ELECTRICITY"));
        assert!(receipt.contains("INR 1250.50"));
        assert!(receipt.contains("pi_test_123"));
    }

    #[test]
    fn receipt_defaults_name_for_empty_profile() {
        let now = Utc::now();
        let user = User::new_citizen("+919876543210".to_string());
        let payment = Payment {
            _id: None,
            user_id: ObjectId::new(),
            connection_id: None,
            utility: Utility::Water,
            amount_paise: 5000,
            currency: "inr".to_string(),
            provider_intent_id: "pi_test_456".to_string(),
            status: PaymentStatus::Succeeded,
            receipt_url: None,
            created_at: now,
            updated_at: now,
        };

        assert!(render_receipt(&payment, &user).contains("Citizen"));
    }
}
