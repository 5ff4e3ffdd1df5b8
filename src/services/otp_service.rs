use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{DateTime, Duration, Utc};
use mongodb::bson::doc;
use mongodb::{bson, Collection, Database};
use rand::Rng;

use crate::errors::{AppError, Result};
use crate::models::otp::{OtpRecord, OtpRequestLog};

pub const OTP_TTL_MINUTES: i64 = 5;
pub const MAX_ATTEMPTS: i32 = 5;
pub const MAX_REQUESTS_PER_HOUR: u64 = 5;

const OTP_COLLECTION: &str = "otps";
const REQUEST_LOG_COLLECTION: &str = "otp_requests";

/// Where a record stands when a verification attempt arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordState {
    Live,
    Expired,
    Locked,
}

/// Expiry is checked before the attempt limit, so an expired record always
/// reports Expired even when it is also exhausted.
pub fn record_state(record: &OtpRecord, now: DateTime<Utc>) -> RecordState {
    if now >= record.expires_at {
        RecordState::Expired
    } else if record.attempts >= MAX_ATTEMPTS {
        RecordState::Locked
    } else {
        RecordState::Live
    }
}

/// Canonicalize a mobile number: strip whitespace, require 10-13 digits,
/// prepend the default country code when no leading `+` is present.
pub fn normalize_mobile(input: &str, default_country_code: &str) -> Result<String> {
    let cleaned: String = input.chars().filter(|c| !c.is_whitespace()).collect();

    let (prefix, digits) = match cleaned.strip_prefix('+') {
        Some(rest) => ("+", rest),
        None => ("", cleaned.as_str()),
    };

    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::invalid_data("Mobile number must contain only digits"));
    }
    if digits.len() < 10 || digits.len() > 13 {
        return Err(AppError::invalid_data("Mobile number must be 10-13 digits"));
    }

    if prefix == "+" {
        Ok(cleaned)
    } else {
        Ok(format!("{}{}", default_country_code, digits))
    }
}

/// Last four digits only, for log lines.
pub fn mask_mobile(mobile: &str) -> String {
    let tail: String = mobile.chars().rev().take(4).collect::<Vec<_>>().into_iter().rev().collect();
    format!("****{}", tail)
}

#[derive(Clone)]
pub struct OtpService {
    db: Database,
    default_country_code: String,
}

impl OtpService {
    pub fn new(db: Database, default_country_code: String) -> Self {
        Self {
            db,
            default_country_code,
        }
    }

    pub fn normalize(&self, input: &str) -> Result<String> {
        normalize_mobile(input, &self.default_country_code)
    }

    fn generate_code() -> String {
        let mut rng = rand::thread_rng();
        rng.gen_range(100_000..=999_999).to_string()
    }

    /// Issue a fresh code for the number: enforce the trailing-hour rate
    /// limit, replace any prior record, and hand the plaintext back to the
    /// caller for out-of-band dispatch.
    ///
    /// Returns `(normalized_mobile, plaintext_code)`. The plaintext never
    /// touches the database.
    pub async fn issue_code(&self, mobile_input: &str) -> Result<(String, String)> {
        let mobile = self.normalize(mobile_input)?;
        let now = Utc::now();

        self.enforce_rate_limit(&mobile, now).await?;

        let code = Self::generate_code();
        let code_hash =
            hash(&code, DEFAULT_COST).map_err(|e| AppError::service(format!("OTP hashing failed: {}", e)))?;

        let otps: Collection<OtpRecord> = self.db.collection(OTP_COLLECTION);

        // At most one live record per number: replace, never accumulate.
        otps.delete_many(doc! { "mobile": &mobile }).await?;
        otps.insert_one(OtpRecord {
            _id: None,
            mobile: mobile.clone(),
            code_hash,
            attempts: 0,
            expires_at: now + Duration::minutes(OTP_TTL_MINUTES),
            created_at: now,
        })
        .await?;

        Ok((mobile, code))
    }

    async fn enforce_rate_limit(&self, mobile: &str, now: DateTime<Utc>) -> Result<()> {
        let log: Collection<OtpRequestLog> = self.db.collection(REQUEST_LOG_COLLECTION);
        let window_start = bson::DateTime::from_chrono(now - Duration::hours(1));

        // Prune entries that have aged out of the window.
        log.delete_many(doc! { "mobile": mobile, "requested_at": { "$lt": window_start } })
            .await?;

        let recent = log
            .count_documents(doc! { "mobile": mobile, "requested_at": { "$gte": window_start } })
            .await?;

        if recent >= MAX_REQUESTS_PER_HOUR {
            tracing::warn!("OTP rate limit hit for {}", mask_mobile(mobile));
            return Err(AppError::RateLimitExceeded);
        }

        log.insert_one(OtpRequestLog {
            _id: None,
            mobile: mobile.to_string(),
            requested_at: now,
        })
        .await?;

        Ok(())
    }

    /// Check a submitted code. `Ok(false)` is a plain mismatch (retry
    /// permitted until the attempt limit); expiry, lockout and a missing
    /// record are typed errors. Terminal outcomes delete the record.
    pub async fn verify_code(&self, mobile_input: &str, submitted: &str) -> Result<bool> {
        let mobile = self.normalize(mobile_input)?;
        let otps: Collection<OtpRecord> = self.db.collection(OTP_COLLECTION);

        let record = otps
            .find_one(doc! { "mobile": &mobile })
            .await?
            .ok_or(AppError::OtpNotFound)?;

        match record_state(&record, Utc::now()) {
            RecordState::Expired => {
                otps.delete_one(doc! { "mobile": &mobile }).await?;
                Err(AppError::OtpExpired)
            }
            RecordState::Locked => {
                otps.delete_one(doc! { "mobile": &mobile }).await?;
                Err(AppError::OtpLocked)
            }
            RecordState::Live => {
                let matches = verify(submitted, &record.code_hash)
                    .map_err(|e| AppError::service(format!("OTP comparison failed: {}", e)))?;

                if matches {
                    // Single-use: consume on success.
                    otps.delete_one(doc! { "mobile": &mobile }).await?;
                    Ok(true)
                } else {
                    // Conditional increment: racing mismatches cannot push
                    // the counter past the limit.
                    otps.update_one(
                        doc! { "mobile": &mobile, "attempts": { "$lt": MAX_ATTEMPTS } },
                        doc! { "$inc": { "attempts": 1 } },
                    )
                    .await?;
                    Ok(false)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(attempts: i32, expires_in_secs: i64) -> OtpRecord {
        let now = Utc::now();
        OtpRecord {
            _id: None,
            mobile: "+919876543210".to_string(),
            code_hash: "$2b$12$abcdefghijklmnopqrstuv".to_string(),
            attempts,
            expires_at: now + Duration::seconds(expires_in_secs),
            created_at: now,
        }
    }

    #[test]
    fn normalization_prepends_default_country_code() {
        assert_eq!(normalize_mobile("9876543210", "+91").unwrap(), "+919876543210");
    }

    #[test]
    fn normalization_is_idempotent_across_formats() {
        let bare = normalize_mobile("9876543210", "+91").unwrap();
        let prefixed = normalize_mobile("+919876543210", "+91").unwrap();
        assert_eq!(bare, prefixed);
    }

    #[test]
    fn normalization_strips_whitespace() {
        assert_eq!(normalize_mobile(" 98765 43210 ", "+91").unwrap(), "+919876543210");
    }

    #[test]
    fn normalization_rejects_bad_input() {
        assert!(normalize_mobile("98765", "+91").is_err());
        assert!(normalize_mobile("98765432101234", "+91").is_err());
        assert!(normalize_mobile("98765abc10", "+91").is_err());
        assert!(normalize_mobile("", "+91").is_err());
    }

    #[test]
    fn generated_codes_are_six_digits() {
        for _ in 0..200 {
            let code = OtpService::generate_code();
            assert_eq!(code.len(), 6);
            let n: u32 = code.parse().unwrap();
            assert!((100_000..=999_999).contains(&n));
        }
    }

    #[test]
    fn live_record_within_limit() {
        assert_eq!(record_state(&record(0, 300), Utc::now()), RecordState::Live);
        assert_eq!(record_state(&record(MAX_ATTEMPTS - 1, 300), Utc::now()), RecordState::Live);
    }

    #[test]
    fn record_locks_at_max_attempts() {
        assert_eq!(record_state(&record(MAX_ATTEMPTS, 300), Utc::now()), RecordState::Locked);
        assert_eq!(record_state(&record(MAX_ATTEMPTS + 3, 300), Utc::now()), RecordState::Locked);
    }

    #[test]
    fn record_expires_at_the_exact_instant() {
        let rec = record(0, 0);
        assert_eq!(record_state(&rec, rec.expires_at), RecordState::Expired);
        assert_eq!(
            record_state(&rec, rec.expires_at + Duration::seconds(1)),
            RecordState::Expired
        );
    }

    #[test]
    fn expiry_wins_over_lockout() {
        // Correct code or not, an expired record reports Expired.
        let rec = record(MAX_ATTEMPTS, -10);
        assert_eq!(record_state(&rec, Utc::now()), RecordState::Expired);
    }

    #[test]
    fn code_hash_round_trip() {
        let code = "483920";
        let hashed = hash(code, DEFAULT_COST).unwrap();
        assert!(verify(code, &hashed).unwrap());
        assert!(!verify("483921", &hashed).unwrap());
    }

    #[test]
    fn mask_keeps_last_four_digits() {
        assert_eq!(mask_mobile("+919876543210"), "****3210");
    }
}
