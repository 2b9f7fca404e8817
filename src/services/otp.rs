use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rand::rngs::OsRng;
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::otp::{Otp, OtpFlow};
use crate::persistence::RepoError;
use crate::repositories::otp::OtpRepository;

/// Uppercase letters and digits without the look-alikes I, O, 0 and 1.
pub const OTP_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
pub const OTP_LENGTH: usize = 6;
pub const OTP_TTL_MINUTES: i64 = 5;

/// Draws a code uniformly from [`OTP_ALPHABET`] using the OS CSPRNG.
pub fn generate_code() -> String {
    let mut rng = OsRng;
    (0..OTP_LENGTH)
        .map(|_| OTP_ALPHABET[rng.gen_range(0..OTP_ALPHABET.len())] as char)
        .collect()
}

fn expiry_from(now: DateTime<Utc>) -> DateTime<Utc> {
    now + Duration::minutes(OTP_TTL_MINUTES)
}

/// Issues, checks and regenerates one-time codes.
///
/// A code is always looked up through the verification token it was issued
/// for, never by the code itself.
#[derive(Clone)]
pub struct OtpManager {
    otps: OtpRepository,
}

impl OtpManager {
    pub fn new(otps: OtpRepository) -> Self {
        Self { otps }
    }

    /// Persists a fresh code bound to `verification_token` and returns it.
    pub async fn generate_otp(
        &self,
        user_id: Uuid,
        flow: OtpFlow,
        verification_token: &str,
    ) -> Result<String> {
        let now = Utc::now();
        let otp = Otp {
            id: Uuid::new_v4(),
            code: generate_code(),
            flow,
            verification_token: verification_token.to_string(),
            expires_at: expiry_from(now),
            user_id,
            created_at: now,
            updated_at: None,
        };

        self.otps.create(&otp).await?;
        tracing::debug!("🔐 OTP issued for user {} ({})", user_id, flow.as_str());

        Ok(otp.code)
    }

    /// Checks `code` against the OTP bound to `verification_token` and
    /// consumes it on success.
    pub async fn verify_otp(&self, code: &str, verification_token: &str) -> Result<()> {
        self.verify_otp_at(code, verification_token, Utc::now()).await
    }

    pub(crate) async fn verify_otp_at(
        &self,
        code: &str,
        verification_token: &str,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let otp = self
            .otps
            .find_by_verification_token(verification_token)
            .await?
            .ok_or(AppError::OtpNotFound)?;

        if otp.is_expired_at(now) {
            return Err(AppError::OtpExpired);
        }

        let submitted = code.trim().to_uppercase();
        if !bool::from(submitted.as_bytes().ct_eq(otp.code.as_bytes())) {
            return Err(AppError::OtpInvalid);
        }

        // A concurrent verification that deleted the row first wins.
        self.otps.delete(otp.id).await.map_err(|e| match e {
            RepoError::NotFound => AppError::OtpNotFound,
            other => other.into(),
        })?;

        tracing::debug!("✅ OTP {} consumed", otp.id);
        Ok(())
    }

    /// Regenerates code and expiry on the existing row and returns the new code.
    pub async fn update_code(&self, verification_token: &str) -> Result<String> {
        let mut otp = self
            .otps
            .find_by_verification_token(verification_token)
            .await?
            .ok_or(AppError::OtpNotFound)?;

        let now = Utc::now();
        otp.code = generate_code();
        otp.expires_at = expiry_from(now);
        otp.updated_at = Some(now);

        self.otps.update(&otp).await.map_err(|e| match e {
            RepoError::NotFound => AppError::OtpNotFound,
            other => other.into(),
        })?;

        Ok(otp.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryDatabase;

    fn manager(db: &MemoryDatabase) -> OtpManager {
        OtpManager::new(OtpRepository::new(std::sync::Arc::new(db.repository::<Otp>())))
    }

    #[test]
    fn codes_use_the_unambiguous_alphabet() {
        for _ in 0..500 {
            let code = generate_code();
            assert_eq!(code.len(), OTP_LENGTH);
            assert!(code.bytes().all(|b| OTP_ALPHABET.contains(&b)));
            assert!(!code.contains(['I', 'O', '0', '1']));
        }
    }

    #[tokio::test]
    async fn verification_consumes_the_code() {
        let db = MemoryDatabase::new();
        let otps = manager(&db);
        let code = otps
            .generate_otp(Uuid::new_v4(), OtpFlow::UserVerification, "token-a")
            .await
            .unwrap();

        otps.verify_otp(&code.to_lowercase(), "token-a").await.unwrap();
        assert_eq!(db.count("otps").await, 0);

        assert!(matches!(
            otps.verify_otp(&code, "token-a").await,
            Err(AppError::OtpNotFound)
        ));
    }

    #[tokio::test]
    async fn wrong_token_is_not_found_even_with_right_code() {
        let db = MemoryDatabase::new();
        let otps = manager(&db);
        let code = otps
            .generate_otp(Uuid::new_v4(), OtpFlow::UserVerification, "token-a")
            .await
            .unwrap();

        assert!(matches!(
            otps.verify_otp(&code, "token-b").await,
            Err(AppError::OtpNotFound)
        ));
        assert_eq!(db.count("otps").await, 1);
    }

    #[tokio::test]
    async fn mismatch_is_invalid_and_keeps_the_row() {
        let db = MemoryDatabase::new();
        let otps = manager(&db);
        let code = otps
            .generate_otp(Uuid::new_v4(), OtpFlow::UserVerification, "token-a")
            .await
            .unwrap();
        let wrong = if code == "AAAAAA" { "BBBBBB" } else { "AAAAAA" };

        assert!(matches!(
            otps.verify_otp(wrong, "token-a").await,
            Err(AppError::OtpInvalid)
        ));
        otps.verify_otp(&code, "token-a").await.unwrap();
    }

    #[tokio::test]
    async fn resend_invalidates_previous_code() {
        let db = MemoryDatabase::new();
        let otps = manager(&db);
        let first = otps
            .generate_otp(Uuid::new_v4(), OtpFlow::UserVerification, "token-a")
            .await
            .unwrap();

        let mut second = otps.update_code("token-a").await.unwrap();
        while second == first {
            second = otps.update_code("token-a").await.unwrap();
        }
        let mut third = otps.update_code("token-a").await.unwrap();
        while third == first {
            third = otps.update_code("token-a").await.unwrap();
        }

        assert!(matches!(
            otps.verify_otp(&first, "token-a").await,
            Err(AppError::OtpInvalid)
        ));
        assert_eq!(db.count("otps").await, 1);
        otps.verify_otp(&third, "token-a").await.unwrap();
    }

    #[tokio::test]
    async fn resend_without_otp_is_not_found() {
        let db = MemoryDatabase::new();
        assert!(matches!(
            manager(&db).update_code("missing").await,
            Err(AppError::OtpNotFound)
        ));
    }

    #[tokio::test]
    async fn expiry_instant_is_still_valid() {
        let db = MemoryDatabase::new();
        let otps = manager(&db);
        let code = otps
            .generate_otp(Uuid::new_v4(), OtpFlow::UserVerification, "token-a")
            .await
            .unwrap();
        let stored = otps
            .otps
            .find_by_verification_token("token-a")
            .await
            .unwrap()
            .unwrap();

        assert!(matches!(
            otps.verify_otp_at(&code, "token-a", stored.expires_at + Duration::milliseconds(1))
                .await,
            Err(AppError::OtpExpired)
        ));
        assert_eq!(db.count("otps").await, 1);

        otps.verify_otp_at(&code, "token-a", stored.expires_at)
            .await
            .unwrap();
    }
}
