use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use crate::config::KeyPair;
use crate::error::{AppError, Result};
use crate::models::token::TokenClaims;

/// The `iss` claim stamped on (and required from) every session token.
pub const TOKEN_ISSUER: &str = "flash-buy-api";

/// Input for [`TokenIssuer::create_token`].
///
/// `subject`, `session_id` and `verified_at` stay `None` for a
/// pre-verification token and the matching claims are left out entirely.
#[derive(Debug, Clone)]
pub struct TokenRequest<'a> {
    pub subject: Option<Uuid>,
    pub session_id: Option<Uuid>,
    pub email: &'a str,
    pub verified_at: Option<DateTime<Utc>>,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Signs and verifies ES256 session tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenIssuer {
    /// Parses the PEM key pair.
    ///
    /// # Arguments
    ///
    /// * `keys` - PKCS#8 private key and SPKI public key, both P-256.
    ///
    /// # Returns
    ///
    /// A `Result` containing the issuer, or `AppError::Token` when a key does
    /// not parse.
    pub fn from_keys(keys: &KeyPair) -> Result<Self> {
        let encoding = EncodingKey::from_ec_pem(keys.private_pem.as_bytes())
            .map_err(|e| AppError::Token(format!("invalid ECDSA private key: {e}")))?;
        let decoding = DecodingKey::from_ec_pem(keys.public_pem.as_bytes())
            .map_err(|e| AppError::Token(format!("invalid ECDSA public key: {e}")))?;

        let mut validation = Validation::new(Algorithm::ES256);
        validation.set_issuer(&[TOKEN_ISSUER]);
        validation.set_required_spec_claims(&["exp", "iss"]);
        validation.leeway = 0;

        Ok(Self {
            encoding,
            decoding,
            validation,
        })
    }

    pub fn create_token(&self, request: TokenRequest<'_>) -> Result<String> {
        let claims = TokenClaims {
            iss: TOKEN_ISSUER.to_string(),
            sub: request.subject.map(|id| id.to_string()),
            sid: request.session_id.map(|id| id.to_string()),
            email: request.email.to_string(),
            vyf: request.verified_at.map(|at| at.timestamp()),
            iat: request.issued_at.timestamp(),
            exp: request.expires_at.timestamp(),
        };

        encode(&Header::new(Algorithm::ES256), &claims, &self.encoding)
            .map_err(|e| AppError::Token(format!("sign token: {e}")))
    }

    /// Verifies signature, algorithm, issuer and expiry.
    pub fn verify(&self, token: &str) -> Result<TokenClaims> {
        decode::<TokenClaims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("🔐 Token rejected: {}", e);
                AppError::Unauthorized
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use zeroize::Zeroizing;

    fn issuer() -> TokenIssuer {
        TokenIssuer::from_keys(&KeyPair {
            private_pem: Zeroizing::new(
                include_str!("../../tests/fixtures/ecdsa_private.pem").to_string(),
            ),
            public_pem: include_str!("../../tests/fixtures/ecdsa_public.pem").to_string(),
        })
        .unwrap()
    }

    fn request(email: &str) -> TokenRequest<'_> {
        let now = Utc::now();
        TokenRequest {
            subject: None,
            session_id: None,
            email,
            verified_at: None,
            issued_at: now,
            expires_at: now + Duration::hours(1),
        }
    }

    #[test]
    fn pre_verification_token_omits_identity_claims() {
        let issuer = issuer();
        let token = issuer.create_token(request("a@x.com")).unwrap();
        let claims = issuer.verify(&token).unwrap();

        assert_eq!(claims.sub, None);
        assert_eq!(claims.sid, None);
        assert_eq!(claims.vyf, None);
        assert_eq!(claims.email, "a@x.com");
        assert_eq!(claims.iss, TOKEN_ISSUER);

        // the claims are absent from the payload, not empty strings
        let decoded = jsonwebtoken::decode::<serde_json::Value>(
            &token,
            &issuer.decoding,
            &issuer.validation,
        )
        .unwrap()
        .claims;
        assert!(decoded.get("sub").is_none());
        assert!(decoded.get("sid").is_none());
    }

    #[test]
    fn verified_token_carries_subject_and_session() {
        let issuer = issuer();
        let user_id = Uuid::new_v4();
        let session_id = Uuid::new_v4();
        let token = issuer
            .create_token(TokenRequest {
                subject: Some(user_id),
                session_id: Some(session_id),
                verified_at: Some(Utc::now()),
                ..request("b@x.com")
            })
            .unwrap();

        let claims = issuer.verify(&token).unwrap();
        assert_eq!(claims.sub, Some(user_id.to_string()));
        assert_eq!(claims.sid, Some(session_id.to_string()));
        assert!(claims.vyf.is_some());
    }

    #[test]
    fn rejects_expired_token() {
        let issuer = issuer();
        let past = Utc::now() - Duration::hours(2);
        let token = issuer
            .create_token(TokenRequest {
                issued_at: past,
                expires_at: past + Duration::minutes(1),
                ..request("c@x.com")
            })
            .unwrap();

        assert!(matches!(issuer.verify(&token), Err(AppError::Unauthorized)));
    }

    #[test]
    fn rejects_other_algorithms_and_keys() {
        let issuer = issuer();
        let claims = TokenClaims {
            iss: TOKEN_ISSUER.to_string(),
            sub: Some(Uuid::new_v4().to_string()),
            sid: Some(Uuid::new_v4().to_string()),
            email: "d@x.com".to_string(),
            vyf: None,
            iat: Utc::now().timestamp(),
            exp: (Utc::now() + Duration::hours(1)).timestamp(),
        };

        let hmac = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"shared-secret"),
        )
        .unwrap();
        assert!(issuer.verify(&hmac).is_err());

        let foreign = EncodingKey::from_ec_pem(
            include_bytes!("../../tests/fixtures/foreign_private.pem"),
        )
        .unwrap();
        let forged = encode(&Header::new(Algorithm::ES256), &claims, &foreign).unwrap();
        assert!(issuer.verify(&forged).is_err());

        assert!(issuer.verify("not-a-token").is_err());
    }
}
