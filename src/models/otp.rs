use chrono::{DateTime, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;
use uuid::Uuid;

use crate::persistence::{Entity, RepoError, Value, column};

/// The flow a one-time code was issued for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OtpFlow {
    UserVerification,
}

impl OtpFlow {
    pub fn as_str(&self) -> &'static str {
        match self {
            OtpFlow::UserVerification => "user_verification",
        }
    }

    fn parse(raw: &str) -> Result<Self, RepoError> {
        match raw {
            "user_verification" => Ok(OtpFlow::UserVerification),
            other => Err(RepoError::Encoding(format!("unknown otp flow {other}"))),
        }
    }
}

/// A one-time code bound to the token of a pre-verification session.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Otp {
    pub id: Uuid,
    pub code: String,
    pub flow: OtpFlow,
    /// Lookup key; unique per row.
    pub verification_token: String,
    pub expires_at: DateTime<Utc>,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Otp {
    /// Strictly-after semantics: the expiry instant itself is still valid.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

impl Entity for Otp {
    const TABLE: &'static str = "otps";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "code",
        "flow",
        "verification_token",
        "expires_at",
        "user_id",
        "created_at",
        "updated_at",
    ];
    const UNIQUE_KEYS: &'static [&'static [&'static str]] = &[&["verification_token"]];

    fn id(&self) -> Uuid {
        self.id
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.id.into(),
            self.code.clone().into(),
            self.flow.as_str().into(),
            self.verification_token.clone().into(),
            self.expires_at.into(),
            self.user_id.into(),
            self.created_at.into(),
            self.updated_at.into(),
        ]
    }

    fn from_row(row: &Row) -> Result<Self, RepoError> {
        let flow: String = column(row, "flow")?;
        Ok(Otp {
            id: column(row, "id")?,
            code: column(row, "code")?,
            flow: OtpFlow::parse(&flow)?,
            verification_token: column(row, "verification_token")?,
            expires_at: column(row, "expires_at")?,
            user_id: column(row, "user_id")?,
            created_at: column(row, "created_at")?,
            updated_at: column(row, "updated_at")?,
        })
    }
}

/// The request payload for submitting an emailed code.
#[derive(Deserialize, Debug, Validate)]
pub struct VerifyOtpPayload {
    #[garde(length(min = 1, max = 32))]
    pub code: String,
}

/// Data rendered into the verification email.
#[derive(Debug, Clone)]
pub struct VerificationEmailData {
    pub code: String,
}
