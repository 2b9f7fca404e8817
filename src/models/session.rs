use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;
use uuid::Uuid;

use crate::persistence::{Entity, RepoError, Value, column};

/// One authenticated (or authenticating) client session.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    pub email: String,
    /// The signed bearer token currently attached to this session.
    pub token: String,
    pub expires_at: DateTime<Utc>,
    /// Set once the emailed code has been confirmed.
    pub verified_at: Option<DateTime<Utc>>,
    pub ip: String,
    pub user_agent: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    pub fn is_verified(&self) -> bool {
        self.verified_at.is_some()
    }
}

impl Entity for Session {
    const TABLE: &'static str = "sessions";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "user_id",
        "email",
        "token",
        "expires_at",
        "verified_at",
        "ip",
        "user_agent",
        "created_at",
        "updated_at",
    ];

    fn id(&self) -> Uuid {
        self.id
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.id.into(),
            self.user_id.into(),
            self.email.clone().into(),
            self.token.clone().into(),
            self.expires_at.into(),
            self.verified_at.into(),
            self.ip.clone().into(),
            self.user_agent.clone().into(),
            self.created_at.into(),
            self.updated_at.into(),
        ]
    }

    fn from_row(row: &Row) -> Result<Self, RepoError> {
        Ok(Session {
            id: column(row, "id")?,
            user_id: column(row, "user_id")?,
            email: column(row, "email")?,
            token: column(row, "token")?,
            expires_at: column(row, "expires_at")?,
            verified_at: column(row, "verified_at")?,
            ip: column(row, "ip")?,
            user_agent: column(row, "user_agent")?,
            created_at: column(row, "created_at")?,
            updated_at: column(row, "updated_at")?,
        })
    }
}

/// Client metadata recorded on a new session.
#[derive(Clone, Debug, Default)]
pub struct SessionSecurityInfo {
    pub ip: String,
    pub user_agent: String,
}
