use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::session::{Session, SessionSecurityInfo};
use crate::models::user::User;
use crate::repositories::session::SessionRepository;
use crate::services::token::{TokenIssuer, TokenRequest};

pub const PENDING_SESSION_TTL_HOURS: i64 = 1;
pub const VERIFIED_SESSION_TTL_DAYS: i64 = 7;

/// Creates pre-verification sessions and upgrades them once the code is confirmed.
#[derive(Clone)]
pub struct SessionManager {
    sessions: SessionRepository,
    tokens: Arc<TokenIssuer>,
}

impl SessionManager {
    pub fn new(sessions: SessionRepository, tokens: Arc<TokenIssuer>) -> Self {
        Self { sessions, tokens }
    }

    /// Starts a one-hour session whose token carries no identity claims.
    pub async fn create_session(&self, user: &User, info: SessionSecurityInfo) -> Result<Session> {
        let now = Utc::now();
        let expires_at = now + Duration::hours(PENDING_SESSION_TTL_HOURS);

        let token = self.tokens.create_token(TokenRequest {
            subject: None,
            session_id: None,
            email: &user.email,
            verified_at: None,
            issued_at: now,
            expires_at,
        })?;

        let session = Session {
            id: Uuid::new_v4(),
            user_id: user.id,
            email: user.email.clone(),
            token,
            expires_at,
            verified_at: None,
            ip: info.ip,
            user_agent: info.user_agent,
            created_at: now,
            updated_at: None,
        };

        self.sessions.upsert(&session).await?;
        tracing::debug!("🔐 Pending session {} created for user {}", session.id, user.id);

        Ok(session)
    }

    /// Upgrades the session holding `token` to a verified seven-day session
    /// with a freshly signed token.
    ///
    /// Absent and expired sessions are reported identically.
    pub async fn validate_and_upgrade(&self, token: &str) -> Result<Session> {
        let now = Utc::now();
        let mut session = self
            .sessions
            .find_by_token(token)
            .await?
            .filter(|session| !session.is_expired_at(now))
            .ok_or(AppError::SessionNotFoundOrExpired)?;

        session.verified_at = Some(now);
        session.expires_at = now + Duration::days(VERIFIED_SESSION_TTL_DAYS);
        session.updated_at = Some(now);
        session.token = self.tokens.create_token(TokenRequest {
            subject: Some(session.user_id),
            session_id: Some(session.id),
            email: &session.email,
            verified_at: session.verified_at,
            issued_at: session.created_at,
            expires_at: session.expires_at,
        })?;

        self.sessions.upsert(&session).await?;
        tracing::info!("✅ Session {} verified for user {}", session.id, session.user_id);

        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KeyPair;
    use crate::persistence::MemoryDatabase;
    use zeroize::Zeroizing;

    fn manager(db: &MemoryDatabase) -> SessionManager {
        let keys = KeyPair {
            private_pem: Zeroizing::new(
                include_str!("../../tests/fixtures/ecdsa_private.pem").to_string(),
            ),
            public_pem: include_str!("../../tests/fixtures/ecdsa_public.pem").to_string(),
        };
        SessionManager::new(
            SessionRepository::new(Arc::new(db.repository::<Session>())),
            Arc::new(TokenIssuer::from_keys(&keys).unwrap()),
        )
    }

    fn user() -> User {
        User::new("Ana", "ana@example.com")
    }

    #[tokio::test]
    async fn upgrade_replaces_the_token() {
        let db = MemoryDatabase::new();
        let sessions = manager(&db);
        let pending = sessions
            .create_session(&user(), SessionSecurityInfo::default())
            .await
            .unwrap();
        assert!(!pending.is_verified());

        let verified = sessions.validate_and_upgrade(&pending.token).await.unwrap();
        assert_eq!(verified.id, pending.id);
        assert!(verified.is_verified());
        assert_ne!(verified.token, pending.token);
        assert!(verified.expires_at - Utc::now() > Duration::days(6));
        assert_eq!(db.count("sessions").await, 1);

        // the old token no longer matches any session
        assert!(matches!(
            sessions.validate_and_upgrade(&pending.token).await,
            Err(AppError::SessionNotFoundOrExpired)
        ));
    }

    #[tokio::test]
    async fn expired_sessions_are_not_upgraded() {
        let db = MemoryDatabase::new();
        let sessions = manager(&db);
        let mut pending = sessions
            .create_session(&user(), SessionSecurityInfo::default())
            .await
            .unwrap();

        pending.expires_at = Utc::now() - Duration::seconds(1);
        sessions.sessions.upsert(&pending).await.unwrap();

        assert!(matches!(
            sessions.validate_and_upgrade(&pending.token).await,
            Err(AppError::SessionNotFoundOrExpired)
        ));
    }
}
