use crate::clients::smtp::MailError;
use crate::error::Result;
use crate::models::otp::OtpFlow;
use crate::models::session::{Session, SessionSecurityInfo};
use crate::models::user::User;
use crate::notifications::email::EmailNotifier;
use crate::services::otp::OtpManager;
use crate::services::session::SessionManager;
use crate::services::user::UserManager;
use crate::tasks::BackgroundTask;

/// Handle on a verification email that is being sent in the background.
pub type EmailDelivery = BackgroundTask<std::result::Result<(), MailError>>;

/// A pending session plus the email carrying its code.
pub struct VerificationStarted {
    pub session: Session,
    pub email_delivery: EmailDelivery,
}

/// Login, code verification and code resend.
#[derive(Clone)]
pub struct AuthService {
    users: UserManager,
    sessions: SessionManager,
    otps: OtpManager,
    notifier: EmailNotifier,
}

impl AuthService {
    pub fn new(
        users: UserManager,
        sessions: SessionManager,
        otps: OtpManager,
        notifier: EmailNotifier,
    ) -> Self {
        Self {
            users,
            sessions,
            otps,
            notifier,
        }
    }

    /// Opens a pending session for `user`, binds a fresh code to its token
    /// and emails the code.
    pub(crate) async fn start_verification(
        &self,
        user: &User,
        info: SessionSecurityInfo,
    ) -> Result<VerificationStarted> {
        let session = self.sessions.create_session(user, info).await?;
        let code = self
            .otps
            .generate_otp(user.id, OtpFlow::UserVerification, &session.token)
            .await?;

        let email_delivery = self
            .notifier
            .dispatch_verification_email(user.email.clone(), code);

        Ok(VerificationStarted {
            session,
            email_delivery,
        })
    }

    /// Starts a login for a registered email.
    ///
    /// # Returns
    ///
    /// The pending session, or `AppError::UserNotFound` for an unknown email.
    pub async fn login(&self, email: &str, info: SessionSecurityInfo) -> Result<VerificationStarted> {
        let user = self.users.get_user_by_email(email).await?;
        let started = self.start_verification(&user, info).await?;

        tracing::info!("🔐 Login started for user {}", user.id);
        Ok(started)
    }

    /// Confirms the emailed code and upgrades the session.
    ///
    /// The code is consumed before the session is upgraded; the two steps
    /// are not atomic.
    pub async fn verify_code(&self, code: &str, token: &str) -> Result<Session> {
        self.otps.verify_otp(code, token).await?;
        self.sessions.validate_and_upgrade(token).await
    }

    /// Regenerates the code bound to `token` and emails it again.
    pub async fn resend_code(&self, email: &str, token: &str) -> Result<EmailDelivery> {
        let code = self.otps.update_code(token).await?;
        Ok(self
            .notifier
            .dispatch_verification_email(email.to_string(), code))
    }
}
