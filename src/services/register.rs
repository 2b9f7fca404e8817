use crate::error::Result;
use crate::models::session::SessionSecurityInfo;
use crate::models::user::User;
use crate::services::auth::{AuthService, VerificationStarted};
use crate::services::user::UserManager;

/// Account creation followed by the same verification flow as login.
#[derive(Clone)]
pub struct RegisterService {
    users: UserManager,
    auth: AuthService,
}

impl RegisterService {
    pub fn new(users: UserManager, auth: AuthService) -> Self {
        Self { users, auth }
    }

    /// Registers a user and opens a pending session for them.
    ///
    /// Fails with `AppError::UserAlreadyExists` before anything is written
    /// when the email is taken.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        info: SessionSecurityInfo,
    ) -> Result<VerificationStarted> {
        let user = User::new(name, email);
        self.users.create_user(&user).await?;
        self.auth.start_verification(&user, info).await
    }
}
