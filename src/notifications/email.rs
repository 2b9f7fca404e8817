use std::sync::Arc;

use crate::clients::smtp::{MailError, Mailer};
use crate::models::otp::VerificationEmailData;
use crate::tasks::BackgroundTask;

const VERIFICATION_TEMPLATE: &str = include_str!("templates/verification-email.html");
pub const VERIFICATION_SUBJECT: &str = "Flash Buy - Verification Email";

/// Renders the verification email body.
pub fn render_verification_email(data: &VerificationEmailData) -> String {
    VERIFICATION_TEMPLATE.replace("{{code}}", &data.code)
}

/// Sends templated notification emails through a [`Mailer`].
#[derive(Clone)]
pub struct EmailNotifier {
    mailer: Arc<dyn Mailer>,
}

impl EmailNotifier {
    pub fn new(mailer: Arc<dyn Mailer>) -> Self {
        Self { mailer }
    }

    pub async fn send_verification_email(&self, email: &str, code: &str) -> Result<(), MailError> {
        let body = render_verification_email(&VerificationEmailData {
            code: code.to_string(),
        });
        self.mailer
            .send_email(email, VERIFICATION_SUBJECT, &body)
            .await
    }

    /// Sends the verification email off the request path.
    ///
    /// Failures are logged inside the task and reported through its output;
    /// nothing is retried.
    pub fn dispatch_verification_email(
        &self,
        email: String,
        code: String,
    ) -> BackgroundTask<Result<(), MailError>> {
        let notifier = self.clone();
        BackgroundTask::spawn("verification-email", async move {
            let outcome = notifier.send_verification_email(&email, &code).await;
            match &outcome {
                Ok(()) => tracing::info!("📧 Verification email sent to {}", email),
                Err(e) => tracing::error!("❌ Failed to send verification email to {}: {}", email, e),
            }
            outcome
        })
    }
}
