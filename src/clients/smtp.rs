use std::sync::Arc;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{Message, SmtpTransport, Transport};
use thiserror::Error;

use crate::config::SmtpConfig;

#[derive(Error, Debug)]
pub enum MailError {
    #[error("invalid address: {0}")]
    Address(String),

    #[error("failed to build message: {0}")]
    Message(String),

    #[error("SMTP transport error: {0}")]
    Transport(String),
}

/// Sends HTML email.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_email(&self, to: &str, subject: &str, html_body: &str) -> Result<(), MailError>;
}

/// SMTP mailer; the configured user is also the sender address.
pub struct SmtpMailer {
    transport: Arc<SmtpTransport>,
    from: String,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, MailError> {
        let tls_parameters = TlsParameters::new(config.host.clone())
            .map_err(|e| MailError::Transport(format!("Failed to build TLS parameters: {e}")))?;

        let tls = if config.port == 465 {
            Tls::Wrapper(tls_parameters)
        } else {
            Tls::Opportunistic(tls_parameters)
        };

        let transport = SmtpTransport::builder_dangerous(config.host.as_str())
            .port(config.port)
            .credentials(Credentials::new(config.user.clone(), config.password.clone()))
            .tls(tls)
            .timeout(Some(std::time::Duration::from_secs(10)))
            .build();

        Ok(Self {
            transport: Arc::new(transport),
            from: config.user.clone(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_email(&self, to: &str, subject: &str, html_body: &str) -> Result<(), MailError> {
        let email = Message::builder()
            .from(
                self.from
                    .parse()
                    .map_err(|e| MailError::Address(format!("from {}: {e}", self.from)))?,
            )
            .to(to
                .parse()
                .map_err(|e| MailError::Address(format!("to {to}: {e}")))?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body.to_string())
            .map_err(|e| MailError::Message(e.to_string()))?;

        // lettre's SmtpTransport is blocking
        let transport = Arc::clone(&self.transport);
        tokio::task::spawn_blocking(move || transport.send(&email))
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?
            .map_err(|e| MailError::Transport(e.to_string()))?;

        tracing::debug!("📧 Email sent to {}", to);
        Ok(())
    }
}
