//! Digest delivery.

use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::PrivateConfig;
use crate::error::{FinderError, Result};

/// Delivers a rendered digest to one recipient.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send an HTML message.
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<()>;
}

/// Email sender over SMTP with STARTTLS.
pub struct EmailSender {
    config: PrivateConfig,
}

impl EmailSender {
    /// Create a new email sender with the given credentials.
    #[must_use]
    pub const fn new(config: PrivateConfig) -> Self {
        Self { config }
    }

    /// Build the message without sending it.
    pub fn build_message(&self, to: &str, subject: &str, html_body: &str) -> Result<Message> {
        let from: Mailbox = self
            .config
            .email_username
            .parse()
            .map_err(|e| FinderError::Email(format!("invalid from address: {e}")))?;

        let to: Mailbox = to
            .parse()
            .map_err(|e| FinderError::Email(format!("invalid to address '{to}': {e}")))?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body.to_string())
            .map_err(|e| FinderError::Email(format!("failed to build message: {e}")))
    }
}

#[async_trait]
impl Notifier for EmailSender {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<()> {
        let email = self.build_message(to, subject, html_body)?;

        let creds = Credentials::new(
            self.config.email_username.clone(),
            self.config.email_password.clone(),
        );

        let mailer: AsyncSmtpTransport<Tokio1Executor> =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)
                .map_err(|e| FinderError::Email(format!("failed to create SMTP transport: {e}")))?
                .port(self.config.smtp_port)
                .credentials(creds)
                .build();

        mailer
            .send(email)
            .await
            .map_err(|e| FinderError::Email(format!("failed to send via SMTP: {e}")))?;

        tracing::info!(to, subject, "Email sent");
        Ok(())
    }
}

/// Logs digests instead of sending them.
#[derive(Debug, Default)]
pub struct DryRunNotifier;

#[async_trait]
impl Notifier for DryRunNotifier {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<()> {
        tracing::info!(to, subject, bytes = html_body.len(), "Dry run: email not sent");
        tracing::debug!(to, body = html_body, "Dry run email body");
        Ok(())
    }
}
