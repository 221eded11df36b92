use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::time::Duration;
use tracing::info;

use crate::config::SmtpSettings;
use crate::error::DeliveryError;

/// The rendered digest, ready to send.
#[derive(Debug, Clone)]
pub struct OutgoingMail {
    pub subject: String,
    pub html_body: String,
}

#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), DeliveryError>;
}

/// STARTTLS SMTP delivery using the SMTP user as sender.
pub struct SmtpMailer {
    settings: SmtpSettings,
}

impl SmtpMailer {
    pub fn new(settings: SmtpSettings) -> Self {
        Self { settings }
    }

    fn build_message(&self, mail: &OutgoingMail) -> Result<Message, DeliveryError> {
        let sender = self
            .settings
            .username
            .as_deref()
            .ok_or(DeliveryError::MissingCredentials("SMTP_USER"))?;
        let recipient = self
            .settings
            .recipient_or_sender()
            .ok_or(DeliveryError::MissingCredentials("TO_EMAIL"))?;

        let message = Message::builder()
            .from(sender.parse::<Mailbox>()?)
            .to(recipient.parse::<Mailbox>()?)
            .subject(mail.subject.as_str())
            .header(ContentType::TEXT_HTML)
            .body(mail.html_body.clone())?;

        Ok(message)
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), DeliveryError> {
        let message = self.build_message(mail)?;

        let username = self
            .settings
            .username
            .clone()
            .ok_or(DeliveryError::MissingCredentials("SMTP_USER"))?;
        let password = self
            .settings
            .password
            .clone()
            .ok_or(DeliveryError::MissingCredentials("SMTP_PASS"))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.settings.host)?
            .port(self.settings.port)
            .credentials(Credentials::new(username, password))
            .timeout(Some(Duration::from_secs(20)))
            .build();

        transport.send(message).await?;
        info!(
            "Sent digest via {}:{}",
            self.settings.host, self.settings.port
        );

        Ok(())
    }
}
