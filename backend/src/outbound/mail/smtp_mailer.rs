//! SMTP delivery adapter backed by `lettre`.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::debug;

use crate::domain::ports::{Mailer, MailerError, ReminderMessage};

/// Connection settings for the SMTP relay.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    /// Relay hostname, e.g. `smtp.gmail.com`.
    pub host: String,
    /// Account used to authenticate; also the `From` address.
    pub username: String,
    /// Account password or app password.
    pub password: String,
}

/// Lettre-backed implementation of the [`Mailer`] port.
///
/// Connects with STARTTLS on the relay's submission port and reuses pooled
/// connections across sends.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: String,
}

impl SmtpMailer {
    /// Build a mailer for the given relay.
    pub fn new(config: &SmtpConfig) -> Result<Self, MailerError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|err| MailerError::transport(err.to_string()))?
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();
        Ok(Self {
            transport,
            sender: config.username.clone(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, message: &ReminderMessage) -> Result<(), MailerError> {
        let email = Message::builder()
            .from(
                self.sender
                    .parse()
                    .map_err(|err| MailerError::invalid_message(format!("sender: {err}")))?,
            )
            .to(message
                .to
                .as_str()
                .parse()
                .map_err(|err| MailerError::invalid_message(format!("recipient: {err}")))?)
            .subject(&message.subject)
            .header(ContentType::TEXT_PLAIN)
            .body(message.body.clone())
            .map_err(|err| MailerError::invalid_message(err.to_string()))?;

        let response = self
            .transport
            .send(email)
            .await
            .map_err(|err| MailerError::transport(err.to_string()))?;
        debug!(code = %response.code(), to = %message.to, "reminder delivered");
        Ok(())
    }
}
