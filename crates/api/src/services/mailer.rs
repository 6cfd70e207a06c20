//! Outgoing email for password reset codes.

use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use secrecy::ExposeSecret;
use thiserror::Error;

use bluefin_core::Email;

use crate::config::SmtpConfig;

/// Errors that can occur while sending mail.
#[derive(Debug, Error)]
pub enum MailerError {
    /// A from/to address could not be parsed.
    #[error("invalid email address: {0}")]
    InvalidAddress(String),

    /// Message construction failed.
    #[error("failed to build message: {0}")]
    Build(#[from] lettre::error::Error),

    /// SMTP transport failure.
    #[error("smtp error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

/// Password-reset code delivery.
///
/// Falls back to logging the code when SMTP is not configured, so local
/// development works without a relay.
pub enum Mailer {
    Smtp {
        transport: AsyncSmtpTransport<Tokio1Executor>,
        from: Mailbox,
    },
    LogOnly,
}

impl Mailer {
    /// Build a mailer from optional SMTP configuration.
    ///
    /// # Errors
    ///
    /// Returns `MailerError` if the relay host or from address is invalid.
    pub fn from_config(smtp: Option<&SmtpConfig>) -> Result<Self, MailerError> {
        let Some(smtp) = smtp else {
            return Ok(Self::LogOnly);
        };

        let from: Mailbox = smtp
            .from
            .parse()
            .map_err(|_| MailerError::InvalidAddress(smtp.from.clone()))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&smtp.host)?
            .credentials(Credentials::new(
                smtp.username.clone(),
                smtp.password.expose_secret().to_owned(),
            ))
            .build();

        Ok(Self::Smtp { transport, from })
    }

    /// Send a reset code to a customer.
    ///
    /// # Errors
    ///
    /// Returns `MailerError` if the message cannot be built or sent.
    pub async fn send_reset_code(&self, to: &Email, code: &str) -> Result<(), MailerError> {
        match self {
            Self::Smtp { transport, from } => {
                let to_mailbox: Mailbox = to
                    .as_str()
                    .parse()
                    .map_err(|_| MailerError::InvalidAddress(to.to_string()))?;

                let message = Message::builder()
                    .from(from.clone())
                    .to(to_mailbox)
                    .subject("Your password reset code")
                    .body(format!(
                        "Your password reset code is: {code}\n\n\
                         It expires in one hour. If you did not request a reset, \
                         you can ignore this email."
                    ))?;

                transport.send(message).await?;
                tracing::info!(%to, "password reset code sent");
                Ok(())
            }
            Self::LogOnly => {
                // Local development only; never enable in production
                tracing::info!(%to, code, "password reset code (smtp disabled)");
                Ok(())
            }
        }
    }
}
