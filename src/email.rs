use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::Config;
use crate::errors::{ApiError, AppError};
use crate::schema::contact::ContactPayload;

#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Outbound email seam. Handlers and the cleanup worker only see this
/// trait, so tests substitute a fake instead of an SMTP connection.
pub trait Mailer: Send + Sync {
    fn send(&self, email: OutgoingEmail) -> BoxFuture<'_, Result<(), ApiError>>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &Config) -> Result<SmtpMailer, AppError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            .map_err(|e| {
                tracing::error!(error = %e, "smtp relay setup failed");
                AppError::Mailer
            })?
            .credentials(Credentials::new(
                config.smtp_username.clone(),
                config.smtp_password.clone(),
            ))
            .build();

        let from = config.email_from.parse().map_err(|_| AppError::Mailer)?;

        Ok(SmtpMailer { transport, from })
    }
}

impl Mailer for SmtpMailer {
    fn send(&self, email: OutgoingEmail) -> BoxFuture<'_, Result<(), ApiError>> {
        async move {
            let to: Mailbox = email.to.parse().map_err(|_| {
                ApiError::Email("Could not send email.".to_string())
            })?;

            let message = Message::builder()
                .from(self.from.clone())
                .to(to)
                .subject(email.subject)
                .body(email.body)
                .map_err(|e| {
                    tracing::error!(error = %e, "email build failed");
                    ApiError::Email("Could not send email.".to_string())
                })?;

            self.transport.send(message).await.map_err(|e| {
                tracing::error!(error = %e, "smtp send failed");
                ApiError::Email("Could not send email.".to_string())
            })?;

            Ok(())
        }
        .boxed()
    }
}

/// Contact-form relay to the operator address.
pub fn contact_message(operator: &str, contact: &ContactPayload) -> OutgoingEmail {
    OutgoingEmail {
        to: operator.to_string(),
        subject: format!("Contact request from {}", contact.name),
        body: format!(
            "Name: {}\nEmail: {}\nPhone: {}\nMessage:\n{}",
            contact.name,
            contact.email,
            contact.phone_number.as_deref().unwrap_or("no phone"),
            contact.message
        ),
    }
}

pub fn reset_link_message(operator: &str, username: &str, url: &str) -> OutgoingEmail {
    OutgoingEmail {
        to: operator.to_string(),
        subject: format!("Password reset for {username}"),
        body: format!(
            "A password reset was requested for {username}.\nFollow this link to receive a new password:\n{url}"
        ),
    }
}

pub fn new_password_message(operator: &str, username: &str, password: &str) -> OutgoingEmail {
    OutgoingEmail {
        to: operator.to_string(),
        subject: format!("New password for {username}"),
        body: format!("The new password for {username} is:\n{password}"),
    }
}

/// Escalation sent when best-effort asset cleanup fails.
pub fn cleanup_notice(operator: &str, path: &std::path::Path) -> OutgoingEmail {
    OutgoingEmail {
        to: operator.to_string(),
        subject: "Manual image cleanup required".to_string(),
        body: format!("Please delete this image from server:\n{}", path.display()),
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use std::sync::Mutex;

    use super::*;

    /// Records every send; never fails.
    #[derive(Default)]
    pub struct FakeMailer {
        pub sent: Mutex<Vec<OutgoingEmail>>,
    }

    impl Mailer for FakeMailer {
        fn send(&self, email: OutgoingEmail) -> BoxFuture<'_, Result<(), ApiError>> {
            async move {
                self.sent.lock().unwrap().push(email);
                Ok(())
            }
            .boxed()
        }
    }
}
