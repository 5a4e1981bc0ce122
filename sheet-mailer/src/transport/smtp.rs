//! SMTP delivery through lettre

use crate::config::SmtpConfig;
use crate::error::{MailerError, Result};
use crate::transport::{EmailTransport, OutgoingMessage, TransportReceipt};
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::debug;

/// SMTP transport holding one configured session for the whole batch
///
/// # Examples
/// ```no_run
/// use sheet_mailer::config::{SmtpAuth, SmtpConfig};
/// use sheet_mailer::transport::SmtpTransport;
///
/// let transport = SmtpTransport::from_config(&SmtpConfig {
///     host: "smtp.example.com".to_string(),
///     port: 465,
///     secure: true,
///     auth: SmtpAuth {
///         user: "me@example.com".to_string(),
///         pass: "secret".to_string(),
///     },
/// })?;
/// # Ok::<(), sheet_mailer::MailerError>(())
/// ```
pub struct SmtpTransport {
    inner: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpTransport {
    /// Build the session from configuration
    ///
    /// `secure = true` wraps the connection in TLS from the start; otherwise
    /// STARTTLS is used when the server offers it.
    pub fn from_config(config: &SmtpConfig) -> Result<Self> {
        let tls_parameters = TlsParameters::new(config.host.clone())
            .map_err(|e| MailerError::Transport(format!("TLS setup failed: {}", e)))?;

        let tls = if config.secure {
            Tls::Wrapper(tls_parameters)
        } else {
            Tls::Opportunistic(tls_parameters)
        };

        let credentials = Credentials::new(config.auth.user.clone(), config.auth.pass.clone());

        let inner = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(config.host.as_str())
            .port(config.port)
            .tls(tls)
            .credentials(credentials)
            .build();

        debug!(
            "SMTP transport configured for {}:{} (secure: {})",
            config.host, config.port, config.secure
        );

        Ok(Self { inner })
    }
}

/// Convert an outgoing message into a lettre HTML message
pub(crate) fn build_message(message: &OutgoingMessage) -> Result<Message> {
    let from: Mailbox = message.from.parse().map_err(|e| {
        MailerError::Transport(format!("invalid sender address '{}': {}", message.from, e))
    })?;
    let to: Mailbox = message.to.parse().map_err(|e| {
        MailerError::Transport(format!("invalid recipient address '{}': {}", message.to, e))
    })?;

    Message::builder()
        .from(from)
        .to(to)
        .subject(message.subject.as_str())
        .header(ContentType::TEXT_HTML)
        .body(message.html.clone())
        .map_err(|e| MailerError::Transport(format!("failed to build message: {}", e)))
}

#[async_trait::async_trait]
impl EmailTransport for SmtpTransport {
    async fn send(&self, message: OutgoingMessage) -> Result<TransportReceipt> {
        let email = build_message(&message)?;

        let response = self
            .inner
            .send(email)
            .await
            .map_err(|e| MailerError::Transport(e.to_string()))?;

        let text = response.message().collect::<Vec<_>>().join(" ");
        Ok(TransportReceipt {
            response: format!("{} {}", response.code(), text).trim_end().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(to: &str) -> OutgoingMessage {
        OutgoingMessage {
            from: "sender@example.com".to_string(),
            to: to.to_string(),
            subject: "Welcome".to_string(),
            html: "<p>Hi</p>".to_string(),
        }
    }

    #[test]
    fn test_build_message() {
        let email = build_message(&message("recipient@example.com")).unwrap();
        let formatted = String::from_utf8(email.formatted()).unwrap();

        assert!(formatted.contains("To: recipient@example.com"));
        assert!(formatted.contains("Subject: Welcome"));
        assert!(formatted.contains("text/html"));
    }

    #[test]
    fn test_build_message_invalid_recipient() {
        let result = build_message(&message("not-an-address"));
        assert!(matches!(result, Err(MailerError::Transport(_))));
    }

    #[tokio::test]
    async fn test_from_config() {
        let config = SmtpConfig {
            host: "localhost".to_string(),
            port: 2525,
            secure: false,
            auth: crate::config::SmtpAuth {
                user: "me@example.com".to_string(),
                pass: "secret".to_string(),
            },
        };

        assert!(SmtpTransport::from_config(&config).is_ok());
    }
}
