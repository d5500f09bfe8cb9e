use async_trait::async_trait;
use aws_sdk_sns::Client as SnsClient;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use log::{error, info};
use serde::Serialize;

use super::NotificationError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SmsMessage {
    pub to: String,
    pub body: String,
}

/// Outbound delivery of rendered notifications.
#[async_trait]
pub trait NotificationDispatcher {
    async fn send_email(&self, message: &EmailMessage) -> Result<(), NotificationError>;
    async fn send_sms(&self, message: &SmsMessage) -> Result<(), NotificationError>;
}

/// SMTP server settings for outbound email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Implicit TLS when set, STARTTLS otherwise.
    pub secure: bool,
}

/// Pooled async SMTP transport built from the settings.
pub fn smtp_transport(
    settings: &SmtpSettings,
) -> Result<AsyncSmtpTransport<Tokio1Executor>, NotificationError> {
    let builder = if settings.secure {
        AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)?
    } else {
        AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)?
    };
    let builder = builder.port(settings.port);
    let builder = match (&settings.username, &settings.password) {
        (Some(username), Some(password)) => {
            builder.credentials(Credentials::new(username.clone(), password.clone()))
        }
        _ => builder,
    };
    Ok(builder.build())
}

/// MIME message carrying the rendered HTML body.
pub(crate) fn email_message(message: &EmailMessage) -> Result<Message, NotificationError> {
    let from: Mailbox = message.from.parse()?;
    let to: Mailbox = message.to.parse()?;
    let email = Message::builder()
        .from(from)
        .to(to)
        .subject(message.subject.as_str())
        .header(ContentType::TEXT_HTML)
        .body(message.html.clone())?;
    Ok(email)
}

/// SNS wants E.164 numbers; national `0XX` numbers get the Malagasy prefix.
pub(crate) fn international_number(number: &str) -> String {
    let compact: String = number
        .trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '.'))
        .collect();
    match compact.strip_prefix('0') {
        Some(national) => format!("+261{}", national),
        None => compact,
    }
}

/// Sends email over SMTP and SMS through Amazon SNS. A channel without a
/// client fails with [`NotificationError::NotConfigured`].
pub struct SmtpSnsDispatcher {
    smtp: Option<AsyncSmtpTransport<Tokio1Executor>>,
    sns: Option<SnsClient>,
}

impl SmtpSnsDispatcher {
    pub fn new(smtp: Option<AsyncSmtpTransport<Tokio1Executor>>, sns: Option<SnsClient>) -> Self {
        Self { smtp, sns }
    }
}

#[async_trait]
impl NotificationDispatcher for SmtpSnsDispatcher {
    async fn send_email(&self, message: &EmailMessage) -> Result<(), NotificationError> {
        let transport = self
            .smtp
            .as_ref()
            .ok_or(NotificationError::NotConfigured("email"))?;
        let email = email_message(message)?;
        transport.send(email).await.map_err(|e| {
            error!("SMTP delivery to {} failed: {}", message.to, e);
            NotificationError::Smtp(e)
        })?;
        info!("Email '{}' sent to {}", message.subject, message.to);
        Ok(())
    }

    async fn send_sms(&self, message: &SmsMessage) -> Result<(), NotificationError> {
        let client = self
            .sns
            .as_ref()
            .ok_or(NotificationError::NotConfigured("sms"))?;
        let output = client
            .publish()
            .phone_number(international_number(&message.to))
            .message(&message.body)
            .send()
            .await
            .map_err(|e| {
                error!("SNS publish to {} failed: {}", message.to, e);
                NotificationError::Sms(Box::new(e))
            })?;
        info!(
            "SMS sent to {} ({})",
            message.to,
            output.message_id().unwrap_or("no message id")
        );
        Ok(())
    }
}

/// Logs messages instead of sending them.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingDispatcher;

#[async_trait]
impl NotificationDispatcher for LoggingDispatcher {
    async fn send_email(&self, message: &EmailMessage) -> Result<(), NotificationError> {
        info!(
            "Email to {} ({}): {} bytes of HTML",
            message.to,
            message.subject,
            message.html.len()
        );
        Ok(())
    }

    async fn send_sms(&self, message: &SmsMessage) -> Result<(), NotificationError> {
        info!("SMS to {}: {}", message.to, message.body);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email() -> EmailMessage {
        EmailMessage {
            from: "noreply@crvs.gov.mg".into(),
            to: "rasoa@example.mg".into(),
            subject: "Fanamarinana".into(),
            html: "<p>Salama</p>".into(),
        }
    }

    #[tokio::test]
    async fn test_unconfigured_channels() {
        let dispatcher = SmtpSnsDispatcher::new(None, None);
        let sms = SmsMessage {
            to: "+261341234567".into(),
            body: "Salama".into(),
        };
        assert!(matches!(
            dispatcher.send_sms(&sms).await,
            Err(NotificationError::NotConfigured("sms"))
        ));
        assert!(matches!(
            dispatcher.send_email(&email()).await,
            Err(NotificationError::NotConfigured("email"))
        ));
    }

    #[test]
    fn test_email_message_is_html() {
        let message = email_message(&email()).unwrap();
        let envelope = message.envelope();
        assert_eq!(envelope.from().map(|a| a.to_string()).as_deref(), Some("noreply@crvs.gov.mg"));
        assert_eq!(envelope.to()[0].to_string(), "rasoa@example.mg");

        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("Subject: Fanamarinana"));
        assert!(raw.contains("Content-Type: text/html; charset=utf-8"));
    }

    #[test]
    fn test_email_message_rejects_bad_address() {
        let mut message = email();
        message.to = "tsy-adiresy".into();
        assert!(matches!(
            email_message(&message),
            Err(NotificationError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_international_number() {
        assert_eq!(international_number("034 12 345 67"), "+261341234567");
        assert_eq!(international_number("+261341234567"), "+261341234567");
    }

    #[tokio::test]
    async fn test_smtp_transport_from_settings() {
        let settings = SmtpSettings {
            host: "smtp.crvs.gov.mg".into(),
            port: 587,
            username: Some("crvs".into()),
            password: Some("secret".into()),
            secure: false,
        };
        assert!(smtp_transport(&settings).is_ok());
    }

    #[tokio::test]
    async fn test_logging_dispatcher_accepts_everything() {
        assert!(LoggingDispatcher.send_email(&email()).await.is_ok());
    }
}
