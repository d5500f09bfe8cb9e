use log::{error, info};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use utoipa::ToSchema;

use super::dispatch::{EmailMessage, NotificationDispatcher, SmsMessage};
use super::templates::{NotificationTemplates, TemplateName};
use super::NotificationError;

/// Recipients the seed data and end-to-end tests use.
const TEST_EMAIL_DOMAIN: &str = "@example.com";
const TEST_MSISDN: &str = "+261340000000";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Sent,
    /// Rendered but not sent: not in production, or a test recipient.
    Skipped,
}

pub fn is_test_recipient(recipient: &str) -> bool {
    let recipient = recipient.trim();
    recipient.to_ascii_lowercase().ends_with(TEST_EMAIL_DOMAIN)
        || recipient.replace(' ', "") == TEST_MSISDN
}

/// Renders a notification then hands it to the dispatcher.
pub struct NotificationService {
    templates: NotificationTemplates,
    dispatcher: Arc<dyn NotificationDispatcher + Send + Sync>,
    sender: String,
    production: bool,
}

impl NotificationService {
    pub fn new(
        templates: NotificationTemplates,
        dispatcher: Arc<dyn NotificationDispatcher + Send + Sync>,
        sender: impl Into<String>,
        production: bool,
    ) -> Self {
        Self {
            templates,
            dispatcher,
            sender: sender.into(),
            production,
        }
    }

    fn should_deliver(&self, recipient: &str) -> bool {
        self.production && !is_test_recipient(recipient)
    }

    pub async fn notify_email(
        &self,
        name: TemplateName,
        recipient: &str,
        variables: &Value,
    ) -> Result<DeliveryStatus, NotificationError> {
        let rendered = self.templates.render_email(name, variables)?;
        if !self.should_deliver(recipient) {
            info!("Skipping email {} to {} outside production", name.key(), recipient);
            return Ok(DeliveryStatus::Skipped);
        }

        let message = EmailMessage {
            from: self.sender.clone(),
            to: recipient.to_string(),
            subject: rendered.subject,
            html: rendered.html,
        };
        self.dispatcher.send_email(&message).await.map_err(|e| {
            error!("Failed to send email {} to {}: {}", name.key(), recipient, e);
            e
        })?;
        Ok(DeliveryStatus::Sent)
    }

    pub async fn notify_sms(
        &self,
        name: TemplateName,
        recipient: &str,
        variables: &Value,
    ) -> Result<DeliveryStatus, NotificationError> {
        let body = self.templates.render_sms(name, variables)?;
        if !self.should_deliver(recipient) {
            info!("Skipping SMS {} to {} outside production", name.key(), recipient);
            return Ok(DeliveryStatus::Skipped);
        }

        let message = SmsMessage {
            to: recipient.to_string(),
            body,
        };
        self.dispatcher.send_sms(&message).await.map_err(|e| {
            error!("Failed to send SMS {} to {}: {}", name.key(), recipient, e);
            e
        })?;
        Ok(DeliveryStatus::Sent)
    }
}
