//! Email and SMS notifications.
//!
//! Templates are stored files keyed by [`TemplateName`]; delivery goes
//! through a [`NotificationDispatcher`]. Outside production nothing is sent.

pub mod dispatch;
pub mod handlers;
pub mod service;
pub mod templates;

pub use dispatch::{
    smtp_transport, EmailMessage, LoggingDispatcher, NotificationDispatcher, SmsMessage,
    SmtpSettings, SmtpSnsDispatcher,
};
pub use service::{DeliveryStatus, NotificationService};
pub use templates::{NotificationTemplates, RenderedEmail, TemplateName};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("failed to read notification templates: {0}")]
    TemplateIo(#[source] std::io::Error),
    #[error("invalid notification template '{name}': {source}")]
    Template {
        name: String,
        #[source]
        source: Box<handlebars::TemplateError>,
    },
    #[error("no {channel} template for '{name}'")]
    UnknownTemplate { channel: &'static str, name: String },
    #[error("failed to render notification: {0}")]
    Render(#[from] handlebars::RenderError),
    #[error("no {0} transport configured")]
    NotConfigured(&'static str),
    #[error("invalid email address: {0}")]
    InvalidAddress(#[from] lettre::address::AddressError),
    #[error("failed to build email: {0}")]
    EmailBuild(#[from] lettre::error::Error),
    #[error("SMTP delivery failed: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
    #[error("SMS delivery failed: {0}")]
    Sms(#[source] Box<aws_sdk_sns::error::SdkError<aws_sdk_sns::operation::publish::PublishError>>),
}
