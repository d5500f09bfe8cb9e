#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use countryconfig_mdg::certificate::CertificateRenderer;
use countryconfig_mdg::fhir::{FacilityDirectory, FhirError, FhirStore};
use countryconfig_mdg::notification::{
    EmailMessage, NotificationDispatcher, NotificationError, NotificationService,
    NotificationTemplates, SmsMessage,
};
use countryconfig_mdg::{AppConfig, AppState};

pub fn static_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("static")
}

/// FHIR store that keeps submitted bundles in memory.
#[derive(Default)]
pub struct MockFhirStore {
    bundles: Mutex<Vec<Value>>,
    fail: bool,
}

impl MockFhirStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn submitted(&self) -> Vec<Value> {
        self.bundles.lock().unwrap().clone()
    }
}

#[async_trait]
impl FhirStore for MockFhirStore {
    async fn submit(&self, bundle: &Value) -> Result<String, FhirError> {
        if self.fail {
            return Err(FhirError::Upstream {
                status: 500,
                body: "store unavailable".to_string(),
            });
        }
        let mut bundles = self.bundles.lock().unwrap();
        bundles.push(bundle.clone());
        Ok(format!("composition-{}", bundles.len()))
    }
}

/// Dispatcher that records every message it is asked to send.
#[derive(Default)]
pub struct RecordingDispatcher {
    pub emails: Mutex<Vec<EmailMessage>>,
    pub sms: Mutex<Vec<SmsMessage>>,
}

#[async_trait]
impl NotificationDispatcher for RecordingDispatcher {
    async fn send_email(&self, message: &EmailMessage) -> Result<(), NotificationError> {
        self.emails.lock().unwrap().push(message.clone());
        Ok(())
    }

    async fn send_sms(&self, message: &SmsMessage) -> Result<(), NotificationError> {
        self.sms.lock().unwrap().push(message.clone());
        Ok(())
    }
}

/// App state over the shipped templates and facilities with mocked I/O.
pub fn test_state(
    fhir: Arc<MockFhirStore>,
    dispatcher: Arc<RecordingDispatcher>,
    production: bool,
) -> AppState {
    let config = AppConfig {
        environment: if production { "production" } else { "development" }.to_string(),
        static_dir: static_dir(),
        ..Default::default()
    };

    let mut certificates = CertificateRenderer::new();
    certificates
        .load_templates(&config.certificates_dir())
        .expect("certificate templates load");
    let facilities =
        FacilityDirectory::load(&config.facilities_path()).expect("facility list loads");
    let templates = NotificationTemplates::load(&config.notification_dir())
        .expect("notification templates load");
    let notifications =
        NotificationService::new(templates, dispatcher, config.sender_email.clone(), production);

    AppState::new(config, certificates, facilities, fhir, notifications)
}
