//! Shared application state.

use anyhow::Context;
use aws_config::{BehaviorVersion, Region};
use log::warn;
use std::sync::Arc;
use std::time::Duration;

use crate::certificate::CertificateRenderer;
use crate::config::AppConfig;
use crate::fhir::{FacilityDirectory, FhirClient, FhirStore};
use crate::notification::{
    smtp_transport, LoggingDispatcher, NotificationDispatcher, NotificationService,
    NotificationTemplates, SmtpSnsDispatcher,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub certificates: Arc<CertificateRenderer>,
    pub facilities: Arc<FacilityDirectory>,
    pub fhir: Arc<dyn FhirStore + Send + Sync>,
    pub notifications: Arc<NotificationService>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        certificates: CertificateRenderer,
        facilities: FacilityDirectory,
        fhir: Arc<dyn FhirStore + Send + Sync>,
        notifications: NotificationService,
    ) -> Self {
        Self {
            config: Arc::new(config),
            certificates: Arc::new(certificates),
            facilities: Arc::new(facilities),
            fhir,
            notifications: Arc::new(notifications),
        }
    }

    /// Load templates and facilities from the static directory and connect
    /// the FHIR store, SMTP server and SNS.
    pub async fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .pool_idle_timeout(Duration::from_secs(900))
            .timeout(Duration::from_secs(30))
            .user_agent("countryconfig-mdg/0.4")
            .build()
            .context("failed to create HTTP client")?;

        let mut certificates = CertificateRenderer::new();
        certificates
            .load_templates(&config.certificates_dir())
            .context("failed to load certificate templates")?;

        let facilities = FacilityDirectory::load(&config.facilities_path())
            .context("failed to load health facilities")?;

        let templates = NotificationTemplates::load(&config.notification_dir())
            .context("failed to load notification templates")?;

        let dispatcher: Arc<dyn NotificationDispatcher + Send + Sync> = if config.is_production() {
            let smtp = config
                .smtp_settings()
                .map(|settings| smtp_transport(&settings))
                .transpose()
                .context("failed to create SMTP transport")?;
            let sns = match &config.sns_region {
                Some(region) => {
                    let aws = aws_config::defaults(BehaviorVersion::latest())
                        .region(Region::new(region.clone()))
                        .load()
                        .await;
                    Some(aws_sdk_sns::Client::new(&aws))
                }
                None => None,
            };
            if smtp.is_none() {
                warn!("SMTP_HOST is not set, emails will fail");
            }
            if sns.is_none() {
                warn!("SNS_REGION is not set, SMS will fail");
            }
            Arc::new(SmtpSnsDispatcher::new(smtp, sns))
        } else {
            Arc::new(LoggingDispatcher)
        };
        let notifications = NotificationService::new(
            templates,
            dispatcher,
            config.sender_email.clone(),
            config.is_production(),
        );

        let fhir = Arc::new(FhirClient::new(http_client, config.fhir_url.clone()));

        Ok(Self::new(config, certificates, facilities, fhir, notifications))
    }
}
