//! Environment configuration.

use anyhow::{bail, Context};
use std::env;
use std::path::PathBuf;

use crate::notification::SmtpSettings;

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3040";
pub const DEFAULT_FHIR_URL: &str = "http://localhost:3447/fhir";
pub const DEFAULT_SENDER: &str = "noreply@crvs.gov.mg";
pub const DEFAULT_SMTP_PORT: u16 = 587;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// `production` enables notification delivery.
    pub environment: String,
    pub bind_address: String,
    pub fhir_url: String,
    /// Email delivery is disabled without a host.
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub smtp_secure: bool,
    /// SMS delivery through SNS is disabled without a region.
    pub sns_region: Option<String>,
    pub sender_email: String,
    pub static_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            fhir_url: DEFAULT_FHIR_URL.to_string(),
            smtp_host: None,
            smtp_port: DEFAULT_SMTP_PORT,
            smtp_username: None,
            smtp_password: None,
            smtp_secure: false,
            sns_region: None,
            sender_email: DEFAULT_SENDER.to_string(),
            static_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("static"),
        }
    }
}

fn var(name: &str) -> Option<String> {
    env::var(name).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl AppConfig {
    /// Read the configuration from the environment, after `.env`.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(var)
    }

    /// Build from any variable lookup; unset variables keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Self::default();
        let config = Self {
            environment: lookup("APP_ENV")
                .or_else(|| lookup("NODE_ENV"))
                .unwrap_or(defaults.environment),
            bind_address: lookup("BIND_ADDRESS").unwrap_or(defaults.bind_address),
            fhir_url: lookup("FHIR_URL").unwrap_or(defaults.fhir_url),
            smtp_host: lookup("SMTP_HOST"),
            smtp_port: match lookup("SMTP_PORT") {
                Some(port) => port
                    .parse()
                    .with_context(|| format!("SMTP_PORT '{}' is not a port number", port))?,
                None => defaults.smtp_port,
            },
            smtp_username: lookup("SMTP_USERNAME"),
            smtp_password: lookup("SMTP_PASSWORD"),
            smtp_secure: lookup("SMTP_SECURE").is_some_and(|v| v.eq_ignore_ascii_case("true")),
            sns_region: lookup("SNS_REGION").or_else(|| lookup("AWS_REGION")),
            sender_email: lookup("SENDER_EMAIL_ADDRESS").unwrap_or(defaults.sender_email),
            static_dir: lookup("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
        };

        reqwest::Url::parse(&config.fhir_url)
            .with_context(|| format!("FHIR_URL '{}' is not a valid URL", config.fhir_url))?;
        if config.smtp_username.is_some() != config.smtp_password.is_some() {
            bail!("SMTP_USERNAME and SMTP_PASSWORD must be set together");
        }
        if !config.sender_email.contains('@') {
            bail!("SENDER_EMAIL_ADDRESS '{}' is not an email address", config.sender_email);
        }
        Ok(config)
    }

    pub fn smtp_settings(&self) -> Option<SmtpSettings> {
        self.smtp_host.as_ref().map(|host| SmtpSettings {
            host: host.clone(),
            port: self.smtp_port,
            username: self.smtp_username.clone(),
            password: self.smtp_password.clone(),
            secure: self.smtp_secure,
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    pub fn certificates_dir(&self) -> PathBuf {
        self.static_dir.join("certificates")
    }

    pub fn notification_dir(&self) -> PathBuf {
        self.static_dir.join("notification")
    }

    pub fn facilities_path(&self) -> PathBuf {
        self.static_dir.join("facilities.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.bind_address, "0.0.0.0:3040");
        assert_eq!(config.fhir_url, DEFAULT_FHIR_URL);
        assert!(!config.is_production());
        assert!(config.facilities_path().ends_with("static/facilities.json"));
        assert_eq!(config.smtp_settings(), None);
        assert_eq!(config.sns_region, None);
    }

    #[test]
    fn test_smtp_and_sns_settings() {
        let config = AppConfig::from_lookup(lookup(&[
            ("SMTP_HOST", "smtp.crvs.gov.mg"),
            ("SMTP_PORT", "465"),
            ("SMTP_USERNAME", "crvs"),
            ("SMTP_PASSWORD", "secret"),
            ("SMTP_SECURE", "TRUE"),
            ("AWS_REGION", "eu-west-1"),
        ]))
        .unwrap();
        let smtp = config.smtp_settings().unwrap();
        assert_eq!(smtp.host, "smtp.crvs.gov.mg");
        assert_eq!(smtp.port, 465);
        assert_eq!(smtp.username.as_deref(), Some("crvs"));
        assert!(smtp.secure);
        assert_eq!(config.sns_region.as_deref(), Some("eu-west-1"));
    }

    #[test]
    fn test_node_env_fallback() {
        let config = AppConfig::from_lookup(lookup(&[("NODE_ENV", "production")])).unwrap();
        assert!(config.is_production());

        let config = AppConfig::from_lookup(lookup(&[
            ("APP_ENV", "staging"),
            ("NODE_ENV", "production"),
        ]))
        .unwrap();
        assert!(!config.is_production());
    }

    #[test]
    fn test_invalid_urls_rejected() {
        assert!(AppConfig::from_lookup(lookup(&[("FHIR_URL", "not a url")])).is_err());
        assert!(AppConfig::from_lookup(lookup(&[("SMTP_PORT", "smtp")])).is_err());
        assert!(AppConfig::from_lookup(lookup(&[("SMTP_USERNAME", "crvs")])).is_err());
        assert!(AppConfig::from_lookup(lookup(&[("SENDER_EMAIL_ADDRESS", "noreply")])).is_err());
    }
}
