use async_trait::async_trait;
use log::{error, info};
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;

use super::FhirError;

const FHIR_JSON: &str = "application/fhir+json";

/// Somewhere FHIR bundles can be submitted.
#[async_trait]
pub trait FhirStore {
    /// Submit a document bundle and return the id of the created Composition.
    async fn submit(&self, bundle: &Value) -> Result<String, FhirError>;
}

/// Composition id from a transaction response: the second path segment of
/// `entry[0].response.location` (`Composition/<id>/_history/<version>`).
pub fn composition_id_from_response(response: &Value) -> Result<String, FhirError> {
    let location = response
        .pointer("/entry/0/response/location")
        .and_then(Value::as_str)
        .ok_or_else(|| FhirError::MalformedResponse("missing entry[0].response.location".into()))?;

    location
        .split('/')
        .nth(1)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .ok_or_else(|| FhirError::MalformedResponse(format!("unexpected location '{}'", location)))
}

/// FHIR store reached over HTTP.
pub struct FhirClient {
    http: reqwest::Client,
    base_url: String,
}

impl FhirClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl FhirStore for FhirClient {
    async fn submit(&self, bundle: &Value) -> Result<String, FhirError> {
        let response = self
            .http
            .post(&self.base_url)
            .header(CONTENT_TYPE, FHIR_JSON)
            .json(bundle)
            .send()
            .await
            .map_err(|e| {
                error!("FHIR store unreachable at {}: {}", self.base_url, e);
                FhirError::Http(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("FHIR store rejected bundle with {}: {}", status, body);
            return Err(FhirError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = response.json().await?;
        let id = composition_id_from_response(&body).inspect_err(|e| {
            error!("{}", e);
        })?;
        info!("FHIR store created Composition {}", id);
        Ok(id)
    }
}
