//! FHIR notification bundles.
//!
//! Health facilities notify births and deaths; the request is checked,
//! assembled into a FHIR `document` bundle and posted to the FHIR store.

pub mod bundle;
pub mod client;
pub mod facilities;
pub mod handlers;
pub mod models;

pub use bundle::{build_birth_notification, build_death_notification};
pub use client::{composition_id_from_response, FhirClient, FhirStore};
pub use facilities::{Facility, FacilityDirectory};
pub use models::{BirthNotificationRequest, DeathNotificationRequest, SubmissionResponse};

use thiserror::Error;

use crate::validation::ValidationErrors;

#[derive(Debug, Error)]
pub enum FhirError {
    #[error("no health facility matches '{0}'")]
    UnknownFacility(String),
    #[error("{0}")]
    Validation(ValidationErrors),
    #[error("failed to read facility list: {0}")]
    FacilityIo(#[source] std::io::Error),
    #[error("invalid facility list: {0}")]
    FacilityParse(#[source] serde_json::Error),
    #[error("request to FHIR store failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("FHIR store returned {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("unexpected FHIR store response: {0}")]
    MalformedResponse(String),
}
