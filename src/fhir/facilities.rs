//! Health facility directory, loaded once from `facilities.json`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use utoipa::ToSchema;

use super::FhirError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Facility {
    /// FHIR `Location` id.
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Administrative area the facility belongs to.
    pub part_of: Option<String>,
}

impl Facility {
    fn matches(&self, query: &str) -> bool {
        self.id == query
            || self.name.eq_ignore_ascii_case(query)
            || self.aliases.iter().any(|alias| alias.eq_ignore_ascii_case(query))
    }

    pub fn reference(&self) -> String {
        format!("Location/{}", self.id)
    }
}

#[derive(Debug, Clone, Default)]
pub struct FacilityDirectory {
    facilities: Vec<Facility>,
}

impl FacilityDirectory {
    pub fn new(facilities: Vec<Facility>) -> Self {
        Self { facilities }
    }

    pub fn from_json(source: &str) -> Result<Self, FhirError> {
        let facilities = serde_json::from_str(source).map_err(FhirError::FacilityParse)?;
        Ok(Self::new(facilities))
    }

    pub fn load(path: &Path) -> Result<Self, FhirError> {
        let source = fs::read_to_string(path).map_err(FhirError::FacilityIo)?;
        Self::from_json(&source)
    }

    /// Find a facility by id, name or alias.
    pub fn find(&self, query: &str) -> Result<&Facility, FhirError> {
        let query = query.trim();
        self.facilities
            .iter()
            .find(|facility| facility.matches(query))
            .ok_or_else(|| FhirError::UnknownFacility(query.to_string()))
    }

    pub fn len(&self) -> usize {
        self.facilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facilities.is_empty()
    }
}
