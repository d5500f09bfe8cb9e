use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::validation::{
    validate_date, validate_date_optional, validate_required, ValidationError, ValidationErrors,
    Validator,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Unknown,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddressInput {
    #[serde(default)]
    pub lines: Vec<String>,
    pub fokontany: Option<String>,
    pub commune: Option<String>,
    pub district: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    /// ISO 3166 alpha-3, `MDG` when omitted.
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PersonInput {
    pub first_names: Option<String>,
    /// Required by validation, except for a parent informant.
    #[serde(default)]
    pub family_name: String,
    pub gender: Option<Gender>,
    pub birth_date: Option<String>,
    pub nationality: Option<String>,
    pub national_id: Option<String>,
    pub occupation: Option<String>,
    pub address: Option<AddressInput>,
}

impl PersonInput {
    fn check(&self, path: &str, errors: &mut ValidationErrors) {
        validate_required(&self.family_name, &format!("{path}.familyName"), errors);
        validate_date_optional(self.birth_date.as_deref(), &format!("{path}.birthDate"), errors);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InformantInput {
    /// Relationship code: `MOTHER`, `FATHER`, `BROTHER`, ...
    pub relationship: String,
    #[serde(flatten)]
    pub person: PersonInput,
    pub phone_number: Option<String>,
    pub email: Option<String>,
}

impl InformantInput {
    /// Relationship code in upper case.
    pub fn relationship_code(&self) -> String {
        self.relationship.trim().to_ascii_uppercase()
    }

    /// `parents` are the relationship codes whose person is already in the
    /// request. Such an informant needs no name of its own.
    fn check(&self, parents: &[&str], errors: &mut ValidationErrors) {
        validate_required(&self.relationship, "informant.relationship", errors);
        if parents.contains(&self.relationship_code().as_str()) {
            validate_date_optional(self.person.birth_date.as_deref(), "informant.birthDate", errors);
        } else {
            self.person.check("informant", errors);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BirthNotificationRequest {
    pub child: PersonInput,
    pub mother: PersonInput,
    pub father: Option<PersonInput>,
    pub informant: Option<InformantInput>,
    /// Facility name or id.
    pub place_of_birth: String,
    pub date_of_birth: String,
    /// Kilograms.
    pub weight_at_birth: Option<f64>,
}

impl Validator for BirthNotificationRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        self.child.check("child", &mut errors);
        self.mother.check("mother", &mut errors);
        if let Some(father) = &self.father {
            father.check("father", &mut errors);
        }
        if let Some(informant) = &self.informant {
            let parents: &[&str] = if self.father.is_some() {
                &["MOTHER", "FATHER"]
            } else {
                &["MOTHER"]
            };
            informant.check(parents, &mut errors);
        }
        validate_required(&self.place_of_birth, "placeOfBirth", &mut errors);
        validate_date(&self.date_of_birth, "dateOfBirth", &mut errors);
        if let Some(weight) = self.weight_at_birth {
            if !(weight > 0.0 && weight < 10.0) {
                errors.add(
                    ValidationError::new("weightAtBirth", "Birth weight is out of range")
                        .with_suggestion("Give the weight in kilograms, e.g. 3.2"),
                );
            }
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeathNotificationRequest {
    pub deceased: PersonInput,
    pub informant: Option<InformantInput>,
    /// Facility name or id.
    pub place_of_death: String,
    pub date_of_death: String,
    pub cause_of_death: Option<String>,
}

impl Validator for DeathNotificationRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        self.deceased.check("deceased", &mut errors);
        if let Some(informant) = &self.informant {
            informant.check(&[], &mut errors);
        }
        validate_required(&self.place_of_death, "placeOfDeath", &mut errors);
        validate_date(&self.date_of_death, "dateOfDeath", &mut errors);
        errors.into_result()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResponse {
    pub composition_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_birth_request_deserialization() {
        let request: BirthNotificationRequest = serde_json::from_value(json!({
            "child": { "familyName": "Rakoto", "firstNames": "Hery", "gender": "male" },
            "mother": { "familyName": "Rasoa" },
            "informant": { "relationship": "MOTHER", "familyName": "Rasoa", "phoneNumber": "0341234567" },
            "placeOfBirth": "CHU Befelatanana",
            "dateOfBirth": "2024-01-01",
            "weightAtBirth": 3.1
        }))
        .unwrap();
        assert_eq!(request.child.gender, Some(Gender::Male));
        let informant = request.informant.as_ref().unwrap();
        assert_eq!(informant.person.family_name, "Rasoa");
        assert_eq!(informant.phone_number.as_deref(), Some("0341234567"));
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_birth_request_collects_errors() {
        let request = BirthNotificationRequest {
            child: PersonInput::default(),
            mother: PersonInput {
                family_name: "Rasoa".into(),
                birth_date: Some("31/12/1990".into()),
                ..Default::default()
            },
            father: None,
            informant: None,
            place_of_birth: " ".into(),
            date_of_birth: "2024-02-30".into(),
            weight_at_birth: Some(45.0),
        };
        let errors = request.validate().unwrap_err();
        let fields: Vec<&str> = errors.errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec!["child.familyName", "mother.birthDate", "placeOfBirth", "dateOfBirth", "weightAtBirth"]
        );
    }

    #[test]
    fn test_death_request_validation() {
        let request = DeathNotificationRequest {
            deceased: PersonInput {
                family_name: "Randria".into(),
                ..Default::default()
            },
            informant: Some(InformantInput::default()),
            place_of_death: "CSB II Ambohimanarina".into(),
            date_of_death: "2024-05-01".into(),
            cause_of_death: None,
        };
        let errors = request.validate().unwrap_err();
        let fields: Vec<&str> = errors.errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["informant.relationship", "informant.familyName"]);
    }

    #[test]
    fn test_parent_informant_needs_no_name() {
        let request: BirthNotificationRequest = serde_json::from_value(json!({
            "child": { "familyName": "Rakoto" },
            "mother": { "familyName": "Rasoa" },
            "informant": { "relationship": "mother", "phoneNumber": "0341234567" },
            "placeOfBirth": "CHU Befelatanana",
            "dateOfBirth": "2024-01-01"
        }))
        .unwrap();
        assert_eq!(request.informant.as_ref().unwrap().person.family_name, "");
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_father_informant_without_father_needs_a_name() {
        let request: BirthNotificationRequest = serde_json::from_value(json!({
            "child": { "familyName": "Rakoto" },
            "mother": { "familyName": "Rasoa" },
            "informant": { "relationship": "FATHER" },
            "placeOfBirth": "CHU Befelatanana",
            "dateOfBirth": "2024-01-01"
        }))
        .unwrap();
        let errors = request.validate().unwrap_err();
        assert_eq!(errors.errors()[0].field, "informant.familyName");
    }
}
