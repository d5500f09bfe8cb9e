//! FHIR `document` bundle assembly.
//!
//! Every resource gets a `urn:uuid:` full URL. The Composition is always the
//! first entry and its sections reference the other entries by that URL.

use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use super::facilities::{Facility, FacilityDirectory};
use super::models::{
    AddressInput, BirthNotificationRequest, DeathNotificationRequest, InformantInput, PersonInput,
};
use super::FhirError;

pub const OPENCRVS_SPECS: &str = "http://opencrvs.org/specs";
const DEFAULT_COUNTRY: &str = "MDG";

/// Birth weight, LOINC body weight measured.
const BIRTH_WEIGHT_LOINC: &str = "3141-9";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    Birth,
    Death,
}

impl EventType {
    pub fn code(&self) -> &'static str {
        match self {
            EventType::Birth => "BIRTH",
            EventType::Death => "DEATH",
        }
    }

    fn document_code(&self) -> &'static str {
        match self {
            EventType::Birth => "birth-notification",
            EventType::Death => "death-notification",
        }
    }

    fn title(&self) -> &'static str {
        match self {
            EventType::Birth => "Birth Notification",
            EventType::Death => "Death Notification",
        }
    }
}

fn urn() -> String {
    format!("urn:uuid:{}", Uuid::new_v4())
}

fn coding(system: &str, code: &str) -> Value {
    json!({ "coding": [{ "system": system, "code": code }] })
}

fn section(code: &str, title: &str, reference: &str) -> Value {
    json!({
        "title": title,
        "code": {
            "coding": [{ "system": format!("{OPENCRVS_SPECS}/sections"), "code": code }],
            "text": title
        },
        "entry": [{ "reference": reference }]
    })
}

fn address_resource(address: &AddressInput) -> Value {
    let district = address.district.as_ref().or(address.commune.as_ref());
    json!({
        "type": "PRIMARY_ADDRESS",
        "line": address.lines,
        "city": address.city,
        "district": district,
        "state": address.state,
        "postalCode": address.postal_code,
        "country": address.country.as_deref().unwrap_or(DEFAULT_COUNTRY),
        "extension": [
            { "url": format!("{OPENCRVS_SPECS}/extension/fokontany"), "valueString": address.fokontany },
            { "url": format!("{OPENCRVS_SPECS}/extension/commune"), "valueString": address.commune }
        ]
    })
}

fn patient_resource(person: &PersonInput) -> Value {
    let given: Vec<&str> = person
        .first_names
        .as_deref()
        .map(|names| names.split_whitespace().collect())
        .unwrap_or_default();

    let mut patient = json!({
        "resourceType": "Patient",
        "active": true,
        "name": [{ "use": "mg", "given": given, "family": [person.family_name.trim()] }],
    });
    if let Some(gender) = person.gender {
        patient["gender"] = json!(gender.as_str());
    }
    if let Some(birth_date) = &person.birth_date {
        patient["birthDate"] = json!(birth_date);
    }
    if let Some(id) = &person.national_id {
        patient["identifier"] = json!([{
            "value": id,
            "type": coding(&format!("{OPENCRVS_SPECS}/identifier-type"), "NATIONAL_ID")
        }]);
    }
    if let Some(occupation) = &person.occupation {
        patient["extension"] = json!([{
            "url": format!("{OPENCRVS_SPECS}/extension/patient-occupation"),
            "valueString": occupation
        }]);
    }
    if let Some(nationality) = &person.nationality {
        let extension = json!({
            "url": "http://hl7.org/fhir/StructureDefinition/patient-nationality",
            "extension": [{
                "url": "code",
                "valueCodeableConcept": coding("urn:iso:std:iso:3166", nationality)
            }]
        });
        match patient.get_mut("extension").and_then(Value::as_array_mut) {
            Some(extensions) => extensions.push(extension),
            None => patient["extension"] = json!([extension]),
        }
    }
    if let Some(address) = &person.address {
        patient["address"] = json!([address_resource(address)]);
    }
    patient
}

fn encounter_resource(facility: &Facility, event_date: &str) -> Value {
    json!({
        "resourceType": "Encounter",
        "status": "finished",
        "period": { "start": event_date },
        "location": [{ "location": { "reference": facility.reference(), "display": facility.name } }]
    })
}

fn related_person_resource(informant: &InformantInput, patient_url: &str) -> Value {
    let mut related = json!({
        "resourceType": "RelatedPerson",
        "relationship": coding(
            "http://hl7.org/fhir/ValueSet/relatedperson-relationshiptype",
            &informant.relationship.trim().to_ascii_uppercase()
        ),
        "patient": { "reference": patient_url }
    });
    let telecom: Vec<Value> = [
        informant.phone_number.as_ref().map(|p| json!({ "system": "phone", "value": p })),
        informant.email.as_ref().map(|e| json!({ "system": "email", "value": e })),
    ]
    .into_iter()
    .flatten()
    .collect();
    if !telecom.is_empty() {
        related["telecom"] = json!(telecom);
    }
    related
}

fn task_resource(event: EventType, composition_url: &str, now: &str) -> Value {
    json!({
        "resourceType": "Task",
        "status": "draft",
        "intent": "unknown",
        "code": coding(&format!("{OPENCRVS_SPECS}/types"), event.code()),
        "focus": { "reference": composition_url },
        "lastModified": now,
        "businessStatus": coding(&format!("{OPENCRVS_SPECS}/reg-status"), "DECLARED")
    })
}

/// Entries collected before the Composition is known.
struct BundleBuilder {
    event: EventType,
    now: String,
    composition_url: String,
    sections: Vec<Value>,
    entries: Vec<Value>,
}

impl BundleBuilder {
    fn new(event: EventType) -> Self {
        Self {
            event,
            now: Utc::now().to_rfc3339(),
            composition_url: urn(),
            sections: Vec::new(),
            entries: Vec::new(),
        }
    }

    /// Add a resource and return its full URL.
    fn add(&mut self, resource: Value) -> String {
        let full_url = urn();
        self.entries.push(json!({ "fullUrl": full_url, "resource": resource }));
        full_url
    }

    fn add_section(&mut self, code: &str, title: &str, resource: Value) -> String {
        let full_url = self.add(resource);
        self.sections.push(section(code, title, &full_url));
        full_url
    }

    fn finish(mut self, subject_url: &str) -> Value {
        let task = task_resource(self.event, &self.composition_url, &self.now);
        self.add(task);

        let composition = json!({
            "resourceType": "Composition",
            "status": "preliminary",
            "type": {
                "coding": [{ "system": "http://opencrvs.org/doc-types", "code": self.event.document_code() }],
                "text": self.event.title()
            },
            "class": {
                "coding": [{ "system": "http://opencrvs.org/doc-classes", "code": "crvs-document" }],
                "text": "CRVS Document"
            },
            "title": self.event.title(),
            "subject": { "reference": subject_url },
            "date": self.now,
            "author": [],
            "section": self.sections,
        });

        let mut entries = Vec::with_capacity(self.entries.len() + 1);
        entries.push(json!({ "fullUrl": self.composition_url, "resource": composition }));
        entries.extend(self.entries);

        json!({
            "resourceType": "Bundle",
            "type": "document",
            "meta": { "lastUpdated": self.now },
            "entry": entries,
        })
    }
}

fn add_informant(builder: &mut BundleBuilder, informant: &InformantInput, known: &[(&str, &str)]) {
    let relationship = informant.relationship_code();
    // A parent informant points at the parent's Patient instead of a new one.
    let patient_url = match known.iter().find(|(code, _)| *code == relationship) {
        Some((_, url)) => url.to_string(),
        None => builder.add_section(
            "informant-details",
            "Informant's details",
            patient_resource(&informant.person),
        ),
    };
    builder.add_section(
        "informant-relation",
        "Informant's relationship",
        related_person_resource(informant, &patient_url),
    );
}

/// Birth notification bundle. Fails only when the place of birth does not
/// match a known facility.
pub fn build_birth_notification(
    request: &BirthNotificationRequest,
    facilities: &FacilityDirectory,
) -> Result<Value, FhirError> {
    let facility = facilities.find(&request.place_of_birth)?;
    let mut builder = BundleBuilder::new(EventType::Birth);

    let mut child = patient_resource(&request.child);
    child["birthDate"] = json!(request.date_of_birth);
    let child_url = builder.add_section("child-details", "Child details", child);
    let mother_url = builder.add_section(
        "mother-details",
        "Mother's details",
        patient_resource(&request.mother),
    );
    let father_url = request
        .father
        .as_ref()
        .map(|father| builder.add_section("father-details", "Father's details", patient_resource(father)));

    let encounter_url = builder.add_section(
        "birth-encounter",
        "Birth encounter",
        encounter_resource(facility, &request.date_of_birth),
    );

    if let Some(weight) = request.weight_at_birth {
        builder.add(json!({
            "resourceType": "Observation",
            "status": "final",
            "context": { "reference": encounter_url },
            "category": [coding("http://hl7.org/fhir/observation-category", "vital-signs")],
            "code": {
                "coding": [{ "system": "http://loinc.org", "code": BIRTH_WEIGHT_LOINC, "display": "Body weight Measured" }]
            },
            "valueQuantity": { "value": weight, "unit": "kg", "system": "http://unitsofmeasure.org", "code": "kg" }
        }));
    }

    if let Some(informant) = &request.informant {
        let mut known = vec![("MOTHER", mother_url.as_str())];
        if let Some(father_url) = father_url.as_deref() {
            known.push(("FATHER", father_url));
        }
        add_informant(&mut builder, informant, &known);
    }

    Ok(builder.finish(&child_url))
}

/// Death notification bundle. Fails only when the place of death does not
/// match a known facility.
pub fn build_death_notification(
    request: &DeathNotificationRequest,
    facilities: &FacilityDirectory,
) -> Result<Value, FhirError> {
    let facility = facilities.find(&request.place_of_death)?;
    let mut builder = BundleBuilder::new(EventType::Death);

    let mut deceased = patient_resource(&request.deceased);
    deceased["deceasedBoolean"] = json!(true);
    deceased["deceasedDateTime"] = json!(request.date_of_death);
    let deceased_url = builder.add_section("deceased-details", "Deceased details", deceased);

    let encounter_url = builder.add_section(
        "death-encounter",
        "Death encounter",
        encounter_resource(facility, &request.date_of_death),
    );

    if let Some(cause) = &request.cause_of_death {
        builder.add(json!({
            "resourceType": "Observation",
            "status": "final",
            "context": { "reference": encounter_url },
            "code": {
                "coding": [{ "system": "http://hl7.org/fhir/ValueSet/icd-10", "code": "ICD10", "display": "Cause of death" }]
            },
            "valueCodeableConcept": { "coding": [{ "system": "http://hl7.org/fhir/ValueSet/icd-10", "code": cause }] }
        }));
    }

    if let Some(informant) = &request.informant {
        add_informant(&mut builder, informant, &[]);
    }

    Ok(builder.finish(&deceased_url))
}
