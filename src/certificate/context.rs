//! Record context: the certificate data normalised once at ingestion.
//!
//! The platform sends a flat JSON object where "absent" is spelled many
//! ways (`""`, `"-"`, `" - "`, `"null"`, `"undefined"`, `null`). All of them
//! are dropped here so the composers only ever see `Option`s.

use serde_json::{Map, Value};

use super::mentions::MentionList;

const ABSENT_SENTINELS: [&str; 4] = ["", "-", "null", "undefined"];

pub fn is_absent(value: &str) -> bool {
    ABSENT_SENTINELS.contains(&value.trim())
}

/// Normalise one JSON value. Array positions are kept (absent slots become
/// `null`) because mention slots are positional.
pub fn normalize_value(value: &Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::String(s) if is_absent(s) => None,
        Value::String(s) => Some(Value::String(s.trim().to_string())),
        Value::Object(map) => Some(Value::Object(normalize_map(map))),
        Value::Array(items) => Some(Value::Array(
            items
                .iter()
                .map(|item| normalize_value(item).unwrap_or(Value::Null))
                .collect(),
        )),
        other => Some(other.clone()),
    }
}

fn normalize_map(map: &Map<String, Value>) -> Map<String, Value> {
    map.iter()
        .filter_map(|(key, value)| normalize_value(value).map(|v| (key.clone(), v)))
        .collect()
}

/// Text form of a scalar, `None` for absent values and containers.
pub fn value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if is_absent(s) => None,
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub fn value_to_flag(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "yes" | "1"),
        Value::Number(n) => n.as_i64() == Some(1),
        _ => false,
    }
}

/// People a certificate talks about. Each maps to a key prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Child,
    Deceased,
    Mother,
    Father,
    Informant,
}

impl Role {
    /// Lower-case prefix, e.g. `fatherFamilyName`.
    pub fn prefix(&self) -> &'static str {
        match self {
            Role::Child => "child",
            Role::Deceased => "deceased",
            Role::Mother => "mother",
            Role::Father => "father",
            Role::Informant => "informant",
        }
    }

    /// Capitalised suffix, e.g. `countryPrimaryFather`.
    pub fn suffix(&self) -> &'static str {
        match self {
            Role::Child => "Child",
            Role::Deceased => "Deceased",
            Role::Mother => "Mother",
            Role::Father => "Father",
            Role::Informant => "Informant",
        }
    }
}

/// The event a place refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Birth,
    Death,
}

impl EventKind {
    fn place_suffix(&self) -> &'static str {
        match self {
            EventKind::Birth => "PlaceOfBirth",
            EventKind::Death => "PlaceOfDeath",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Address {
    pub country: Option<String>,
    pub state: Option<String>,
    pub district: Option<String>,
    pub commune: Option<String>,
    pub fokontany: Option<String>,
    pub international_state: Option<String>,
    pub international_district: Option<String>,
    pub international_city: Option<String>,
    pub line1: Option<String>,
    pub line2: Option<String>,
    pub postal_code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersonDetails {
    pub first_name: Option<String>,
    pub family_name: Option<String>,
    pub birth_date: Option<String>,
    pub year_of_birth: Option<String>,
    pub birth_place: Option<String>,
    pub nationality: Option<String>,
    pub occupation: Option<String>,
    pub gender: Option<String>,
    pub marital_status: Option<String>,
    pub reason_not_applying: Option<String>,
    pub is_deceased: bool,
    pub address: Address,
}

impl PersonDetails {
    /// Family name first, as written on Malagasy acts.
    pub fn full_name(&self) -> Option<String> {
        let parts: Vec<&str> = [self.family_name.as_deref(), self.first_name.as_deref()]
            .into_iter()
            .flatten()
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}

/// Normalised certificate data for one render.
#[derive(Debug, Clone, Default)]
pub struct RecordContext {
    fields: Map<String, Value>,
    mentions: MentionList,
}

impl RecordContext {
    pub fn from_value(value: &Value) -> Self {
        let fields = match value {
            Value::Object(map) => normalize_map(map),
            _ => Map::new(),
        };
        let mentions = MentionList::from_slots(fields.get("mentions"));
        Self { fields, mentions }
    }

    pub fn text(&self, key: &str) -> Option<String> {
        self.fields.get(key).and_then(value_to_text)
    }

    pub fn flag(&self, key: &str) -> bool {
        self.fields.get(key).is_some_and(value_to_flag)
    }

    pub fn mentions(&self) -> &MentionList {
        &self.mentions
    }

    /// Informant relationship code in upper case (`MOTHER`, `UNCLE`, ...).
    pub fn informant_type(&self) -> Option<String> {
        self.text("informantType").map(|t| t.to_ascii_uppercase())
    }

    pub fn person(&self, role: Role) -> PersonDetails {
        let p = role.prefix();
        let s = role.suffix();
        PersonDetails {
            first_name: self.text(&format!("{p}FirstName")),
            family_name: self.text(&format!("{p}FamilyName")),
            birth_date: self.text(&format!("{p}BirthDate")),
            year_of_birth: self.text(&format!("{p}YearOfBirth")),
            birth_place: self.text(&format!("birth{s}BirthPlace")),
            nationality: self.text(&format!("{p}Nationality")),
            occupation: self.text(&format!("{p}Occupation")),
            gender: self.text(&format!("{p}Gender")),
            marital_status: self.text(&format!("{p}MaritalStatus")),
            reason_not_applying: self.text(&format!("{p}ReasonNotApplying")),
            is_deceased: self.flag(&format!("{p}IsDeceased")),
            address: Address {
                country: self.text(&format!("countryPrimary{s}")),
                state: self.text(&format!("{p}PrimaryState")),
                district: self.text(&format!("{p}PrimaryDistrict")),
                commune: self.text(&format!("{p}PrimaryCommune")),
                fokontany: self.text(&format!("{p}PrimaryFokontany")),
                international_state: self.text(&format!("internationalState{s}")),
                international_district: self.text(&format!("internationalDistrict{s}")),
                international_city: self.text(&format!("internationalCity{s}")),
                line1: self.text(&format!("internationalAddressLine1{s}")),
                line2: self.text(&format!("internationalAddressLine2{s}")),
                postal_code: self.text(&format!("internationalPostalCode{s}")),
            },
        }
    }

    /// Address of the event itself (`countryPlaceOfBirth`, ...).
    pub fn event_address(&self, event: EventKind) -> Address {
        let s = event.place_suffix();
        Address {
            country: self.text(&format!("country{s}")),
            state: self.text(&format!("state{s}")),
            district: self.text(&format!("district{s}")),
            commune: self.text(&format!("commune{s}")),
            fokontany: self.text(&format!("fokontany{s}")),
            international_state: self.text(&format!("internationalState{s}")),
            international_district: self.text(&format!("internationalDistrict{s}")),
            international_city: self.text(&format!("internationalCity{s}")),
            line1: self.text(&format!("internationalAddressLine1{s}")),
            line2: self.text(&format!("internationalAddressLine2{s}")),
            postal_code: self.text(&format!("internationalPostalCode{s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sentinels_become_absent() {
        let ctx = RecordContext::from_value(&json!({
            "a": "-",
            "b": " - ",
            "c": "null",
            "d": "undefined",
            "e": null,
            "f": "",
            "g": "  Rabe  "
        }));
        for key in ["a", "b", "c", "d", "e", "f"] {
            assert_eq!(ctx.text(key), None, "{key} should be absent");
        }
        assert_eq!(ctx.text("g").as_deref(), Some("Rabe"));
    }

    #[test]
    fn test_flags_accept_strings_and_bools() {
        let ctx = RecordContext::from_value(&json!({
            "yes": true,
            "str": "true",
            "no": "false",
            "num": 1
        }));
        assert!(ctx.flag("yes"));
        assert!(ctx.flag("str"));
        assert!(ctx.flag("num"));
        assert!(!ctx.flag("no"));
        assert!(!ctx.flag("missing"));
    }

    #[test]
    fn test_person_reads_role_keys() {
        let ctx = RecordContext::from_value(&json!({
            "fatherFamilyName": "Rakoto",
            "fatherFirstName": "Jean",
            "birthFatherBirthPlace": "Antananarivo",
            "countryPrimaryFather": "Madagascar",
            "fatherPrimaryDistrict": "Tana I",
            "fatherOccupation": "Ingénieur",
            "fatherYearOfBirth": 1980
        }));
        let father = ctx.person(Role::Father);
        assert_eq!(father.full_name().as_deref(), Some("Rakoto Jean"));
        assert_eq!(father.birth_place.as_deref(), Some("Antananarivo"));
        assert_eq!(father.address.country.as_deref(), Some("Madagascar"));
        assert_eq!(father.address.district.as_deref(), Some("Tana I"));
        assert_eq!(father.year_of_birth.as_deref(), Some("1980"));
        assert_eq!(ctx.person(Role::Mother).full_name(), None);
    }

    #[test]
    fn test_non_object_input_is_empty() {
        let ctx = RecordContext::from_value(&json!("plain"));
        assert_eq!(ctx.text("anything"), None);
        assert!(ctx.mentions().is_empty());
    }
}
