//! Statement composers: the prose paragraphs of a certificate.
//!
//! Every composer takes a [`RecordContext`] and returns one string. Missing
//! values never abort composition: they are dropped from the joined
//! fragments or replaced with `-`.

use super::address::{address_or_placeholder, address_phrase, LOCAL_COUNTRY};
use super::context::{EventKind, PersonDetails, RecordContext, Role};
use super::dates::{
    convert_date_with_fallback, date_to_words, time_to_words, to_local_parts, PLACEHOLDER,
};

/// Separator used between statement fragments.
pub const DEFAULT_SEPARATOR: &str = ", ";

/// Mother's marital status values that mean "married". These must match the
/// translation strings the platform sends, byte for byte.
pub const MARRIED_SPELLINGS: [&str; 5] = ["married", "MARRIED", "marié(e)", "Marié(e)", "manambady"];

const LOCAL_NATIONALITIES: [&str; 3] = ["Malagasy", "MDG", LOCAL_COUNTRY];

/// Join the present, non-blank values with `separator`.
pub fn join_values<I>(values: I, separator: &str) -> String
where
    I: IntoIterator<Item = Option<String>>,
{
    values
        .into_iter()
        .flatten()
        .filter(|value| !value.trim().is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}

// ============================================================================
// Predicates
// ============================================================================

pub fn is_mother_married(ctx: &RecordContext) -> bool {
    ctx.text("motherMaritalStatus")
        .is_some_and(|status| MARRIED_SPELLINGS.contains(&status.as_str()))
}

pub fn father_has_recognised_child(ctx: &RecordContext) -> bool {
    ctx.flag("fatherHasFormallyRecognisedChild")
}

/// False when the record gives a reason for leaving the father out.
pub fn father_details_apply(ctx: &RecordContext) -> bool {
    ctx.text("fatherReasonNotApplying").is_none()
}

/// The father's details appear only when they apply and the parents are
/// married or the father formally recognised the child.
pub fn can_show_father_details(ctx: &RecordContext) -> bool {
    father_details_apply(ctx) && (is_mother_married(ctx) || father_has_recognised_child(ctx))
}

/// Variant used by the simplified templates: a deceased father is also shown.
pub fn can_show_father_details_simplified(ctx: &RecordContext) -> bool {
    father_details_apply(ctx) && (can_show_father_details(ctx) || ctx.flag("fatherIsDeceased"))
}

pub fn is_informant_legal_father(ctx: &RecordContext) -> bool {
    ctx.informant_type().as_deref() == Some("FATHER") && can_show_father_details(ctx)
}

fn mother_details_apply(ctx: &RecordContext) -> bool {
    ctx.text("motherReasonNotApplying").is_none()
}

// ============================================================================
// Person fragments
// ============================================================================

fn birth_date_phrase(person: &PersonDetails) -> Option<String> {
    if let Some(words) = person.birth_date.as_deref().and_then(date_to_words) {
        return Some(format!("tamin'ny {words}"));
    }
    person
        .year_of_birth
        .as_deref()
        .and_then(|year| year.trim().parse::<u64>().ok())
        .map(|year| format!("tamin'ny taona {}", super::numerals::number_to_words(year)))
}

fn birth_phrase(person: &PersonDetails) -> Option<String> {
    match (birth_date_phrase(person), person.birth_place.as_deref()) {
        (Some(date), Some(place)) => Some(format!("teraka {date} tao {place}")),
        (Some(date), None) => Some(format!("teraka {date}")),
        (None, Some(place)) => Some(format!("teraka tao {place}")),
        (None, None) => None,
    }
}

fn nationality_phrase(person: &PersonDetails) -> Option<String> {
    person
        .nationality
        .as_deref()
        .filter(|n| !LOCAL_NATIONALITIES.iter().any(|local| local.eq_ignore_ascii_case(n)))
        .map(|n| format!("teratany {n}"))
}

/// Birth, nationality, occupation and residence of one person.
fn person_detail_fragments(person: &PersonDetails) -> Vec<Option<String>> {
    vec![
        birth_phrase(person),
        nationality_phrase(person),
        person.occupation.clone(),
        address_phrase(&person.address).map(|a| format!("monina ao {a}")),
    ]
}

fn name_or_placeholder(person: &PersonDetails) -> String {
    person.full_name().unwrap_or_else(|| PLACEHOLDER.to_string())
}

fn gender_word(gender: Option<&str>, event: EventKind) -> Option<String> {
    let word = match (gender?.trim().to_ascii_lowercase().as_str(), event) {
        ("male", EventKind::Birth) => "zazalahy",
        ("female", EventKind::Birth) => "zazavavy",
        ("male", EventKind::Death) => "lehilahy",
        ("female", EventKind::Death) => "vehivavy",
        _ => return None,
    };
    Some(word.to_string())
}

fn event_place(ctx: &RecordContext, facility_key: &str, event: EventKind) -> String {
    ctx.text(facility_key)
        .unwrap_or_else(|| address_or_placeholder(&ctx.event_address(event)))
}

// ============================================================================
// Parent statements
// ============================================================================

fn father_statement_with(ctx: &RecordContext, show: bool) -> String {
    if !show {
        return String::new();
    }
    let father = ctx.person(Role::Father);

    let mut fragments = vec![Some(format!("zanak'i {}", name_or_placeholder(&father)))];
    fragments.extend(person_detail_fragments(&father));
    let body = join_values(fragments, DEFAULT_SEPARATOR);

    if mother_details_apply(ctx) {
        format!("{body} sy")
    } else {
        format!("{body}.")
    }
}

/// Father paragraph, ending in `sy` when the mother's paragraph follows.
pub fn father_statement(ctx: &RecordContext) -> String {
    father_statement_with(ctx, can_show_father_details(ctx))
}

pub fn father_statement_simplified(ctx: &RecordContext) -> String {
    father_statement_with(ctx, can_show_father_details_simplified(ctx))
}

/// Mother paragraph. Opens with `zanak'i` when no father paragraph precedes it.
pub fn mother_statement(ctx: &RecordContext) -> String {
    if !mother_details_apply(ctx) {
        return String::new();
    }
    let mother = ctx.person(Role::Mother);
    let name = name_or_placeholder(&mother);
    let opening = if can_show_father_details(ctx) {
        name
    } else {
        format!("zanak'i {name}")
    };

    let mut fragments = vec![Some(opening)];
    fragments.extend(person_detail_fragments(&mother));
    format!("{}.", join_values(fragments, DEFAULT_SEPARATOR))
}

// ============================================================================
// Event statements
// ============================================================================

fn event_statement(
    ctx: &RecordContext,
    subject: Role,
    event: EventKind,
    date_key: &str,
    time_key: &str,
    facility_key: &str,
) -> String {
    let person = ctx.person(subject);
    let date = ctx
        .text(date_key)
        .as_deref()
        .and_then(date_to_words)
        .unwrap_or_else(|| PLACEHOLDER.to_string());
    let verb = match event {
        EventKind::Birth => "teraka",
        EventKind::Death => "maty",
    };

    let mut fragments = vec![
        Some(format!("Tamin'ny {date}")),
        ctx.text(time_key)
            .as_deref()
            .and_then(time_to_words)
            .map(|t| format!("tamin'ny {t}")),
        Some(format!(
            "no {verb} tao {} i {}",
            event_place(ctx, facility_key, event),
            name_or_placeholder(&person)
        )),
        gender_word(person.gender.as_deref(), event),
    ];
    if event == EventKind::Death {
        fragments.extend(person_detail_fragments(&person));
    }

    format!("{}.", join_values(fragments, DEFAULT_SEPARATOR))
}

/// Birth paragraph: when, where, who and the child's sex.
pub fn birth_event_statement(ctx: &RecordContext) -> String {
    event_statement(
        ctx,
        Role::Child,
        EventKind::Birth,
        "childBirthDate",
        "childBirthTime",
        "placeOfBirth",
    )
}

/// Death paragraph, including the deceased's own details.
pub fn death_event_statement(ctx: &RecordContext) -> String {
    event_statement(
        ctx,
        Role::Deceased,
        EventKind::Death,
        "deceasedDeathDate",
        "deceasedDeathTime",
        "placeOfDeath",
    )
}

// ============================================================================
// Registration statement
// ============================================================================

/// Kinship word for an informant relationship code.
pub fn kinship_word(informant_type: &str) -> Option<&'static str> {
    let word = match informant_type.to_ascii_uppercase().as_str() {
        "MOTHER" => "reniny",
        "FATHER" => "rainy",
        "BROTHER" => "rahalahiny",
        "SISTER" => "anabaviny",
        "UNCLE" => "dadatoany",
        "AUNT" => "nenitoany",
        "GRANDFATHER" => "raibeny",
        "GRANDMOTHER" => "renibeny",
        _ => return None,
    };
    Some(word)
}

fn informant_person(ctx: &RecordContext) -> PersonDetails {
    match ctx.informant_type().as_deref() {
        Some("MOTHER") => ctx.person(Role::Mother),
        Some("FATHER") => ctx.person(Role::Father),
        _ => ctx.person(Role::Informant),
    }
}

fn informant_details_omitted(ctx: &RecordContext) -> bool {
    ctx.informant_type().as_deref() == Some("MOTHER") || is_informant_legal_father(ctx)
}

/// The informant's own details, empty when the informant is the mother or
/// the legal father (their details already appear in the parent paragraphs).
pub fn informant_statement(ctx: &RecordContext) -> String {
    if informant_details_omitted(ctx) {
        return String::new();
    }
    join_values(
        person_detail_fragments(&informant_person(ctx)),
        DEFAULT_SEPARATOR,
    )
}

/// Registration paragraph: when it was recorded, who declared it and the
/// registrar who signed.
pub fn registration_statement(ctx: &RecordContext) -> String {
    let registered_at = ctx.text("registrationDate");
    let signed_at = ctx.text("registrarSignedDate");
    let local = registered_at.as_deref().and_then(to_local_parts);

    let local_date = local.as_ref().map(|parts| parts.date());
    let date = convert_date_with_fallback(
        local_date.as_deref().or(registered_at.as_deref()),
        signed_at.as_deref(),
    );
    let time = local
        .as_ref()
        .and_then(|parts| time_to_words(&parts.time()))
        .map(|t| format!("tamin'ny {t}"));

    let informant_type = ctx.informant_type();
    let relationship = informant_type
        .as_deref()
        .and_then(kinship_word)
        .map(str::to_string)
        .or_else(|| ctx.text("informantRelationship"));

    let registrar = join_values(
        [ctx.text("registrarName"), ctx.text("registrarTitle")],
        DEFAULT_SEPARATOR,
    );

    let fragments = vec![
        Some(format!("Nosoratana tamin'ny {date}")),
        time,
        Some(format!(
            "araka ny fanambarana nataon'i {}",
            name_or_placeholder(&informant_person(ctx))
        )),
        relationship,
        Some(informant_statement(ctx)),
        Some("izay nanao sonia niaraka taminay".to_string()),
        (!registrar.is_empty()).then_some(registrar),
    ];

    format!("{}.", join_values(fragments, DEFAULT_SEPARATOR))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn father_context(status: &str) -> RecordContext {
        RecordContext::from_value(&json!({
            "motherMaritalStatus": status,
            "fatherFamilyName": "Rakoto",
            "fatherFirstName": "Jean",
            "fatherBirthDate": "1980-05-10",
            "birthFatherBirthPlace": "Antananarivo",
            "countryPrimaryFather": "Madagascar",
            "fatherPrimaryDistrict": "Tana I",
            "fatherOccupation": "Ingénieur"
        }))
    }

    #[test]
    fn test_join_values_filters_blanks() {
        assert_eq!(
            join_values(
                [Some("a".into()), None, Some("  ".into()), Some("b".into())],
                " / "
            ),
            "a / b"
        );
    }

    #[test]
    fn test_every_married_spelling_shows_father() {
        for status in MARRIED_SPELLINGS {
            let ctx = father_context(status);
            assert!(can_show_father_details(&ctx), "{status}");
            assert!(!father_statement(&ctx).is_empty(), "{status}");
        }
    }

    #[test]
    fn test_unmarried_unrecognised_father_hidden() {
        let ctx = RecordContext::from_value(&json!({
            "motherMaritalStatus": "single",
            "fatherFamilyName": ""
        }));
        assert_eq!(father_statement(&ctx), "");
    }

    #[test]
    fn test_recognition_or_death_show_father() {
        let recognised = RecordContext::from_value(&json!({
            "motherMaritalStatus": "single",
            "fatherHasFormallyRecognisedChild": true,
            "fatherFamilyName": "Rabe"
        }));
        assert!(can_show_father_details(&recognised));

        let deceased = RecordContext::from_value(&json!({
            "motherMaritalStatus": "single",
            "fatherIsDeceased": "true",
            "fatherFamilyName": "Rabe"
        }));
        assert!(!can_show_father_details(&deceased));
        assert!(can_show_father_details_simplified(&deceased));
        assert_eq!(father_statement(&deceased), "");
        assert!(father_statement_simplified(&deceased).starts_with("zanak'i Rabe"));
    }

    #[test]
    fn test_father_statement_full_sentence() {
        let statement = father_statement(&father_context("marié(e)"));
        assert_eq!(
            statement,
            "zanak'i Rakoto Jean, teraka tamin'ny folo Mey, taona iray arivo sy sivinjato sy valopolo tao Antananarivo, Ingénieur, monina ao distrikan'i Antananarivo Renivohitra sy"
        );
    }

    #[test]
    fn test_father_statement_closes_without_mother() {
        let ctx = RecordContext::from_value(&json!({
            "motherMaritalStatus": "married",
            "motherReasonNotApplying": "Unknown",
            "fatherFamilyName": "Rakoto"
        }));
        assert_eq!(father_statement(&ctx), "zanak'i Rakoto.");
        assert_eq!(mother_statement(&ctx), "");
    }

    #[test]
    fn test_father_not_applying_is_left_out() {
        let ctx = RecordContext::from_value(&json!({
            "motherMaritalStatus": "married",
            "fatherReasonNotApplying": "Unknown",
            "fatherIsDeceased": true,
            "motherFamilyName": "Rasoa",
            "informantType": "FATHER"
        }));
        assert!(!father_details_apply(&ctx));
        assert!(!can_show_father_details(&ctx));
        assert!(!can_show_father_details_simplified(&ctx));
        assert_eq!(father_statement(&ctx), "");
        assert_eq!(father_statement_simplified(&ctx), "");
        assert!(!is_informant_legal_father(&ctx));
        assert!(mother_statement(&ctx).starts_with("zanak'i Rasoa"));
    }

    #[test]
    fn test_mother_statement_opening() {
        let married = RecordContext::from_value(&json!({
            "motherMaritalStatus": "married",
            "motherFamilyName": "Rasoa",
            "motherFirstName": "Marie",
            "motherYearOfBirth": "1985",
            "motherOccupation": "Mpampianatra"
        }));
        assert_eq!(
            mother_statement(&married),
            "Rasoa Marie, teraka tamin'ny taona iray arivo sy sivinjato sy dimy amby valopolo, Mpampianatra."
        );

        let single = RecordContext::from_value(&json!({
            "motherMaritalStatus": "single",
            "motherFamilyName": "Rasoa"
        }));
        assert_eq!(mother_statement(&single), "zanak'i Rasoa.");
    }

    #[test]
    fn test_foreign_nationality_and_address() {
        let ctx = RecordContext::from_value(&json!({
            "motherMaritalStatus": "single",
            "motherFamilyName": "Dupont",
            "motherNationality": "France",
            "countryPrimaryMother": "France",
            "internationalCityMother": "Lyon"
        }));
        assert_eq!(
            mother_statement(&ctx),
            "zanak'i Dupont, teratany France, monina ao Lyon, France."
        );
    }

    #[test]
    fn test_birth_event_statement() {
        let ctx = RecordContext::from_value(&json!({
            "childFamilyName": "Rakotobe",
            "childFirstName": "Hery",
            "childGender": "male",
            "childBirthDate": "2024-01-01",
            "childBirthTime": "13:30",
            "placeOfBirth": "CHU Befelatanana"
        }));
        assert_eq!(
            birth_event_statement(&ctx),
            "Tamin'ny voalohan'ny volana Janoary, taona roa arivo sy efatra amby roapolo, tamin'ny iray ora sy telopolo minitra tolakandro, no teraka tao CHU Befelatanana i Rakotobe Hery, zazalahy."
        );
    }

    #[test]
    fn test_death_event_statement_uses_address_when_no_facility() {
        let ctx = RecordContext::from_value(&json!({
            "deceasedFamilyName": "Randria",
            "deceasedGender": "female",
            "deceasedDeathDate": "2023-07-04",
            "countryPlaceOfDeath": "Madagascar",
            "districtPlaceOfDeath": "Majunga",
            "deceasedOccupation": "Mpamboly"
        }));
        let statement = death_event_statement(&ctx);
        assert!(statement.starts_with("Tamin'ny efatra Jolay, taona roa arivo sy telo"));
        assert!(statement.contains("no maty tao distrikan'i Mahajanga i Randria, vehivavy"));
        assert!(statement.ends_with("Mpamboly."));
    }

    #[test]
    fn test_registration_statement_omits_mother_informant_details() {
        let ctx = RecordContext::from_value(&json!({
            "informantType": "MOTHER",
            "motherFamilyName": "Rasoa",
            "motherOccupation": "Mpivarotra",
            "registrationDate": "2024-03-10T21:00:00.000Z",
            "registrarName": "Rabenja Lova",
            "registrarTitle": "Mpiandraikitra ny sora-piankohonana"
        }));
        assert_eq!(informant_statement(&ctx), "");
        assert_eq!(
            registration_statement(&ctx),
            "Nosoratana tamin'ny iraika ambin'ny folo Martsa, taona roa arivo sy efatra amby roapolo, tamin'ny roa ambin'ny folo ora alina, araka ny fanambarana nataon'i Rasoa, reniny, izay nanao sonia niaraka taminay, Rabenja Lova, Mpiandraikitra ny sora-piankohonana."
        );
    }

    #[test]
    fn test_registration_statement_other_informant() {
        let ctx = RecordContext::from_value(&json!({
            "informantType": "uncle",
            "informantFamilyName": "Rakotonirina",
            "informantFirstName": "Solo",
            "informantOccupation": "Mpanjono",
            "registrarSignedDate": "2024-02-20"
        }));
        let statement = registration_statement(&ctx);
        assert!(statement.starts_with("Nosoratana tamin'ny roapolo Febroary, taona roa arivo"));
        assert!(statement.contains("nataon'i Rakotonirina Solo, dadatoany, Mpanjono"));
    }

    #[test]
    fn test_legal_father_informant() {
        let ctx = RecordContext::from_value(&json!({
            "informantType": "FATHER",
            "motherMaritalStatus": "Marié(e)",
            "fatherFamilyName": "Rakoto",
            "fatherOccupation": "Mpamboly"
        }));
        assert!(is_informant_legal_father(&ctx));
        assert_eq!(informant_statement(&ctx), "");

        let unmarried = RecordContext::from_value(&json!({
            "informantType": "FATHER",
            "motherMaritalStatus": "single",
            "fatherFamilyName": "Rakoto",
            "fatherOccupation": "Mpamboly"
        }));
        assert!(!is_informant_legal_father(&unmarried));
        assert_eq!(informant_statement(&unmarried), "Mpamboly");
    }
}
