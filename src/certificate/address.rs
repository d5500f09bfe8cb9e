//! Address phrases for statements.

use super::context::Address;

/// Addresses in this country use the administrative hierarchy.
pub const LOCAL_COUNTRY: &str = "Madagascar";

const PLACEHOLDER: &str = "-";

/// Prefixes the platform's location names carry; longest first.
const ADMIN_PREFIXES: [&str; 9] = [
    "Commune Urbaine ",
    "Commune Rurale ",
    "District de ",
    "District d'",
    "Fokontany ",
    "Commune ",
    "District ",
    "CU ",
    "CR ",
];

/// Abbreviated or colonial-era names and their official form.
const NAME_ALIASES: [(&str, &str); 13] = [
    ("Tana I", "Antananarivo Renivohitra"),
    ("Tana II", "Antananarivo Renivohitra"),
    ("Tana III", "Antananarivo Renivohitra"),
    ("Tana IV", "Antananarivo Renivohitra"),
    ("Tana V", "Antananarivo Renivohitra"),
    ("Tana VI", "Antananarivo Renivohitra"),
    ("Tana", "Antananarivo"),
    ("Tamatave", "Toamasina"),
    ("Majunga", "Mahajanga"),
    ("Tuléar", "Toliara"),
    ("Diego-Suarez", "Antsiranana"),
    ("Diego", "Antsiranana"),
    ("Fort-Dauphin", "Taolagnaro"),
];

/// Strip administrative prefixes and expand known aliases.
pub fn normalize_location_name(name: &str) -> String {
    let mut trimmed = name.trim();
    if let Some(stripped) = ADMIN_PREFIXES
        .iter()
        .find_map(|prefix| trimmed.strip_prefix(prefix))
    {
        trimmed = stripped.trim();
    }
    NAME_ALIASES
        .iter()
        .find(|(alias, _)| *alias == trimmed)
        .map(|(_, official)| official.to_string())
        .unwrap_or_else(|| trimmed.to_string())
}

pub fn is_local_country(country: Option<&str>) -> bool {
    match country {
        None => true,
        Some(c) => {
            let c = c.trim();
            c.eq_ignore_ascii_case(LOCAL_COUNTRY) || c.eq_ignore_ascii_case("MDG")
        }
    }
}

fn domestic_phrase(address: &Address) -> Option<String> {
    let parts: Vec<String> = [
        address.fokontany.as_deref().map(|f| format!("fokontany {}", normalize_location_name(f))),
        address.commune.as_deref().map(|c| format!("kaominina {}", normalize_location_name(c))),
        address.district.as_deref().map(|d| format!("distrikan'i {}", normalize_location_name(d))),
    ]
    .into_iter()
    .flatten()
    .collect();

    if parts.is_empty() {
        address.state.clone()
    } else {
        Some(parts.join(", "))
    }
}

fn international_phrase(address: &Address) -> Option<String> {
    let parts: Vec<&str> = [
        address.line1.as_deref(),
        address.line2.as_deref(),
        address.international_city.as_deref(),
        address.international_district.as_deref(),
        address.international_state.as_deref(),
        address.postal_code.as_deref(),
        address.country.as_deref(),
    ]
    .into_iter()
    .flatten()
    .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}

/// Address as a phrase, `None` when nothing usable is present.
pub fn address_phrase(address: &Address) -> Option<String> {
    if is_local_country(address.country.as_deref()) {
        domestic_phrase(address)
    } else {
        international_phrase(address)
    }
}

/// Address as a phrase, `-` when nothing usable is present.
pub fn address_or_placeholder(address: &Address) -> String {
    address_phrase(address).unwrap_or_else(|| PLACEHOLDER.to_string())
}
