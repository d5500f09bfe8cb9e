//! Dates and times rendered as Malagasy words.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use lazy_static::lazy_static;
use regex::Regex;

use super::numerals::number_to_words;

/// Placeholder used when a date or time cannot be rendered.
pub const PLACEHOLDER: &str = "-";

/// Month names, 1-based. Index 0 is never used.
pub const MONTHS: [&str; 13] = [
    "",
    "Janoary",
    "Febroary",
    "Martsa",
    "Aprily",
    "Mey",
    "Jona",
    "Jolay",
    "Aogositra",
    "Septambra",
    "Oktobra",
    "Novambra",
    "Desambra",
];

const FIRST_OF_MONTH: &str = "voalohan'ny volana";

/// Fixed local offset of the deployment (Africa/Nairobi, no DST).
pub const LOCAL_OFFSET_SECONDS: i32 = 3 * 3600;

const MIDNIGHT_HOUR: &str = "roa ambin'ny folo ora";

lazy_static! {
    static ref ORDINAL_SUFFIX: Regex =
        Regex::new(r"\b(\d{1,2})(?:st|nd|rd|th|er|re|ème|eme)\b").expect("valid ordinal regex");
}

/// Time-of-day bucket used after the hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayPeriod {
    Maraina,
    Antoandro,
    Tolakandro,
    Hariva,
    Alina,
}

impl DayPeriod {
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=11 => DayPeriod::Maraina,
            12 => DayPeriod::Antoandro,
            13..=16 => DayPeriod::Tolakandro,
            17..=18 => DayPeriod::Hariva,
            _ => DayPeriod::Alina,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DayPeriod::Maraina => "maraina",
            DayPeriod::Antoandro => "antoandro",
            DayPeriod::Tolakandro => "tolakandro",
            DayPeriod::Hariva => "hariva",
            DayPeriod::Alina => "alina",
        }
    }
}

/// Remove ordinal suffixes from day numbers (`1st` -> `1`).
pub fn strip_ordinal_suffix(input: &str) -> String {
    ORDINAL_SUFFIX.replace_all(input, "$1").into_owned()
}

/// Parse a `YYYY-MM-DD` date, or the date part of a date-time.
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let cleaned = strip_ordinal_suffix(input.trim());
    if let Ok(date) = NaiveDate::parse_from_str(&cleaned, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(&cleaned) {
        return Some(dt.date_naive());
    }
    cleaned
        .get(..10)
        .and_then(|head| NaiveDate::parse_from_str(head, "%Y-%m-%d").ok())
}

/// Parse `HH:MM` or `HH:MM:SS`.
pub fn parse_time(input: &str) -> Option<NaiveTime> {
    let trimmed = input.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .ok()
}

/// `"<day> <month>, taona <year>"`, or `None` when the input is not a date.
pub fn date_to_words(input: &str) -> Option<String> {
    let date = parse_date(input)?;
    let day = if date.day() == 1 {
        FIRST_OF_MONTH.to_string()
    } else {
        number_to_words(u64::from(date.day()))
    };
    let month = MONTHS[date.month() as usize];
    let year = number_to_words(date.year().max(0) as u64);
    Some(format!("{day} {month}, taona {year}"))
}

/// Date in words, `-` when absent or unparseable.
pub fn convert_date_to_words(input: &str) -> String {
    date_to_words(input).unwrap_or_else(|| PLACEHOLDER.to_string())
}

/// Date in words, falling back to `fallback` when `date` is absent or invalid.
pub fn convert_date_with_fallback(date: Option<&str>, fallback: Option<&str>) -> String {
    date.and_then(date_to_words)
        .or_else(|| fallback.and_then(date_to_words))
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

/// Time of day in words, or `None` when the input is not a time.
pub fn time_to_words(input: &str) -> Option<String> {
    let time = parse_time(input)?;
    let (hour, minute) = (time.hour(), time.minute());

    if hour == 0 {
        return Some(if minute == 0 {
            format!("{MIDNIGHT_HOUR} alina")
        } else {
            format!(
                "{MIDNIGHT_HOUR} sy {} minitra alina",
                number_to_words(u64::from(minute))
            )
        });
    }

    let hour_of_twelve = match hour % 12 {
        0 => 12,
        h => h,
    };
    let hour_words = number_to_words(u64::from(hour_of_twelve));
    let period = DayPeriod::from_hour(hour).as_str();

    Some(if minute == 0 {
        format!("{hour_words} ora {period}")
    } else {
        format!(
            "{hour_words} ora sy {} minitra {period}",
            number_to_words(u64::from(minute))
        )
    })
}

/// Time in words, `-` when absent or unparseable.
pub fn convert_time_to_words(input: &str) -> String {
    time_to_words(input).unwrap_or_else(|| PLACEHOLDER.to_string())
}

/// Local date-time fields at the fixed `+03:00` offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalParts {
    pub year: String,
    pub month: String,
    pub day: String,
    pub hour: String,
    pub minute: String,
    pub second: String,
}

impl LocalParts {
    pub fn date(&self) -> String {
        format!("{}-{}-{}", self.year, self.month, self.day)
    }

    pub fn time(&self) -> String {
        format!("{}:{}", self.hour, self.minute)
    }

    pub fn to_iso(&self) -> String {
        format!(
            "{}-{}-{}T{}:{}:{}+03:00",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

/// Some formatters report midnight as `24`.
pub fn normalize_hour(hour: &str) -> String {
    if hour == "24" {
        "00".to_string()
    } else {
        hour.to_string()
    }
}

fn parse_utc(input: &str) -> Option<DateTime<Utc>> {
    let trimmed = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Split a UTC timestamp into local `+03:00` fields.
pub fn to_local_parts(utc_iso: &str) -> Option<LocalParts> {
    let utc = parse_utc(utc_iso)?;
    let offset = FixedOffset::east_opt(LOCAL_OFFSET_SECONDS)?;
    let local = utc.with_timezone(&offset);

    Some(LocalParts {
        year: format!("{:04}", local.year()),
        month: format!("{:02}", local.month()),
        day: format!("{:02}", local.day()),
        hour: normalize_hour(&format!("{:02}", local.hour())),
        minute: format!("{:02}", local.minute()),
        second: format!("{:02}", local.second()),
    })
}

/// UTC ISO timestamp rewritten at the fixed `+03:00` offset.
pub fn to_local_iso(utc_iso: &str) -> Option<String> {
    to_local_parts(utc_iso).map(|parts| parts.to_iso())
}
