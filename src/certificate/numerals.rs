//! Malagasy number words.
//!
//! Values are padded to nine digits and read as fixed 2-2-2-1-2 groups:
//! tens of millions, hundred thousands, thousands, hundreds and units.
//! Each non-zero group becomes one segment; segments are read largest first
//! and joined with `sy`.

/// Returned for anything longer than nine digits.
pub const TOO_LARGE: &str = "mihoatra lavitra";

/// Zero on its own.
pub const ZERO: &str = "aotra";

/// "One" when it stands alone or multiplies a magnitude (`iray arivo`).
const ONE: &str = "iray";

const MAX_DIGITS: usize = 9;

/// Unit words in their compound form (`iraika amby roapolo` = 21).
const UNITS: [&str; 10] = [
    "", "iraika", "roa", "telo", "efatra", "dimy", "enina", "fito", "valo", "sivy",
];

const TENS: [&str; 10] = [
    "",
    "folo",
    "roapolo",
    "telopolo",
    "efapolo",
    "dimampolo",
    "enimpolo",
    "fitopolo",
    "valopolo",
    "sivifolo",
];

const HUNDREDS: [&str; 10] = [
    "",
    "zato",
    "roanjato",
    "telonjato",
    "efajato",
    "dimanjato",
    "eninjato",
    "fitonjato",
    "valonjato",
    "sivinjato",
];

const TEN_MILLIONS: &str = "safatsiroa";
const HUNDRED_THOUSANDS: &str = "hetsy";
const THOUSANDS: &str = "arivo";

/// Words for a value between 1 and 99.
fn two_digit_words(n: u32) -> String {
    match n {
        0 => String::new(),
        1 => ONE.to_string(),
        2..=9 => UNITS[n as usize].to_string(),
        10 => TENS[1].to_string(),
        11..=19 => format!("{} ambin'ny folo", UNITS[(n - 10) as usize]),
        _ if n % 10 == 0 => TENS[(n / 10) as usize].to_string(),
        _ => format!(
            "{} amby {}",
            UNITS[(n % 10) as usize],
            TENS[(n / 10) as usize]
        ),
    }
}

fn group_value(digits: &str) -> u32 {
    digits.parse().unwrap_or(0)
}

/// Convert a decimal string to Malagasy words.
///
/// Strings longer than nine digits give [`TOO_LARGE`]; anything that is not
/// a plain run of ASCII digits gives an empty string.
pub fn number_str_to_words(input: &str) -> String {
    let digits = input.trim();
    if digits.len() > MAX_DIGITS {
        return TOO_LARGE.to_string();
    }
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return String::new();
    }

    let padded = format!("{:0>width$}", digits, width = MAX_DIGITS);
    let (ten_millions, rest) = padded.split_at(2);
    let (hundred_thousands, rest) = rest.split_at(2);
    let (thousands, rest) = rest.split_at(2);
    let (hundreds, units) = rest.split_at(1);

    let mut segments: Vec<String> = Vec::new();

    for (group, magnitude) in [
        (ten_millions, TEN_MILLIONS),
        (hundred_thousands, HUNDRED_THOUSANDS),
        (thousands, THOUSANDS),
    ] {
        let value = group_value(group);
        if value != 0 {
            segments.push(format!("{} {}", two_digit_words(value), magnitude));
        }
    }

    let hundreds = group_value(hundreds);
    if hundreds != 0 {
        segments.push(HUNDREDS[hundreds as usize].to_string());
    }

    let units = group_value(units);
    if units != 0 {
        segments.push(two_digit_words(units));
    }

    if segments.is_empty() {
        return ZERO.to_string();
    }

    segments.join(" sy ")
}

/// Convert an integer to Malagasy words.
pub fn number_to_words(n: u64) -> String {
    number_str_to_words(&n.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_and_one() {
        assert_eq!(number_to_words(0), "aotra");
        assert_eq!(number_to_words(1), "iray");
        assert_eq!(number_str_to_words("000"), "aotra");
    }

    #[test]
    fn test_teens_and_tens() {
        assert_eq!(number_to_words(10), "folo");
        assert_eq!(number_to_words(11), "iraika ambin'ny folo");
        assert_eq!(number_to_words(12), "roa ambin'ny folo");
        assert_eq!(number_to_words(20), "roapolo");
        assert_eq!(number_to_words(21), "iraika amby roapolo");
        assert_eq!(number_to_words(59), "sivy amby dimampolo");
    }

    #[test]
    fn test_magnitudes_use_iray() {
        assert_eq!(number_to_words(1000), "iray arivo");
        assert_eq!(number_to_words(100_000), "iray hetsy");
        assert_eq!(number_to_words(10_000_000), "iray safatsiroa");
        assert!(!number_to_words(1000).contains("iraika"));
    }

    #[test]
    fn test_composed_values() {
        assert_eq!(number_to_words(100), "zato");
        assert_eq!(number_to_words(101), "zato sy iray");
        assert_eq!(number_to_words(2024), "roa arivo sy efatra amby roapolo");
        assert_eq!(
            number_to_words(1985),
            "iray arivo sy sivinjato sy dimy amby valopolo"
        );
        assert_eq!(number_to_words(21_000), "iraika amby roapolo arivo");
    }

    #[test]
    fn test_upper_bound() {
        let words = number_to_words(999_999_999);
        assert!(!words.is_empty());
        assert_eq!(words, number_to_words(999_999_999));
        assert_eq!(number_to_words(1_000_000_000), TOO_LARGE);
        assert_eq!(number_str_to_words("12345678901"), TOO_LARGE);
    }

    #[test]
    fn test_non_numeric_input() {
        assert_eq!(number_str_to_words(""), "");
        assert_eq!(number_str_to_words("12a"), "");
        assert_eq!(number_str_to_words(" 7 "), "fito");
    }
}
