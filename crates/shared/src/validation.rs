//! Common validation utilities and answer value parsing.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use validator::{ValidateEmail, ValidationError};

lazy_static! {
    /// `1234`, `1234.5`, `1234,5`
    static ref PLAIN_NUMBER: Regex = Regex::new(r"^-?\d+([.,]\d+)?$").unwrap();
    /// `1.234`, `1.234.567,89`
    static ref DOT_GROUPED_NUMBER: Regex = Regex::new(r"^-?\d{1,3}(\.\d{3})+(,\d+)?$").unwrap();
    /// `1,234`, `1,234,567.89`
    static ref COMMA_GROUPED_NUMBER: Regex =
        Regex::new(r"^-?\d{1,3}(,\d{3})+(\.\d+)?$").unwrap();
}

/// Accepted date layouts for date answers and form dates.
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d/%m/%Y"];

/// Parses a monetary or numeric answer.
///
/// Accepts a leading or trailing euro sign, space-separated thousands, and
/// either separator for decimals. Dots followed by groups of exactly three
/// digits are thousands (`1.234`, `250.000`); `1234.5` and `1234,56` are
/// decimals.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let trimmed = trimmed
        .strip_prefix('€')
        .or_else(|| trimmed.strip_suffix('€'))
        .or_else(|| trimmed.strip_suffix("EUR"))
        .or_else(|| trimmed.strip_suffix("eur"))
        .unwrap_or(trimmed);

    let compact: String = trimmed
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{a0}' && *c != '\u{202f}')
        .collect();

    if compact.is_empty() {
        return None;
    }

    let canonical = if DOT_GROUPED_NUMBER.is_match(&compact) {
        compact.replace('.', "").replace(',', ".")
    } else if PLAIN_NUMBER.is_match(&compact) {
        compact.replace(',', ".")
    } else if COMMA_GROUPED_NUMBER.is_match(&compact) {
        compact.replace(',', "")
    } else {
        return None;
    };

    canonical.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parses a date answer in ISO (`2024-03-01`) or Portuguese (`01/03/2024`) layout.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
}

/// Returns true if the value is a syntactically valid email address.
pub fn is_valid_email(raw: &str) -> bool {
    let trimmed = raw.trim();
    !trimmed.is_empty() && trimmed.validate_email()
}

/// Rejects strings that are empty after trimming.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Value must not be blank".into());
        Err(err)
    } else {
        Ok(())
    }
}
