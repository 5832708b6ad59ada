//! Field rules shared by the venue, user and booking-domain models.
//!
//! Validators push human-readable messages into a `Vec<String>` so callers can
//! report every problem at once.

use std::sync::LazyLock;

use regex::Regex;

static COUNTRY_CODE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"^[A-Z]{2}$").ok());
static CURRENCY_CODE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"^[A-Z]{3}$").ok());
static EMAIL: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"^.+@.+\..+$").ok());
static CLOCK_TIME: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^([0-1]?[0-9]|2[0-3]):[0-5][0-9]$").ok());

fn matches(pattern: &LazyLock<Option<Regex>>, value: &str) -> bool {
    pattern.as_ref().is_some_and(|re| re.is_match(value))
}

/// ISO 3166-1 alpha-2, uppercase.
pub fn is_country_code(value: &str) -> bool {
    matches(&COUNTRY_CODE, value)
}

/// ISO 4217, uppercase.
pub fn is_currency_code(value: &str) -> bool {
    matches(&CURRENCY_CODE, value)
}

pub fn is_email(value: &str) -> bool {
    matches(&EMAIL, value)
}

/// 24-hour `HH:mm` (a single-digit hour is accepted).
pub fn is_clock_time(value: &str) -> bool {
    matches(&CLOCK_TIME, value)
}

/// Minutes since midnight for a value accepted by [`is_clock_time`].
pub fn clock_minutes(value: &str) -> Option<u32> {
    if !is_clock_time(value) {
        return None;
    }
    let (hours, minutes) = value.split_once(':')?;
    Some(hours.parse::<u32>().ok()? * 60 + minutes.parse::<u32>().ok()?)
}

pub fn check_country(field: &str, value: &str, errors: &mut Vec<String>) {
    if !is_country_code(value) {
        errors.push(format!(
            "{field} must be a 2-letter uppercase ISO country code (e.g. 'GB')"
        ));
    }
}

pub fn check_currency(field: &str, value: &str, errors: &mut Vec<String>) {
    if !is_currency_code(value) {
        errors.push(format!(
            "{field} must be a 3-letter uppercase ISO currency code (e.g. 'GBP')"
        ));
    }
}

pub fn check_range(field: &str, value: f64, min: f64, max: f64, errors: &mut Vec<String>) {
    if !value.is_finite() || value < min || value > max {
        errors.push(format!("{field} must be between {min} and {max}"));
    }
}

pub fn check_not_blank(field: &str, value: &str, errors: &mut Vec<String>) {
    if value.trim().is_empty() {
        errors.push(format!("{field} must not be empty"));
    }
}

pub fn check_max_len(field: &str, value: Option<&str>, max: usize, errors: &mut Vec<String>) {
    if let Some(value) = value
        && value.chars().count() > max
    {
        errors.push(format!("{field} must be at most {max} characters"));
    }
}

/// Converts accumulated messages into a `Result`.
pub fn finish(errors: Vec<String>) -> Result<(), Vec<String>> {
    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
