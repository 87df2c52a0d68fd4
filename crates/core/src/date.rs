use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::validation::ValidationError;

/// Canonical storage format for due dates.
pub const DUE_DATE_FORMAT: &str = "%Y-%m-%d";

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
];

/// Parses a user supplied due date into a calendar date.
///
/// Month and day may be given without zero padding (`2023-1-5`). Date-time
/// inputs are accepted and truncated to their date component as written,
/// without any timezone conversion.
pub fn parse_due_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(ValidationError::InvalidDueDate);
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.date_naive());
    }

    if let Some(parsed) = DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
    {
        return Ok(parsed.date());
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .ok_or(ValidationError::InvalidDueDate)
}

/// Renders a date in the canonical `YYYY-MM-DD` form.
pub fn format_due_date(date: NaiveDate) -> String {
    date.format(DUE_DATE_FORMAT).to_string()
}

/// Parses and re-renders a due date in canonical form.
pub fn normalize_due_date(raw: &str) -> Result<String, ValidationError> {
    parse_due_date(raw).map(format_due_date)
}
