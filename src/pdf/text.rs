use std::borrow::Cow;

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::error::Error;

pub const ELLIPSIS: &str = "...";
/// Placeholder for absent scalar values.
pub const NOT_AVAILABLE: &str = "N/A";
pub const INVALID_DATE: &str = "Invalid Date";

/// Cut `value` to `max_chars` characters and mark the cut with [`ELLIPSIS`].
pub fn truncate(value: &str, max_chars: usize) -> Cow<'_, str> {
    match value.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => Cow::Owned(format!("{}{ELLIPSIS}", &value[..byte_idx])),
        None => Cow::Borrowed(value),
    }
}

/// Render an ISO date (`YYYY-MM-DD` or RFC 3339) as `M/D/YYYY`.
pub fn format_date(raw: Option<&str>) -> String {
    let Some(raw) = raw.map(str::trim) else {
        return NOT_AVAILABLE.to_string();
    };
    parse_date(raw)
        .map(format_naive_date)
        .unwrap_or_else(|| INVALID_DATE.to_string())
}

pub fn format_naive_date(date: NaiveDate) -> String {
    date.format("%-m/%-d/%Y").to_string()
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|dt| dt.date())
}

/// Number with thousands separators and at most three decimals.
pub fn format_amount(value: f64) -> String {
    let negative = value < 0.0;
    let rounded = (value.abs() * 1000.0).round() / 1000.0;
    let whole = rounded.trunc() as u64;
    let frac = ((rounded - rounded.trunc()) * 1000.0).round() as u64;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if frac > 0 {
        let frac = format!("{frac:03}");
        grouped.push('.');
        grouped.push_str(frac.trim_end_matches('0'));
    }
    if negative && (whole > 0 || frac > 0) {
        grouped.insert(0, '-');
    }
    grouped
}

/// Plain number: integral values without a fractional part.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

pub fn yes_no(flag: Option<bool>) -> &'static str {
    if flag.unwrap_or(false) { "Yes" } else { "No" }
}

pub fn or_na(value: Option<&str>) -> String {
    value.unwrap_or(NOT_AVAILABLE).to_string()
}

/// A field the renderer must dereference; absence aborts the document.
pub fn required<'a, T: ?Sized>(
    value: Option<&'a T>,
    section: &'static str,
    field: &'static str,
) -> Result<&'a T, Error> {
    value.ok_or(Error::MissingField { section, field })
}
