//! Decides how a grid value goes into a cell
//!
//! Strings starting with `=` are formulas. Strings shaped like an ISO 8601
//! date or date-time become timestamps when they parse. Everything else is
//! written as given.

use crate::types::{CellValue, ClassifiedValue, Timestamp};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike};
use regex::Regex;
use std::sync::OnceLock;

/// Shapes accepted: `2026-02-03`, `2026-02-03T10:30:00`,
/// `2026-02-03T10:30:00Z`, `2026-02-03T10:30:00+02:00`
fn iso_date_shape() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\d{4}-\d{2}-\d{2}(T\d{2}:\d{2}:\d{2}(Z|[+-]\d{2}:\d{2})?)?$")
            .expect("valid ISO date regex")
    })
}

pub fn classify(value: &CellValue) -> ClassifiedValue {
    match value {
        CellValue::String(s) if is_formula(s) => ClassifiedValue::Formula(s.clone()),
        CellValue::String(s) => match parse_iso_timestamp(s) {
            Some(ts) => ClassifiedValue::Date(ts),
            None => ClassifiedValue::Literal(value.clone()),
        },
        CellValue::Null | CellValue::Bool(_) | CellValue::Number(_) => {
            ClassifiedValue::Literal(value.clone())
        }
    }
}

pub fn is_formula(value: &str) -> bool {
    value.starts_with('=')
}

/// First matching form wins; `None` if the shape is wrong or no form parses
pub fn parse_iso_timestamp(value: &str) -> Option<Timestamp> {
    if !iso_date_shape().is_match(value) {
        return None;
    }

    let parse_naive = |format: &str| {
        NaiveDateTime::parse_from_str(value, format)
            .ok()
            .filter(|dt| !is_leap_second(dt))
    };

    if let Some(dt) = parse_naive("%Y-%m-%dT%H:%M:%SZ") {
        return Some(Timestamp::Utc(dt.and_utc()));
    }
    if let Some(dt) = DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%:z")
        .ok()
        .filter(|dt| !is_leap_second(dt))
    {
        return Some(Timestamp::Offset(dt));
    }
    if let Some(dt) = parse_naive("%Y-%m-%dT%H:%M:%S") {
        return Some(Timestamp::Naive(dt));
    }
    if let Ok(d) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(Timestamp::Date(d));
    }

    None
}

/// chrono reads second `60` as a leap second; it is not a valid clock time
fn is_leap_second<T: Timelike>(time: &T) -> bool {
    time.nanosecond() >= 1_000_000_000
}
