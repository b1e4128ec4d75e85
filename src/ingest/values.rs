//! Cell parsing at the ingestion boundary.
//!
//! Every text cell becomes a typed value here, once. Downstream stages work
//! with `Decimal`, `SourceDate` and `i64` only.

use chrono::{Days, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::str::FromStr;

use crate::models::SourceDate;

/// Largest Excel serial day number accepted (9999-12-31).
const MAX_EXCEL_SERIAL: i64 = 2_958_465;

/// Parses a monetary or numeric cell.
///
/// Accepts plain (`25.5`), comma-decimal (`25,50`) and Brazilian currency
/// (`R$ 1.234,56`) notations. Blank or unparseable text yields `None`.
///
/// # Example
///
/// ```
/// use voucher_engine::ingest::parse_decimal;
/// use rust_decimal::Decimal;
///
/// assert_eq!(parse_decimal("R$ 1.234,56"), Some(Decimal::new(123456, 2)));
/// assert_eq!(parse_decimal("25,50"), Some(Decimal::new(2550, 2)));
/// assert_eq!(parse_decimal(""), None);
/// ```
pub fn parse_decimal(text: &str) -> Option<Decimal> {
    let cleaned: String = text
        .trim()
        .trim_start_matches("R$")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let normalized = match (cleaned.rfind(','), cleaned.rfind('.')) {
        (Some(comma), Some(dot)) if comma > dot => cleaned.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        (Some(_), None) => cleaned.replace(',', "."),
        _ => cleaned,
    };

    Decimal::from_str(&normalized)
        .or_else(|_| Decimal::from_scientific(&normalized))
        .ok()
}

/// Parses a date cell.
///
/// Recognizes `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS`, `DD/MM/YYYY` and Excel
/// serial day numbers. Other non-blank text is kept as
/// [`SourceDate::Unparsed`]; blank text yields `None`.
pub fn parse_date(text: &str) -> Option<SourceDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(SourceDate::Parsed(date));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(text, format) {
            return Some(SourceDate::Parsed(datetime.date()));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%d/%m/%Y") {
        return Some(SourceDate::Parsed(date));
    }
    if let Some(date) = excel_serial(text) {
        return Some(SourceDate::Parsed(date));
    }

    Some(SourceDate::Unparsed(text.to_string()))
}

fn excel_serial(text: &str) -> Option<NaiveDate> {
    let serial = Decimal::from_str(text).ok()?.trunc().to_i64()?;
    if !(1..=MAX_EXCEL_SERIAL).contains(&serial) {
        return None;
    }
    NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_days(Days::new(serial as u64))
}

/// Parses a day-count cell.
///
/// Integers, decimals (truncated) and numeric strings are accepted. Blank
/// text is absent (`None`); unparseable text counts as zero.
///
/// # Example
///
/// ```
/// use voucher_engine::ingest::parse_days;
///
/// assert_eq!(parse_days("22"), Some(22));
/// assert_eq!(parse_days("21.0"), Some(21));
/// assert_eq!(parse_days(""), None);
/// assert_eq!(parse_days("n/a"), Some(0));
/// ```
pub fn parse_days(text: &str) -> Option<i64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    Some(parse_count(text).unwrap_or(0))
}

/// Parses a strictly numeric count, truncating decimals.
pub fn parse_count(text: &str) -> Option<i64> {
    let text = text.trim();
    text.parse::<i64>()
        .ok()
        .or_else(|| parse_decimal(text).and_then(|d| d.trunc().to_i64()))
}
