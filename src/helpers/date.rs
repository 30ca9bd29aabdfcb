//! Month extraction from the date shapes found in attendance sheets.
//!
//! Sheets carry dates in three places: ISO strings aligned with the header row
//! (`headersISO`), the header labels themselves (`2026/3/1`, `3/1`) and cell
//! values in date columns. All entry points answer the same question: which
//! month (1-12) does this value point at, if any.

use chrono::Datelike;
use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

/// Row fields that carry a date value, in lookup order.
pub const DATE_FIELDS: [&str; 5] = ["日期", "出勤日期", "打卡日期", "Date", "date"];

/// `YYYY/M/D` or `YYYY-M-D` anywhere in the text.
static FULL_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9]{4})[/\-]([0-9]{1,2})[/\-]([0-9]{1,2})").expect("Hardcode regex pattern")
});

/// `M/D` or `M-D` anywhere in the text.
static MONTH_DAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9]{1,2})[/\-]([0-9]{1,2})").expect("Hardcode regex pattern")
});

/// A header that is nothing but `M/D` or `M-D`.
static HEADER_MONTH_DAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{1,2})[/\-]([0-9]{1,2})$").expect("Hardcode regex pattern")
});

/// Canonical `YYYY-MM-DD`.
static ISO_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{4})-([0-9]{2})-([0-9]{2})$").expect("Hardcode regex pattern")
});

/// Parses a captured month group and validates it lies in 1..=12.
fn valid_month(digits: &str) -> Option<u32> {
    digits.parse::<u32>().ok().filter(|month| (1..=12).contains(month))
}

/// Extracts the month from a free-text date value such as a cell in a date column.
///
/// A full `YYYY/M/D` date is tried first; the bare `M/D` form is only consulted
/// when no full date is present at all.
pub fn month_from_text(value: &str) -> Option<u32> {
    if let Some(captures) = FULL_DATE.captures(value) {
        return valid_month(&captures[2]);
    }
    MONTH_DAY.captures(value).and_then(|captures| valid_month(&captures[1]))
}

/// Extracts the month from a column label.
/// The bare `M/D` form must make up the whole (trimmed) label.
pub fn month_from_header(header: &str) -> Option<u32> {
    let header = header.trim();
    FULL_DATE
        .captures(header)
        .and_then(|captures| valid_month(&captures[2]))
        .or_else(|| HEADER_MONTH_DAY.captures(header).and_then(|captures| valid_month(&captures[1])))
}

/// Month and day named by a column label, in the same forms `month_from_header` accepts.
pub fn month_day_from_header(header: &str) -> Option<(u32, u32)> {
    let header = header.trim();
    let (month, day) = match FULL_DATE.captures(header) {
        Some(captures) => (captures[2].to_owned(), captures[3].to_owned()),
        None => {
            let captures = HEADER_MONTH_DAY.captures(header)?;
            (captures[1].to_owned(), captures[2].to_owned())
        }
    };
    Some((valid_month(&month)?, day.parse().ok()?))
}

/// Extracts the month from an exact `YYYY-MM-DD` string.
pub fn month_from_iso(value: &str) -> Option<u32> {
    ISO_DATE
        .captures(value.trim())
        .and_then(|captures| valid_month(&captures[2]))
}

/// Returns true if the value is an exact `YYYY-MM-DD` string.
pub fn is_iso_date(value: &str) -> bool {
    ISO_DATE.is_match(value)
}

/// Year of the first well-formed ISO date in a header-aligned list.
pub fn year_from_iso_headers(headers_iso: &[String]) -> Option<i32> {
    headers_iso
        .iter()
        .find(|value| is_iso_date(value))
        .and_then(|value| value[..4].parse().ok())
        .filter(|year| *year > 0)
}

/// Formats the canonical ISO date used by `headersISO`.
pub fn iso_date(year: i32, month: u32, day: u32) -> String {
    format!("{year:04}-{month:02}-{day:02}")
}

/// Number of days in the given month, or `None` for an invalid year/month.
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some(next.signed_duration_since(first).num_days() as u32)
}

/// Current local year, used when a sheet carries no ISO headers.
pub fn current_year() -> i32 {
    chrono::Local::now().year()
}
