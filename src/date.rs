//! Date handling for embedded file parameters and XMP metadata
//!
//! The embedded XML's `/ModDate` comes from a small date expression so the
//! CLI can pick the XML file's own timestamp, the current time, a fixed day,
//! or nothing at all.

use std::path::Path;
use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveTime, SecondsFormat};
use crate::error::{Error, Result};

/// Date expression types
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DateExpression {
    /// Modification time of the file being embedded
    #[default]
    FileModified,
    /// Current local time
    Now,
    /// Midnight UTC of an explicit date
    Explicit(NaiveDate),
    /// Leave the date out
    None,
}

/// Parse a date expression string into a DateExpression
///
/// Supported formats:
/// - `""` or `"none"` → None
/// - `"file"` or `"mtime"` → FileModified
/// - `"now"` or `"today"` → Now
/// - `"2024-11-20"` → Explicit date (ISO format)
/// - `"11/20/2024"` → Explicit date (US format)
pub fn parse_date_expression(expr: &str) -> Result<DateExpression> {
    let expr = expr.trim();

    if expr.is_empty() || expr.eq_ignore_ascii_case("none") {
        return Ok(DateExpression::None);
    }

    if expr.eq_ignore_ascii_case("file") || expr.eq_ignore_ascii_case("mtime") {
        return Ok(DateExpression::FileModified);
    }

    if expr.eq_ignore_ascii_case("now") || expr.eq_ignore_ascii_case("today") {
        return Ok(DateExpression::Now);
    }

    // ISO format: 2024-11-20
    if let Ok(date) = NaiveDate::parse_from_str(expr, "%Y-%m-%d") {
        return Ok(DateExpression::Explicit(date));
    }

    // US format: 11/20/2024
    if let Ok(date) = NaiveDate::parse_from_str(expr, "%m/%d/%Y") {
        return Ok(DateExpression::Explicit(date));
    }

    Err(Error::InvalidDateExpression(format!("Unable to parse date expression: {}", expr)))
}

/// Resolve a DateExpression to a timestamp
///
/// `file` is only consulted for [`DateExpression::FileModified`].
pub fn resolve_date(expr: &DateExpression, file: &Path) -> Result<Option<DateTime<FixedOffset>>> {
    match expr {
        DateExpression::None => Ok(None),
        DateExpression::Now => Ok(Some(Local::now().fixed_offset())),
        DateExpression::Explicit(date) => {
            Ok(Some(date.and_time(NaiveTime::default()).and_utc().fixed_offset()))
        }
        DateExpression::FileModified => {
            if !file.exists() {
                return Err(Error::FileNotFound(file.to_path_buf()));
            }
            let modified = std::fs::metadata(file)?.modified()?;
            Ok(Some(DateTime::<Local>::from(modified).fixed_offset()))
        }
    }
}

/// Format a timestamp as a PDF date string
/// Example: "D:20241120093000+01'00'"
pub fn format_pdf_date(date: &DateTime<FixedOffset>) -> String {
    let offset = date.offset().local_minus_utc();
    let sign = if offset < 0 { '-' } else { '+' };
    let minutes = offset.abs() / 60;
    format!(
        "D:{}{}{:02}'{:02}'",
        date.format("%Y%m%d%H%M%S"),
        sign,
        minutes / 60,
        minutes % 60
    )
}

/// Format a timestamp for XMP properties (ISO 8601 with offset)
pub fn format_xmp_date(date: &DateTime<FixedOffset>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, false)
}
