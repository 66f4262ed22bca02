//! Date helper functions

use chrono::{DateTime, FixedOffset, Locale};
use chrono_tz::Tz;

use crate::error::{Error, Result};

/// Locale used for month names across the whole site
pub const LOCALE: Locale = Locale::pt_BR;

/// Formats publication dates with one pattern, timezone and locale
///
/// Built once per session so every page renders dates the same way.
#[derive(Debug, Clone)]
pub struct DateFormatter {
    timezone: Tz,
    chrono_format: String,
}

impl DateFormatter {
    /// Create a formatter from a Moment.js-style pattern (e.g. `DD MMM YYYY`)
    pub fn new(timezone: Tz, pattern: &str) -> Self {
        Self {
            timezone,
            chrono_format: moment_to_chrono_format(pattern),
        }
    }

    /// Format a raw publication date of the document `id`
    ///
    /// A missing or unparsable date is an [`Error::InvalidDate`].
    pub fn format(&self, id: &str, raw: Option<&str>) -> Result<String> {
        let raw = raw.ok_or_else(|| Error::InvalidDate {
            id: id.to_string(),
            reason: "missing first_publication_date".to_string(),
        })?;
        let date = parse_publication_date(raw).ok_or_else(|| Error::InvalidDate {
            id: id.to_string(),
            reason: format!("cannot parse '{}'", raw),
        })?;

        Ok(date
            .with_timezone(&self.timezone)
            .format_localized(&self.chrono_format, LOCALE)
            .to_string())
    }
}

impl Default for DateFormatter {
    fn default() -> Self {
        Self::new(chrono_tz::America::Sao_Paulo, "DD MMM YYYY")
    }
}

/// Parse a service timestamp (RFC 3339 or `2021-03-25T19:25:28+0000`)
pub fn parse_publication_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z"))
        .ok()
}

/// Convert Moment.js format to chrono format
fn moment_to_chrono_format(format: &str) -> String {
    // Longest tokens first within each group
    let replacements = [
        ("YYYY", "%Y"),
        ("YY", "%y"),
        ("MMMM", "%B"),
        ("MMM", "%b"),
        ("MM", "%m"),
        ("DDDD", "%j"),
        ("DD", "%d"),
        ("HH", "%H"),
        ("hh", "%I"),
        ("mm", "%M"),
        ("ss", "%S"),
        ("dddd", "%A"),
        ("ddd", "%a"),
        ("ZZ", "%z"),
    ];

    let mut result = format.to_string();

    for (from, to) in replacements {
        result = result.replace(from, to);
    }

    result
}
