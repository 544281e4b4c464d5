//! Date helper functions

use chrono::{DateTime, Datelike, FixedOffset};

/// Lowercase pt-BR month abbreviations, January first.
const MONTHS_PT_BR: [&str; 12] = [
    "jan", "fev", "mar", "abr", "mai", "jun", "jul", "ago", "set", "out", "nov", "dez",
];

/// Parse a content API timestamp.
///
/// Accepts RFC 3339 as well as the `+0000` offset form the API actually sends.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z"))
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .ok()
}

/// Format a publication date as `dd MMM yyyy` (pt-BR), e.g. "15 mar 2021".
///
/// The date is shown in the offset it was published with. Missing or
/// unparseable input renders as an empty string.
pub fn format_date(raw: Option<&str>) -> String {
    match raw.and_then(parse_timestamp) {
        Some(date) => format!(
            "{:02} {} {}",
            date.day(),
            MONTHS_PT_BR[date.month0() as usize],
            date.year()
        ),
        None => String::new(),
    }
}
