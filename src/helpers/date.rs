//! Date helper functions

use chrono::{DateTime, NaiveDateTime, Utc};

/// Parse a CMS timestamp.
///
/// Directus emits RFC 3339 (`2024-01-15T10:30:00.000Z`) but drops the
/// offset on some system columns (`2024-01-15T10:30:00`); both are
/// accepted and treated as UTC.
pub fn parse_cms_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Some(date.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc())
}

/// Format a CMS timestamp for display (like "January 15, 2024").
///
/// Returns `None` when the value is not a recognizable date; callers leave
/// the display date unset rather than showing garbage.
pub fn display_date(value: &str) -> Option<String> {
    parse_cms_date(value).map(|date| full_date(&date))
}

/// Format a date in full format (like "January 15, 2024")
pub fn full_date(date: &DateTime<Utc>) -> String {
    date.format("%B %-d, %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rfc3339() {
        let date = parse_cms_date("2024-01-15T10:30:00.000Z").unwrap();
        assert_eq!(full_date(&date), "January 15, 2024");
    }

    #[test]
    fn test_parse_offsetless() {
        let date = parse_cms_date("2023-04-01T08:00:00").unwrap();
        assert_eq!(full_date(&date), "April 1, 2023");
    }

    #[test]
    fn test_display_date_rejects_garbage() {
        assert_eq!(display_date("not a date"), None);
        assert_eq!(display_date(""), None);
    }

    #[test]
    fn test_display_date() {
        assert_eq!(
            display_date("2023-01-01T00:00:00Z").as_deref(),
            Some("January 1, 2023")
        );
    }
}
