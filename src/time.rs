//! Clock and date formatting collaborators.
//!
//! The remote service expects timestamps in ATOM form, e.g.
//! `2022-06-21T10:20:44+00:00`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Renders host date text in the remote timestamp form.
///
/// Returns `None` when the input is not understood.
pub trait DateFormatter: Send + Sync {
    fn format_xsd(&self, date: &str) -> Option<String>;
}

/// Minimal formatter used when none is injected.
///
/// Accepts only `YYYY-MM-DD` and renders midnight UTC. Anything else, a
/// time component included, yields `None`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackDateFormatter;

impl DateFormatter for FallbackDateFormatter {
    fn format_xsd(&self, date: &str) -> Option<String> {
        let day = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
        Some(atom(Utc.from_utc_datetime(&day.and_hms_opt(0, 0, 0)?)))
    }
}

/// Formatter accepting RFC 3339, `YYYY-MM-DD HH:MM:SS` and `YYYY-MM-DD`.
///
/// Offsets are converted to UTC; inputs without an offset are taken as UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct XsdDateFormatter;

impl DateFormatter for XsdDateFormatter {
    fn format_xsd(&self, date: &str) -> Option<String> {
        let date = date.trim();
        if let Ok(parsed) = DateTime::parse_from_rfc3339(date) {
            return Some(atom(parsed.with_timezone(&Utc)));
        }
        for pattern in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(date, pattern) {
                return Some(atom(Utc.from_utc_datetime(&naive)));
            }
        }
        FallbackDateFormatter.format_xsd(date)
    }
}

/// Render an instant the way the remote service expects.
pub fn atom(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atom_format() {
        let instant = Utc.with_ymd_and_hms(2022, 6, 21, 10, 20, 44).unwrap();
        assert_eq!(atom(instant), "2022-06-21T10:20:44+00:00");
    }

    #[test]
    fn test_fallback_accepts_date_only() {
        assert_eq!(
            FallbackDateFormatter.format_xsd("2022-06-21"),
            Some("2022-06-21T00:00:00+00:00".to_string())
        );
        assert_eq!(FallbackDateFormatter.format_xsd("2022-06-21 10:20:44"), None);
        assert_eq!(FallbackDateFormatter.format_xsd("21-06-2022"), None);
        assert_eq!(FallbackDateFormatter.format_xsd(""), None);
    }

    #[test]
    fn test_xsd_formatter_inputs() {
        let formatter = XsdDateFormatter;
        assert_eq!(
            formatter.format_xsd("2022-06-21 10:20:44"),
            Some("2022-06-21T10:20:44+00:00".to_string())
        );
        assert_eq!(
            formatter.format_xsd("2022-06-21T10:20:44.000000Z"),
            Some("2022-06-21T10:20:44+00:00".to_string())
        );
        assert_eq!(
            formatter.format_xsd("2022-06-21T12:20:44+02:00"),
            Some("2022-06-21T10:20:44+00:00".to_string())
        );
        assert_eq!(
            formatter.format_xsd("2022-06-21"),
            Some("2022-06-21T00:00:00+00:00".to_string())
        );
        assert_eq!(formatter.format_xsd("yesterday"), None);
    }

    #[test]
    fn test_fixed_clock() {
        let instant = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(FixedClock(instant).now(), instant);
    }
}
