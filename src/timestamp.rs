//! Event timestamps as they appear in teket exports.

use crate::seat::fold_compatibility;
use chrono::{DateTime, NaiveDate, NaiveDateTime};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y年%m月%d日 %H:%M:%S",
    "%Y年%m月%d日 %H:%M",
    "%Y年%m月%d日%H時%M分",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y年%m月%d日"];

/// Time of one sales-history event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventTime {
    At(NaiveDateTime),
    /// The raw text could not be read as a date/time (it may be empty).
    Unparsed(String),
}

impl EventTime {
    /// Instant used for chronological ordering. Unparsed values sort as the
    /// Unix epoch.
    pub fn sort_key(&self) -> NaiveDateTime {
        match self {
            EventTime::At(dt) => *dt,
            // NaiveDateTime's default is 1970-01-01 00:00:00
            EventTime::Unparsed(_) => NaiveDateTime::default(),
        }
    }

    /// Minute precision for parsed values, the raw text otherwise.
    pub fn display(&self) -> String {
        match self {
            EventTime::At(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
            EventTime::Unparsed(raw) => raw.clone(),
        }
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self, EventTime::At(_))
    }
}

/// Read a timestamp cell after NFKC normalization. Never fails: unreadable text is kept as
/// [`EventTime::Unparsed`].
pub fn parse_event_time(raw: &str) -> EventTime {
    let s = fold_compatibility(raw);
    let s = s.trim();
    if s.is_empty() {
        return EventTime::Unparsed(String::new());
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return EventTime::At(dt.naive_local());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return EventTime::At(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            if let Some(dt) = date.and_hms_opt(0, 0, 0) {
                return EventTime::At(dt);
            }
        }
    }

    EventTime::Unparsed(raw.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_formats() {
        for raw in [
            "2024-10-13 18:05:09",
            "2024/10/13 18:05:09",
            "2024-10-13 18:05",
            "2024/10/13 18:05",
            "2024-10-13T18:05:09",
            "2024年10月13日 18:05",
            "２０２４/１０/１３ １８:０５",
        ] {
            assert_eq!(parse_event_time(raw).display(), "2024-10-13 18:05", "{raw}");
        }
    }

    #[test]
    fn test_compatibility_forms_fold() {
        // Kangxi radical look-alikes of 月 and 日
        assert_eq!(
            parse_event_time("2024年10\u{2F49}13\u{2F47}").display(),
            "2024-10-13 00:00"
        );
        assert_eq!(
            parse_event_time("２０２４－１０－１３　１８：０５").display(),
            "2024-10-13 18:05"
        );
    }

    #[test]
    fn test_rfc3339_keeps_local_wall_time() {
        let t = parse_event_time("2024-10-13T18:05:00+09:00");
        assert_eq!(t.display(), "2024-10-13 18:05");
    }

    #[test]
    fn test_date_only_is_midnight() {
        assert_eq!(parse_event_time("2024/1/5").display(), "2024-01-05 00:00");
    }

    #[test]
    fn test_unparsed_sorts_first_and_keeps_raw() {
        let bad = parse_event_time(" 未定 ");
        assert!(!bad.is_parsed());
        assert_eq!(bad.display(), "未定");
        assert!(bad.sort_key() < parse_event_time("2000-01-01").sort_key());
        assert_eq!(parse_event_time("").display(), "");
    }
}
