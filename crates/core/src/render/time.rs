//! Timestamp localization

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, Offset, Utc};

/// Zone and patterns used to print backend timestamps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Localizer {
    offset: FixedOffset,
}

const DATE_TIME_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";
const DATE_FORMAT: &str = "%-m/%-d/%Y";

impl Localizer {
    pub const fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Localizer for the host's current UTC offset
    pub fn system() -> Self {
        Self::new(Local::now().offset().fix())
    }

    pub fn utc() -> Self {
        Self::new(Utc.fix())
    }

    /// Date and time, or the raw value if it cannot be parsed
    pub fn date_time(&self, raw: &str) -> String {
        match self.parse(raw) {
            Some(parsed) => parsed.format(DATE_TIME_FORMAT).to_string(),
            None => raw.to_string(),
        }
    }

    /// Date only, or the raw value if it cannot be parsed
    pub fn date(&self, raw: &str) -> String {
        if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return date.format(DATE_FORMAT).to_string();
        }
        match self.parse(raw) {
            Some(parsed) => parsed.format(DATE_FORMAT).to_string(),
            None => raw.to_string(),
        }
    }

    fn parse(&self, raw: &str) -> Option<DateTime<FixedOffset>> {
        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return Some(parsed.with_timezone(&self.offset));
        }
        // Naive timestamps are taken as UTC, matching the backend's serializer
        let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
            .ok()
            .or_else(|| {
                NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .ok()
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
            })?;
        Some(naive.and_utc().with_timezone(&self.offset))
    }
}

impl Default for Localizer {
    fn default() -> Self {
        Self::system()
    }
}
