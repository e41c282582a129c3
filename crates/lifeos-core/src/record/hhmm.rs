//! `HH:MM` and `YYYY-MM-DD` text forms used by records and the CLI.

use chrono::{NaiveDate, NaiveTime};

use crate::error::ValidationError;

const TIME_FORMAT: &str = "%H:%M";
const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn parse_time(s: &str) -> Result<NaiveTime, ValidationError> {
    NaiveTime::parse_from_str(s.trim(), TIME_FORMAT)
        .map_err(|_| ValidationError::InvalidTime(s.to_string()))
}

pub fn format_time(t: NaiveTime) -> String {
    t.format(TIME_FORMAT).to_string()
}

pub fn parse_date(s: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|_| ValidationError::InvalidDate(s.to_string()))
}

/// Serde adapter for `NaiveTime` as `HH:MM`.
pub mod time {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(t: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::format_time(*t))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_time(&raw).map_err(serde::de::Error::custom)
    }
}

/// Serde adapter for `Option<NaiveTime>` as `HH:MM` or null.
pub mod option_time {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(t: &Option<NaiveTime>, s: S) -> Result<S::Ok, S::Error> {
        match t {
            Some(t) => s.serialize_str(&super::format_time(*t)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveTime>, D::Error> {
        match Option::<String>::deserialize(d)? {
            Some(raw) if !raw.trim().is_empty() => super::parse_time(&raw)
                .map(Some)
                .map_err(serde::de::Error::custom),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_formats_time() {
        let t = parse_time("08:05").unwrap();
        assert_eq!(format_time(t), "08:05");
        assert!(parse_time("8h").is_err());
        assert!(parse_time("25:00").is_err());
    }

    #[test]
    fn parses_dates() {
        assert_eq!(
            parse_date("2025-12-14").unwrap(),
            NaiveDate::from_ymd_opt(2025, 12, 14).unwrap()
        );
        assert!(matches!(
            parse_date("14/12/2025"),
            Err(ValidationError::InvalidDate(_))
        ));
    }
}
