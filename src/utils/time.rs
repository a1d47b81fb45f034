//! Date and time handling shared by every dashboard module.
//!
//! Wire values arrive as loose strings (`"2025-01-10"`, `"2025-01-10T00:00:00.000Z"`,
//! `"09:00"`, `"9:00 AM"`). They are parsed here once into `chrono` types, and every
//! conversion between a local wall-clock value and an instant goes through an
//! explicit [`Tz`].

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::{Error, Result};

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|e| Error::Config(format!("Unknown timezone {}: {}", name, e)))
}

/// Parses a calendar day. Timestamps are cut at the `T` separator so the day the
/// record was filed under is kept, whatever offset the backend serialized.
pub fn parse_day(raw: &str) -> Result<NaiveDate> {
    let trimmed = raw.trim();
    let day_part = trimmed.split('T').next().unwrap_or(trimmed);
    NaiveDate::parse_from_str(day_part, "%Y-%m-%d")
        .map_err(|_| Error::BadRequest(format!("Invalid date: {}", raw)))
}

pub fn parse_time(raw: &str) -> Result<NaiveTime> {
    let trimmed = raw.trim();
    ["%H:%M", "%H:%M:%S", "%I:%M %p", "%I:%M%p"]
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(trimmed, fmt).ok())
        .ok_or_else(|| Error::BadRequest(format!("Invalid time: {}", raw)))
}

pub fn format_day(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn format_hm(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// `13:00` -> `1:00 PM`
pub fn format_12h(time: NaiveTime) -> String {
    time.format("%-I:%M %p").to_string()
}

/// `Jan 13, 2025`
pub fn format_long_day(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

pub fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}

/// Resolves a local wall-clock value to an instant. Ambiguous values (clocks going
/// back) take the earlier instant; values inside a DST gap move forward an hour.
pub fn local_instant(date: NaiveDate, time: NaiveTime, tz: Tz) -> DateTime<Utc> {
    let naive = date.and_time(time);
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        LocalResult::None => tz
            .from_local_datetime(&(naive + Duration::hours(1)))
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| Utc.from_utc_datetime(&naive)),
    }
}

pub fn local_day(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

pub mod day {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &NaiveDate, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_day(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_day(&raw).map_err(serde::de::Error::custom)
    }
}

pub mod opt_day {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<NaiveDate>,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        match value {
            Some(date) => serializer.serialize_str(&super::format_day(*date)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Option<NaiveDate>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) if !raw.trim().is_empty() => super::parse_day(&raw)
                .map(Some)
                .map_err(serde::de::Error::custom),
            _ => Ok(None),
        }
    }
}

pub mod hm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &NaiveTime, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_hm(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_time(&raw).map_err(serde::de::Error::custom)
    }
}

pub mod opt_hm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<NaiveTime>,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        match value {
            Some(time) => serializer.serialize_str(&super::format_hm(*time)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Option<NaiveTime>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
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
    fn parse_day_accepts_plain_and_timestamp_forms() {
        let expected = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        assert_eq!(parse_day("2025-01-10").unwrap(), expected);
        assert_eq!(parse_day("2025-01-10T00:00:00.000Z").unwrap(), expected);
        assert_eq!(parse_day(" 2025-01-10T18:30:00+05:30 ").unwrap(), expected);
        assert!(parse_day("10/01/2025").is_err());
    }

    #[test]
    fn parse_time_accepts_24h_and_meridiem() {
        assert_eq!(parse_time("09:00").unwrap(), hm(9, 0));
        assert_eq!(parse_time("13:05:00").unwrap(), hm(13, 5));
        assert_eq!(parse_time("1:30 PM").unwrap(), hm(13, 30));
        assert!(parse_time("25:00").is_err());
    }

    #[test]
    fn twelve_hour_formatting() {
        assert_eq!(format_12h(hm(9, 0)), "9:00 AM");
        assert_eq!(format_12h(hm(13, 0)), "1:00 PM");
        assert_eq!(format_12h(hm(0, 0)), "12:00 AM");
    }

    #[test]
    fn local_instant_uses_timezone_offset() {
        let tz = parse_timezone("Asia/Kolkata").unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        let instant = local_instant(date, hm(9, 0), tz);
        assert_eq!(instant.to_rfc3339(), "2025-01-10T03:30:00+00:00");
    }

    #[test]
    fn local_instant_skips_dst_gap() {
        let tz = parse_timezone("America/New_York").unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        let instant = local_instant(date, hm(2, 30), tz);
        assert_eq!(instant.to_rfc3339(), "2025-03-09T07:30:00+00:00");
    }

    #[test]
    fn unknown_timezone_is_config_error() {
        assert!(matches!(parse_timezone("Mars/Olympus"), Err(Error::Config(_))));
    }
}
