//! Datetime values with their TOML subkind.
//!
//! TOML has four datetime flavours, told apart only by which components are
//! written: an offset datetime (`1979-05-27T07:32:00Z`), a local datetime
//! (`1979-05-27T07:32:00`), a local date (`1979-05-27`) and a local time
//! (`07:32:00`). [`Datetime`] keeps the flavour so that encoding reproduces it,
//! and offset datetimes remember whether they were written with `Z`.
//!
//! Calendar arithmetic is left to [`chrono`]; every variant exposes its chrono
//! parts.
//!
//! ```rust
//! use serde_tomlkit::{Datetime, Kind};
//!
//! let dt: Datetime = "1979-05-27".parse().unwrap();
//! assert_eq!(dt.kind(), Kind::LocalDate);
//! assert_eq!(dt.to_string(), "1979-05-27");
//!
//! let dt: Datetime = "1979-05-27T07:32:00Z".parse().unwrap();
//! assert_eq!(dt.to_string(), "1979-05-27T07:32:00Z");
//! ```

use crate::kind::Kind;
use chrono::Offset as _;
use chrono::{
    DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike,
    Utc,
};
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Struct name used to carry a datetime through serde without losing its subkind.
pub(crate) const NAME: &str = "$__serde_tomlkit_private_Datetime";
/// The single field of the [`NAME`] struct, holding the datetime text.
pub(crate) const FIELD: &str = "$__serde_tomlkit_private_datetime";

/// The UTC offset of an offset datetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Offset {
    /// Written as `Z` (or `z`).
    Z,
    /// Written as `+HH:MM` or `-HH:MM`.
    Custom(FixedOffset),
}

impl Offset {
    /// Returns the offset as a chrono [`FixedOffset`]; `Z` is zero.
    pub fn fixed(self) -> FixedOffset {
        match self {
            Offset::Z => Utc.fix(),
            Offset::Custom(offset) => offset,
        }
    }
}

/// A TOML datetime in one of its four subkinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Datetime {
    OffsetDateTime {
        datetime: NaiveDateTime,
        offset: Offset,
    },
    LocalDateTime(NaiveDateTime),
    LocalDate(NaiveDate),
    LocalTime(NaiveTime),
}

impl Datetime {
    /// Returns the type-system kind matching this subkind.
    pub const fn kind(&self) -> Kind {
        match self {
            Datetime::OffsetDateTime { .. } => Kind::OffsetDatetime,
            Datetime::LocalDateTime(_) => Kind::LocalDatetime,
            Datetime::LocalDate(_) => Kind::LocalDate,
            Datetime::LocalTime(_) => Kind::LocalTime,
        }
    }

    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            Datetime::OffsetDateTime { datetime, .. } | Datetime::LocalDateTime(datetime) => {
                Some(datetime.date())
            }
            Datetime::LocalDate(date) => Some(*date),
            Datetime::LocalTime(_) => None,
        }
    }

    pub fn time(&self) -> Option<NaiveTime> {
        match self {
            Datetime::OffsetDateTime { datetime, .. } | Datetime::LocalDateTime(datetime) => {
                Some(datetime.time())
            }
            Datetime::LocalTime(time) => Some(*time),
            Datetime::LocalDate(_) => None,
        }
    }

    pub fn offset(&self) -> Option<Offset> {
        match self {
            Datetime::OffsetDateTime { offset, .. } => Some(*offset),
            _ => None,
        }
    }

    /// Converts an offset datetime into a chrono `DateTime<FixedOffset>`.
    ///
    /// Local subkinds have no instant on the time line and return `None`.
    pub fn to_fixed_offset(&self) -> Option<DateTime<FixedOffset>> {
        match self {
            Datetime::OffsetDateTime { datetime, offset } => {
                offset.fixed().from_local_datetime(datetime).single()
            }
            _ => None,
        }
    }
}

impl From<NaiveDate> for Datetime {
    fn from(date: NaiveDate) -> Self {
        Datetime::LocalDate(date)
    }
}

impl From<NaiveTime> for Datetime {
    fn from(time: NaiveTime) -> Self {
        Datetime::LocalTime(time)
    }
}

impl From<NaiveDateTime> for Datetime {
    fn from(datetime: NaiveDateTime) -> Self {
        Datetime::LocalDateTime(datetime)
    }
}

impl From<DateTime<FixedOffset>> for Datetime {
    fn from(datetime: DateTime<FixedOffset>) -> Self {
        Datetime::OffsetDateTime {
            datetime: datetime.naive_local(),
            offset: Offset::Custom(*datetime.offset()),
        }
    }
}

impl From<DateTime<Utc>> for Datetime {
    fn from(datetime: DateTime<Utc>) -> Self {
        Datetime::OffsetDateTime {
            datetime: datetime.naive_utc(),
            offset: Offset::Z,
        }
    }
}

/// Error returned when text is not a valid TOML datetime.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid datetime: {0}")]
pub struct DatetimeParseError(String);

fn invalid(msg: &str) -> DatetimeParseError {
    DatetimeParseError(msg.to_string())
}

fn number(bytes: &[u8]) -> Option<u32> {
    if bytes.is_empty() || !bytes.iter().all(u8::is_ascii_digit) {
        return None;
    }
    Some(
        bytes
            .iter()
            .fold(0u32, |acc, b| acc * 10 + u32::from(b - b'0')),
    )
}

fn parse_date(bytes: &[u8]) -> Result<NaiveDate, DatetimeParseError> {
    let year = number(&bytes[0..4]).ok_or_else(|| invalid("malformed year"))?;
    let month = number(&bytes[5..7]).ok_or_else(|| invalid("malformed month"))?;
    let day = number(&bytes[8..10]).ok_or_else(|| invalid("malformed day"))?;
    // year has at most four digits so the cast cannot wrap
    NaiveDate::from_ymd_opt(year as i32, month, day)
        .ok_or_else(|| invalid("date does not exist"))
}

fn parse_time(text: &str) -> Result<(NaiveTime, &str), DatetimeParseError> {
    let bytes = text.as_bytes();
    if bytes.len() < 8 || bytes[2] != b':' || bytes[5] != b':' {
        return Err(invalid("expected time as HH:MM:SS"));
    }
    let hour = number(&bytes[0..2]).ok_or_else(|| invalid("malformed hour"))?;
    let minute = number(&bytes[3..5]).ok_or_else(|| invalid("malformed minute"))?;
    let second = number(&bytes[6..8]).ok_or_else(|| invalid("malformed second"))?;

    let mut end = 8;
    let mut nanos = 0u32;
    if bytes.get(8) == Some(&b'.') {
        let start = 9;
        end = start;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
        if end == start {
            return Err(invalid("fractional seconds need at least one digit"));
        }
        let digits = &bytes[start..end.min(start + 9)];
        nanos = number(digits).unwrap_or(0) * 10u32.pow(9 - digits.len() as u32);
    }

    let time = NaiveTime::from_hms_nano_opt(hour, minute, second, nanos)
        .ok_or_else(|| invalid("time does not exist"))?;
    Ok((time, &text[end..]))
}

fn parse_offset(text: &str) -> Result<Offset, DatetimeParseError> {
    match text {
        "Z" | "z" => return Ok(Offset::Z),
        _ => {}
    }
    let bytes = text.as_bytes();
    if bytes.len() != 6 || bytes[3] != b':' {
        return Err(invalid("expected offset as Z or +HH:MM"));
    }
    let sign = match bytes[0] {
        b'+' => 1,
        b'-' => -1,
        _ => return Err(invalid("offset must start with + or -")),
    };
    let hours = number(&bytes[1..3]).ok_or_else(|| invalid("malformed offset hours"))?;
    let minutes = number(&bytes[4..6]).ok_or_else(|| invalid("malformed offset minutes"))?;
    if hours > 23 || minutes > 59 {
        return Err(invalid("offset out of range"));
    }
    let seconds = sign * (hours * 3600 + minutes * 60) as i32;
    FixedOffset::east_opt(seconds)
        .map(Offset::Custom)
        .ok_or_else(|| invalid("offset out of range"))
}

impl FromStr for Datetime {
    type Err = DatetimeParseError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let bytes = text.as_bytes();
        let has_date = bytes.len() >= 10 && bytes[4] == b'-' && bytes[7] == b'-';

        if !has_date {
            let (time, rest) = parse_time(text)?;
            if !rest.is_empty() {
                return Err(invalid("local time cannot carry an offset"));
            }
            return Ok(Datetime::LocalTime(time));
        }

        let date = parse_date(&bytes[..10])?;
        let rest = &text[10..];
        if rest.is_empty() {
            return Ok(Datetime::LocalDate(date));
        }
        let time_text = match rest.as_bytes()[0] {
            b'T' | b't' | b' ' => &rest[1..],
            _ => return Err(invalid("expected 'T' between date and time")),
        };
        let (time, rest) = parse_time(time_text)?;
        let datetime = date.and_time(time);
        if rest.is_empty() {
            return Ok(Datetime::LocalDateTime(datetime));
        }
        Ok(Datetime::OffsetDateTime {
            datetime,
            offset: parse_offset(rest)?,
        })
    }
}

fn write_date(f: &mut fmt::Formatter<'_>, date: &NaiveDate) -> fmt::Result {
    write!(f, "{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
}

fn write_time(f: &mut fmt::Formatter<'_>, time: &NaiveTime) -> fmt::Result {
    write!(
        f,
        "{:02}:{:02}:{:02}",
        time.hour(),
        time.minute(),
        time.second()
    )?;
    let nanos = time.nanosecond();
    if nanos != 0 {
        let digits = format!("{:09}", nanos);
        write!(f, ".{}", digits.trim_end_matches('0'))?;
    }
    Ok(())
}

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Offset::Z => f.write_str("Z"),
            Offset::Custom(offset) => {
                let seconds = offset.local_minus_utc();
                let sign = if seconds < 0 { '-' } else { '+' };
                let minutes = seconds.abs() / 60;
                write!(f, "{}{:02}:{:02}", sign, minutes / 60, minutes % 60)
            }
        }
    }
}

impl fmt::Display for Datetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Datetime::OffsetDateTime { datetime, offset } => {
                write_date(f, &datetime.date())?;
                f.write_str("T")?;
                write_time(f, &datetime.time())?;
                write!(f, "{}", offset)
            }
            Datetime::LocalDateTime(datetime) => {
                write_date(f, &datetime.date())?;
                f.write_str("T")?;
                write_time(f, &datetime.time())
            }
            Datetime::LocalDate(date) => write_date(f, date),
            Datetime::LocalTime(time) => write_time(f, time),
        }
    }
}

impl Serialize for Datetime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct(NAME, 1)?;
        state.serialize_field(FIELD, &self.to_string())?;
        state.end()
    }
}

struct DatetimeVisitor;

impl<'de> Visitor<'de> for DatetimeVisitor {
    type Value = Datetime;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a TOML datetime")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Datetime, E> {
        value.parse().map_err(E::custom)
    }

    fn visit_map<V: MapAccess<'de>>(self, mut map: V) -> Result<Datetime, V::Error> {
        match map.next_key::<String>()? {
            Some(key) if key == FIELD => {
                let text: String = map.next_value()?;
                text.parse().map_err(de::Error::custom)
            }
            _ => Err(de::Error::custom("expected a datetime")),
        }
    }
}

impl<'de> Deserialize<'de> for Datetime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_struct(NAME, &[FIELD], DatetimeVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subkinds_are_detected() {
        let cases = [
            ("1979-05-27T07:32:00Z", Kind::OffsetDatetime),
            ("1979-05-27T00:32:00-07:00", Kind::OffsetDatetime),
            ("1979-05-27T07:32:00", Kind::LocalDatetime),
            ("1979-05-27 07:32:00", Kind::LocalDatetime),
            ("1979-05-27", Kind::LocalDate),
            ("07:32:00", Kind::LocalTime),
        ];
        for (text, kind) in cases {
            let dt: Datetime = text.parse().unwrap();
            assert_eq!(dt.kind(), kind, "{text}");
        }
    }

    #[test]
    fn test_display_reproduces_subkind() {
        for text in [
            "1979-05-27T07:32:00Z",
            "1979-05-27T00:32:00.999999-07:00",
            "1979-05-27T07:32:00.5",
            "1979-05-27",
            "00:32:00.25",
        ] {
            let dt: Datetime = text.parse().unwrap();
            assert_eq!(dt.to_string(), text);
        }
    }

    #[test]
    fn test_lowercase_separators_normalise() {
        let dt: Datetime = "1979-05-27t07:32:00z".parse().unwrap();
        assert_eq!(dt.to_string(), "1979-05-27T07:32:00Z");
        assert_eq!(dt.offset(), Some(Offset::Z));
    }

    #[test]
    fn test_rejects_invalid_datetimes() {
        for text in [
            "1979-13-27",
            "1979-02-30",
            "24:00:00",
            "07:32",
            "1979-05-27T07:32",
            "07:32:00Z",
            "1979-05-27T07:32:00+25:00",
            "1979-05-27T07:32:00.",
            "1979-05-27X07:32:00",
        ] {
            assert!(text.parse::<Datetime>().is_err(), "{text}");
        }
    }

    #[test]
    fn test_offset_conversion() {
        let dt: Datetime = "1979-05-27T00:32:00-07:00".parse().unwrap();
        let fixed = dt.to_fixed_offset().unwrap();
        assert_eq!(fixed.to_rfc3339(), "1979-05-27T00:32:00-07:00");
        assert!(Datetime::LocalDate(fixed.date_naive())
            .to_fixed_offset()
            .is_none());
    }
}
