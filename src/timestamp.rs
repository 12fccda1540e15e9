// ISO-8601 timestamp parsing for leg departure/arrival fields.
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};

use crate::error::FareError;

// Date and clock layouts, tried in order. Each may be followed by a fraction
// (`%.f`) and, for the offset-aware attempt, an offset (`%#z`, also takes `Z`).
const CLOCK_FORMATS: [&str; 8] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H%M%S",
    "%Y-%m-%dT%H%M",
    "%Y%m%dT%H:%M:%S",
    "%Y%m%dT%H:%M",
    "%Y%m%dT%H%M%S",
    "%Y%m%dT%H%M",
];

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y%m%d"];

/// A parsed leg timestamp. Feeds mostly carry local wall-clock times with no
/// offset; those are kept naive rather than assumed to be UTC.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Timestamp {
    Local(NaiveDateTime),
    Offset(DateTime<FixedOffset>),
}

impl Timestamp {
    /// Parse `raw` as the named leg field. Accepts extended or basic dates,
    /// `T` or space before an `HH:MM[:SS[.fff]]` / `HHMM[SS]` clock, and
    /// `Z` / `±HH[[:]MM]` offsets. `24:00` is midnight of the next day.
    pub fn parse(field: &str, raw: &str) -> Result<Self, FareError> {
        let invalid = |reason: &str| FareError::field_format(field, raw, reason);

        let normalized = raw.replacen(' ', "T", 1).replace(',', ".");
        let (normalized, end_of_day) = roll_end_of_day(&normalized);

        let parsed = parse_iso(&normalized).ok_or_else(|| invalid("not an ISO-8601 timestamp"))?;
        if !end_of_day {
            return Ok(parsed);
        }
        parsed
            .next_midnight()
            .ok_or_else(|| invalid("hour 24 is only valid as 24:00:00"))
    }

    /// Whole seconds from `self` to `later`, truncated toward zero. Negative
    /// when `later` is actually earlier.
    pub fn seconds_until(&self, later: &Timestamp) -> Result<i64, FareError> {
        let delta = match (self, later) {
            (Timestamp::Local(start), Timestamp::Local(end)) => *end - *start,
            (Timestamp::Offset(start), Timestamp::Offset(end)) => *end - *start,
            _ => {
                return Err(FareError::field_format(
                    "ArrivalTimeStamp",
                    later.to_string(),
                    "cannot compare a timestamp with an offset to one without",
                ))
            }
        };
        Ok(delta.num_seconds())
    }

    // Only called on a "24:xx" clock that was rewritten to "00:xx".
    fn next_midnight(self) -> Option<Self> {
        match self {
            Timestamp::Local(dt) if dt.time() == NaiveTime::MIN => dt
                .checked_add_signed(TimeDelta::days(1))
                .map(Timestamp::Local),
            Timestamp::Offset(dt) if dt.time() == NaiveTime::MIN => dt
                .checked_add_signed(TimeDelta::days(1))
                .map(Timestamp::Offset),
            _ => None,
        }
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Timestamp::Local(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S%.f")),
            Timestamp::Offset(dt) => write!(f, "{}", dt.to_rfc3339()),
        }
    }
}

fn roll_end_of_day(raw: &str) -> (String, bool) {
    match raw.split_once('T') {
        Some((date, clock)) if clock.starts_with("24") => (format!("{date}T00{}", &clock[2..]), true),
        _ => (raw.to_string(), false),
    }
}

// chrono accepts unpadded fields ("2018-1-2"), so every match must also
// render back to the same date and clock digits it was parsed from.
fn parse_iso(raw: &str) -> Option<Timestamp> {
    for clock in CLOCK_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(raw, &format!("{clock}%.f%#z")) {
            if raw.starts_with(&dt.format(clock).to_string()) {
                return Some(Timestamp::Offset(dt));
            }
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, &format!("{clock}%.f")) {
            if raw.starts_with(&dt.format(clock).to_string()) {
                return Some(Timestamp::Local(dt));
            }
        }
    }

    for date_format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, date_format) {
            if date.format(date_format).to_string() == raw {
                return Some(Timestamp::Local(date.and_time(NaiveTime::MIN)));
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("2018-10-22T0005", "2018-10-22T16:50", 60_300; "basic time no offset")]
    #[test_case("2018-10-22T00:05:00", "2018-10-22T00:04:59", -1; "inverted timestamps")]
    #[test_case("2018-10-22T10:00:00.900", "2018-10-22T10:00:02.100", 1; "fraction truncated")]
    #[test_case("2018-10-22T10:00:02.100", "2018-10-22T10:00:00.900", -1; "negative truncated toward zero")]
    #[test_case("2018-10-22T10:00:00,5", "2018-10-22T10:00:02", 1; "comma fraction")]
    #[test_case("2018-10-22T10:00:00+04:00", "2018-10-22T14:00:00+07:00", 3_600; "offsets compared as instants")]
    #[test_case("2018-10-22T10:00Z", "2018-10-22T10:00:00+0000", 0; "zulu and basic offset")]
    #[test_case("2018-10-22T10:00+03", "2018-10-22T10:00Z", 10_800; "hour only offset")]
    #[test_case("20181022T2300", "20181023T0100", 7_200; "basic date across midnight")]
    #[test_case("2018-10-22 10:00", "2018-10-22 11:30", 5_400; "space separator")]
    #[test_case("2018-10-22", "2018-10-23", 86_400; "date only means midnight")]
    #[test_case("2018-10-22T2200", "2018-10-22T24:00", 7_200; "hour 24 is next midnight")]
    fn test_seconds_between(departure: &str, arrival: &str, expected: i64) {
        let departure = Timestamp::parse("DepartureTimeStamp", departure).unwrap();
        let arrival = Timestamp::parse("ArrivalTimeStamp", arrival).unwrap();
        assert_eq!(departure.seconds_until(&arrival).unwrap(), expected);
    }

    #[test_case(""; "empty")]
    #[test_case("not a date"; "garbage")]
    #[test_case("2018-13-01T10:00"; "bad month")]
    #[test_case("2018-10-22T25:00"; "bad hour")]
    #[test_case("2018-10-22T24:30"; "hour 24 past midnight")]
    #[test_case("2018-10-22T100"; "odd digit count")]
    #[test_case("2018-1-2T10:00"; "unpadded date")]
    #[test_case("2018-10-22T1:05"; "unpadded hour")]
    #[test_case("2018-10-22T10:00+5"; "short offset")]
    fn test_invalid_timestamps(raw: &str) {
        let err = Timestamp::parse("DepartureTimeStamp", raw).unwrap_err();
        assert!(matches!(err, FareError::FieldFormat { ref field, .. } if field == "DepartureTimeStamp"));
    }

    #[test]
    fn test_mixed_naive_and_offset_is_an_error() {
        let departure = Timestamp::parse("DepartureTimeStamp", "2018-10-22T10:00").unwrap();
        let arrival = Timestamp::parse("ArrivalTimeStamp", "2018-10-22T12:00Z").unwrap();
        assert!(matches!(
            departure.seconds_until(&arrival),
            Err(FareError::FieldFormat { .. })
        ));
    }

    #[test]
    fn test_recomputing_gives_identical_seconds() {
        let departure = Timestamp::parse("DepartureTimeStamp", "2018-10-27T1705").unwrap();
        let arrival = Timestamp::parse("ArrivalTimeStamp", "2018-10-28T0650").unwrap();
        let first = departure.seconds_until(&arrival).unwrap();
        let again = Timestamp::parse("DepartureTimeStamp", "2018-10-27T1705")
            .unwrap()
            .seconds_until(&Timestamp::parse("ArrivalTimeStamp", "2018-10-28T0650").unwrap())
            .unwrap();
        assert_eq!(first, 49_500);
        assert_eq!(first, again);
    }
}
