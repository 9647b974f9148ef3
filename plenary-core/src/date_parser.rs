use crate::error::ParseError;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use std::sync::LazyLock;

// <day>.<month>.<year>, e.g. 01.12.2019 or 1.12.2019
static DATE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})\.(\d{1,2})\.(\d{4})$").unwrap());

/// Parse a `D.M.YYYY` date string as found in both transcript schemas
pub fn parse_date(input: &str) -> Result<NaiveDate, ParseError> {
    let malformed = |reason: &str| ParseError::MalformedDate {
        input: input.to_string(),
        reason: reason.to_string(),
    };

    let caps = DATE_REGEX
        .captures(input.trim())
        .ok_or_else(|| malformed("expected <day>.<month>.<year>"))?;

    // The regex bounds every component, so these conversions cannot overflow
    let day: u32 = caps[1].parse().map_err(|_| malformed("invalid day"))?;
    let month: u32 = caps[2].parse().map_err(|_| malformed("invalid month"))?;
    let year: i32 = caps[3].parse().map_err(|_| malformed("invalid year"))?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| malformed("not a calendar date"))
}

/// Start of day for a session date; neither schema records a time of day
pub fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}
