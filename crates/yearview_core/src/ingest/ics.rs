//! Minimal iCalendar `VEVENT` extraction.
//!
//! Only the properties the year view needs are read: `SUMMARY`,
//! `DESCRIPTION`, `LOCATION`, `DTSTART` and `DTEND`. A trailing `Z` on a
//! date-time is accepted and the wall-clock value is kept as written.

use crate::model::event::{RawDate, RawEvent};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;

/// Title used when `SUMMARY` is missing or blank.
pub const UNTITLED_EVENT: &str = "(untitled)";

static VEVENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)BEGIN:VEVENT.*?END:VEVENT").expect("valid vevent regex"));
static SUMMARY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^SUMMARY:(.*)$").expect("valid summary regex"));
static DESCRIPTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^DESCRIPTION:(.*)$").expect("valid description regex"));
static LOCATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^LOCATION:(.*)$").expect("valid location regex"));
static DTSTART_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"DTSTART(?:;TZID=[^:]+|;VALUE=DATE)?:([^\r\n]+)").expect("valid dtstart regex")
});
static DTEND_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"DTEND(?:;TZID=[^:]+|;VALUE=DATE)?:([^\r\n]+)").expect("valid dtend regex")
});
static ICAL_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4})(\d{2})(\d{2})(?:T(\d{2})(\d{2})(\d{2})(Z)?)?$")
        .expect("valid ical date regex")
});

/// Parses `YYYYMMDD[THHMMSS[Z]]`.
pub fn parse_ical_date(value: &str) -> Option<NaiveDateTime> {
    let caps = ICAL_DATE_RE.captures(value.trim())?;
    let date = NaiveDate::from_ymd_opt(
        caps[1].parse().ok()?,
        caps[2].parse().ok()?,
        caps[3].parse().ok()?,
    )?;
    let Some(hour) = caps.get(4) else {
        return Some(date.and_time(NaiveTime::MIN));
    };
    date.and_hms_opt(hour.as_str().parse().ok()?, caps[5].parse().ok()?, caps[6].parse().ok()?)
}

fn property(re: &Regex, block: &str) -> Option<String> {
    re.captures(block)
        .and_then(|caps| caps.get(1))
        .map(|value| value.as_str().trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Extracts the first `VEVENT` of `text` as a raw record.
///
/// Text without a `BEGIN:VEVENT` block is read as a bare property list.
/// Returns `None` when `DTSTART` or `DTEND` is missing or unparseable.
pub fn parse_vevent(id: impl Into<String>, text: &str) -> Option<RawEvent> {
    let block = VEVENT_RE.find(text).map_or(text, |found| found.as_str());

    let start_raw = property(&DTSTART_RE, block)?;
    let end_raw = property(&DTEND_RE, block)?;
    let start = parse_ical_date(&start_raw)?;
    let end = parse_ical_date(&end_raw)?;

    Some(RawEvent {
        id: Some(id.into()),
        title: Some(
            property(&SUMMARY_RE, block).unwrap_or_else(|| UNTITLED_EVENT.to_string()),
        ),
        start: Some(RawDate::Native(start)),
        end: Some(RawDate::Native(end)),
        all_day: Some(!start_raw.contains('T')),
        description: property(&DESCRIPTION_RE, block),
        location: property(&LOCATION_RE, block),
        ..RawEvent::default()
    })
}
