//! Raw record normalization.
//!
//! # Responsibility
//! - Resolve start/end from either key spelling and parse them into local
//!   wall-clock values.
//! - Carry the all-day flag and provenance metadata onto `CalendarEvent`.
//!
//! # Invariants
//! - `YYYYMMDD` is local midnight; `YYYYMMDDTHHMMSS` is local time as written.
//! - Unparseable or missing bounds, and ends before starts, drop the record.
//!   Records are never defaulted to "now" or to the epoch.
//! - Records without an ID get a deterministic one.

use crate::model::event::{CalendarEvent, RawDate, RawEvent};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

static COMPACT_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})(\d{2})(\d{2})$").expect("valid compact date regex"));
static COMPACT_DATE_TIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4})(\d{2})(\d{2})T(\d{2})(\d{2})(\d{2})$")
        .expect("valid compact date-time regex")
});

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%B %d, %Y", "%b %d %Y"];

/// Canonical events plus the number of records that were dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    pub events: Vec<CalendarEvent>,
    pub dropped: usize,
}

/// Parses one raw date value; `None` when it cannot be read.
pub fn parse_raw_date(value: &RawDate) -> Option<NaiveDateTime> {
    match value {
        RawDate::Native(value) => Some(*value),
        RawDate::Text(text) => parse_date_text(text),
    }
}

/// Parses textual dates: compact forms first, then generic date strings.
pub fn parse_date_text(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Some(caps) = COMPACT_DATE_RE.captures(text) {
        return compact_date(&caps[1], &caps[2], &caps[3])
            .map(|date| date.and_time(NaiveTime::MIN));
    }

    if let Some(caps) = COMPACT_DATE_TIME_RE.captures(text) {
        let date = compact_date(&caps[1], &caps[2], &caps[3])?;
        let hour = caps[4].parse().ok()?;
        let minute = caps[5].parse().ok()?;
        let second = caps[6].parse().ok()?;
        return date.and_hms_opt(hour, minute, second);
    }

    parse_generic(text)
}

fn compact_date(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

// Values with an explicit offset keep the wall-clock time as written.
fn parse_generic(text: &str) -> Option<NaiveDateTime> {
    if let Ok(value) = DateTime::parse_from_rfc3339(text) {
        return Some(value.naive_local());
    }
    if let Ok(value) = DateTime::parse_from_rfc2822(text) {
        return Some(value.naive_local());
    }
    DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
                .map(|date| date.and_time(NaiveTime::MIN))
        })
}

/// Deterministic ID for a record that arrived without one.
pub fn synthesize_event_id(
    index: usize,
    title: &str,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> String {
    let key = format!("{index}|{title}|{start}|{end}");
    Uuid::new_v5(&Uuid::NAMESPACE_OID, key.as_bytes()).to_string()
}

/// Normalizes the record at position `index` of its batch.
pub fn normalize_event(index: usize, raw: &RawEvent) -> Option<CalendarEvent> {
    let start = raw.start_value().and_then(parse_raw_date)?;
    let end = raw.end_value().and_then(parse_raw_date)?;
    if end < start {
        return None;
    }

    let title = raw.title.clone().unwrap_or_default();
    let id = match raw.id.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => synthesize_event_id(index, &title, start, end),
    };

    Some(CalendarEvent {
        id,
        title,
        start,
        end,
        is_all_day: raw.flagged_all_day(),
        calendar_id: raw.calendar_id.clone(),
        calendar_name: raw.calendar_name.clone(),
        calendar_color: raw.calendar_color.clone(),
        color: raw.color.clone(),
        description: raw.description.clone(),
        location: raw.location.clone(),
    })
}

/// Normalizes a whole batch, dropping and counting malformed records.
pub fn normalize_batch(raw: &[RawEvent]) -> NormalizeReport {
    let mut report = NormalizeReport::default();
    for (index, record) in raw.iter().enumerate() {
        match normalize_event(index, record) {
            Some(event) => report.events.push(event),
            None => {
                report.dropped += 1;
                debug!(
                    "event=normalize_drop module=ingest status=degraded index={} id={}",
                    index,
                    record.id.as_deref().unwrap_or("-")
                );
            }
        }
    }
    if report.dropped > 0 {
        debug!(
            "event=normalize_batch module=ingest status=ok kept={} dropped={}",
            report.events.len(),
            report.dropped
        );
    }
    report
}
