//! Event source backed by a JSON document on disk.
//!
//! Document shape: `{ "calendars": [CalendarInfo...], "events": [entry...] }`.
//! An entry is either a raw record or `{ "id", "calendarId", "ical" }` with
//! the iCalendar text of one event. The file is re-read on every fetch.
//!
//! # Invariants
//! - One unreadable entry never fails the document: it becomes a record
//!   without dates, which normalization drops and counts.

use super::{select_records, EventSource, FetchOptions, SourceError, SourceResult};
use crate::ingest::ics::parse_vevent;
use crate::ingest::normalize::parse_raw_date;
use crate::model::calendar::CalendarInfo;
use crate::model::event::RawEvent;
use chrono::Datelike;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// On-disk event document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDocument {
    #[serde(default)]
    pub calendars: Vec<CalendarInfo>,
    /// Entries are decoded one by one, see [`decode_entry`].
    #[serde(default)]
    pub events: Vec<Value>,
}

impl EventDocument {
    pub fn from_json_str(text: &str) -> SourceResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Decodes every entry; unreadable entries stay in place as undated records.
    pub fn records(self) -> Vec<RawEvent> {
        self.events
            .into_iter()
            .enumerate()
            .map(|(index, entry)| decode_entry(index, entry))
            .collect()
    }
}

fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

/// Decodes one document entry into a raw record.
///
/// Numeric IDs are read as text. `ical` entries go through [`parse_vevent`]
/// and keep their `calendarId`.
pub fn decode_entry(index: usize, mut entry: Value) -> RawEvent {
    let id = entry.get("id").and_then(id_text);
    let calendar_id = entry
        .get("calendarId")
        .and_then(Value::as_str)
        .map(str::to_string);
    let ical = entry
        .get("ical")
        .and_then(Value::as_str)
        .map(str::to_string);

    let decoded = match ical {
        Some(text) => parse_vevent(id.clone().unwrap_or_default(), &text).map(|mut record| {
            record.calendar_id = calendar_id.clone();
            record
        }),
        None => {
            if let (Some(object), Some(id)) = (entry.as_object_mut(), id.as_ref()) {
                object.insert("id".to_string(), Value::String(id.clone()));
            }
            match serde_json::from_value::<RawEvent>(entry) {
                Ok(record) => Some(record),
                Err(err) => {
                    debug!(
                        "event=decode_entry module=source status=degraded index={} error={}",
                        index, err
                    );
                    None
                }
            }
        }
    };

    decoded.unwrap_or_else(|| RawEvent {
        id,
        calendar_id,
        ..RawEvent::default()
    })
}

/// Whether a record starts in, ends in or spans `year`.
///
/// Records with unreadable bounds are kept so normalization can count them.
pub fn touches_year(record: &RawEvent, year: i32) -> bool {
    let start = record.start_value().and_then(parse_raw_date);
    let end = record.end_value().and_then(parse_raw_date);
    let (Some(start), Some(end)) = (start, end) else {
        return true;
    };
    let (first, last) = (start.year(), end.year());
    first == year || last == year || (first < year && last > year)
}

#[derive(Debug, Clone)]
pub struct JsonEventSource {
    path: PathBuf,
}

impl JsonEventSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> SourceResult<EventDocument> {
        let text = std::fs::read_to_string(&self.path).map_err(|source| SourceError::Io {
            path: self.path.clone(),
            source,
        })?;
        EventDocument::from_json_str(&text)
    }
}

impl EventSource for JsonEventSource {
    fn fetch_calendars(&self) -> SourceResult<Vec<CalendarInfo>> {
        Ok(self.load()?.calendars)
    }

    fn fetch_events(&self, year: i32, options: &FetchOptions) -> SourceResult<Vec<RawEvent>> {
        let started_at = Instant::now();
        let document = self.load()?;
        let calendars = document.calendars.clone();
        let in_year: Vec<RawEvent> = document
            .records()
            .into_iter()
            .filter(|record| touches_year(record, year))
            .collect();
        let events = select_records(in_year, &calendars, options);
        info!(
            "event=fetch_events module=source status=ok source=json year={} total={} duration_ms={}",
            year,
            events.len(),
            started_at.elapsed().as_millis()
        );
        Ok(events)
    }
}
