//! Event source contracts and implementations.
//!
//! # Responsibility
//! - Define how calendars and raw event records are fetched for one year.
//! - Attach calendar provenance (`calendarName`, `calendarColor`) to records.
//!
//! # Invariants
//! - An empty `FetchOptions::calendar_ids` selects every calendar.
//! - Sources return raw records; parsing happens in `ingest::normalize`.

pub mod json_file;
pub mod sample;

use crate::model::calendar::CalendarInfo;
use crate::model::event::RawEvent;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub use json_file::JsonEventSource;
pub use sample::SampleEventSource;

pub type SourceResult<T> = Result<T, SourceError>;

/// Fetch failure. Callers treat it as an empty result.
#[derive(Debug)]
pub enum SourceError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(serde_json::Error),
    /// Backend cannot serve requests at all.
    Unavailable(String),
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read events `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid event document: {err}"),
            Self::Unavailable(message) => write!(f, "event source unavailable: {message}"),
        }
    }
}

impl Error for SourceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Unavailable(_) => None,
        }
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Filters applied by the source while fetching.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// Calendars to include; empty means all.
    pub calendar_ids: Vec<String>,
    /// Only return records flagged all-day.
    pub all_day_only: bool,
}

impl FetchOptions {
    pub fn for_calendars(calendar_ids: impl IntoIterator<Item = String>) -> Self {
        Self {
            calendar_ids: calendar_ids.into_iter().collect(),
            all_day_only: false,
        }
    }

    pub fn includes_calendar(&self, calendar_id: &str) -> bool {
        self.calendar_ids.is_empty() || self.calendar_ids.iter().any(|id| id == calendar_id)
    }
}

/// Provider of calendars and raw event records.
pub trait EventSource {
    fn fetch_calendars(&self) -> SourceResult<Vec<CalendarInfo>>;
    fn fetch_events(&self, year: i32, options: &FetchOptions) -> SourceResult<Vec<RawEvent>>;
}

impl<S: EventSource + ?Sized> EventSource for Box<S> {
    fn fetch_calendars(&self) -> SourceResult<Vec<CalendarInfo>> {
        (**self).fetch_calendars()
    }

    fn fetch_events(&self, year: i32, options: &FetchOptions) -> SourceResult<Vec<RawEvent>> {
        (**self).fetch_events(year, options)
    }
}

/// Copies calendar name and colour onto a record.
pub(crate) fn attach_provenance(record: &mut RawEvent, calendar: &CalendarInfo) {
    record.calendar_id = Some(calendar.id.clone());
    record.calendar_name = Some(calendar.display_name().to_string());
    record.calendar_color = calendar.color.clone();
}

/// Applies calendar and all-day filters, then attaches provenance.
///
/// Records of unknown calendars are only kept when no selection is given.
pub(crate) fn select_records(
    records: Vec<RawEvent>,
    calendars: &[CalendarInfo],
    options: &FetchOptions,
) -> Vec<RawEvent> {
    records
        .into_iter()
        .filter(|record| !options.all_day_only || record.flagged_all_day())
        .filter_map(|mut record| {
            let calendar = calendars
                .iter()
                .find(|calendar| record.calendar_id.as_deref() == Some(calendar.id.as_str()));
            match calendar {
                Some(calendar) if options.includes_calendar(&calendar.id) => {
                    attach_provenance(&mut record, calendar);
                    Some(record)
                }
                Some(_) => None,
                None if options.calendar_ids.is_empty() => Some(record),
                None => None,
            }
        })
        .collect()
}
