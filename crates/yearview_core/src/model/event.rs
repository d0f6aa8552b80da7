//! Raw and canonical calendar event records.
//!
//! # Responsibility
//! - Describe the heterogeneous shapes event sources hand over (`RawEvent`).
//! - Describe the canonical, fully parsed event (`CalendarEvent`).
//!
//! # Invariants
//! - `CalendarEvent::title` is never absent; missing titles become `""`.
//! - `CalendarEvent::end` is not earlier than `CalendarEvent::start`.
//! - Times are local wall-clock values; no timezone is attached.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Opaque event identifier, unique within one fetch batch.
pub type EventId = String;

/// Colour used when neither the calendar nor the event supplies one.
pub const DEFAULT_EVENT_COLOR: &str = "#38bdf8";

/// Date value as delivered by an event source.
///
/// Sources either hand over an already parsed local date-time or a string
/// in one of the supported textual shapes (see `ingest::normalize`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawDate {
    /// Already parsed local date-time.
    #[serde(skip_deserializing)]
    Native(NaiveDateTime),
    /// Textual date: `YYYYMMDD`, `YYYYMMDDTHHMMSS` or a generic date string.
    Text(String),
}

impl RawDate {
    fn is_blank(&self) -> bool {
        match self {
            Self::Native(_) => false,
            Self::Text(value) => value.trim().is_empty(),
        }
    }
}

impl From<NaiveDateTime> for RawDate {
    fn from(value: NaiveDateTime) -> Self {
        Self::Native(value)
    }
}

impl From<&str> for RawDate {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Loosely-typed event record as produced by an event source.
///
/// Both `start`/`end` and `startDate`/`endDate` key spellings are accepted;
/// the all-day flag may arrive as `allDay` or `isAllDay`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawEvent {
    pub id: Option<String>,
    pub title: Option<String>,
    pub start: Option<RawDate>,
    pub start_date: Option<RawDate>,
    pub end: Option<RawDate>,
    pub end_date: Option<RawDate>,
    pub all_day: Option<bool>,
    pub is_all_day: Option<bool>,
    pub calendar_id: Option<String>,
    pub calendar_name: Option<String>,
    pub calendar_color: Option<String>,
    pub color: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
}

impl RawEvent {
    /// Builds a record with parsed start/end values.
    pub fn with_span(
        id: impl Into<String>,
        title: impl Into<String>,
        start: NaiveDateTime,
        end: NaiveDateTime,
        all_day: bool,
    ) -> Self {
        Self {
            id: Some(id.into()),
            title: Some(title.into()),
            start: Some(RawDate::Native(start)),
            end: Some(RawDate::Native(end)),
            all_day: Some(all_day),
            ..Self::default()
        }
    }

    /// Start value, preferring `start` over `startDate`.
    pub fn start_value(&self) -> Option<&RawDate> {
        prefer_primary(self.start.as_ref(), self.start_date.as_ref())
    }

    /// End value, preferring `end` over `endDate`.
    pub fn end_value(&self) -> Option<&RawDate> {
        prefer_primary(self.end.as_ref(), self.end_date.as_ref())
    }

    /// Whether either all-day flag spelling is set.
    pub fn flagged_all_day(&self) -> bool {
        self.all_day == Some(true) || self.is_all_day == Some(true)
    }
}

fn prefer_primary<'a>(
    primary: Option<&'a RawDate>,
    fallback: Option<&'a RawDate>,
) -> Option<&'a RawDate> {
    match primary {
        Some(value) if !value.is_blank() => Some(value),
        _ => fallback,
    }
}

/// Canonical event value used by every layout pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: EventId,
    pub title: String,
    /// Local wall-clock start.
    pub start: NaiveDateTime,
    /// Local wall-clock end. Exclusive midnight for raw all-day events.
    pub end: NaiveDateTime,
    /// Explicit all-day flag carried from the raw record.
    pub is_all_day: bool,
    pub calendar_id: Option<String>,
    pub calendar_name: Option<String>,
    pub calendar_color: Option<String>,
    pub color: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
}

impl CalendarEvent {
    /// Creates a timed event without provenance metadata.
    pub fn new(
        id: impl Into<EventId>,
        title: impl Into<String>,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            start,
            end,
            is_all_day: false,
            calendar_id: None,
            calendar_name: None,
            calendar_color: None,
            color: None,
            description: None,
            location: None,
        }
    }

    /// Marks the event as explicitly all-day.
    pub fn into_all_day(mut self) -> Self {
        self.is_all_day = true;
        self
    }

    /// Attaches the owning calendar ID.
    pub fn in_calendar(mut self, calendar_id: impl Into<String>) -> Self {
        self.calendar_id = Some(calendar_id.into());
        self
    }

    /// Resolves the bar colour: calendar colour, then event colour, then default.
    pub fn display_color(&self) -> &str {
        self.calendar_color
            .as_deref()
            .filter(|value| !value.trim().is_empty())
            .or_else(|| self.color.as_deref().filter(|value| !value.trim().is_empty()))
            .unwrap_or(DEFAULT_EVENT_COLOR)
    }
}
