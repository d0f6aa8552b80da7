//! Built-in demonstration calendars and events.
//!
//! Events are generated relative to the requested year, including one that
//! starts in the previous year and one that ends in the next.

use super::{select_records, EventSource, FetchOptions, SourceResult};
use crate::model::calendar::CalendarInfo;
use crate::model::event::RawEvent;
use chrono::{NaiveDate, NaiveDateTime};

const CALENDARS: &[(&str, &str, &str)] = &[
    ("sample-work", "Work", "#0ea5e9"),
    ("sample-personal", "Personal", "#22c55e"),
    ("sample-project", "Project X", "#f97316"),
    ("sample-holidays", "Holidays", "#ef4444"),
];

/// `(year offset, month, day, hour, minute)` relative to the requested year.
type Stamp = (i32, u32, u32, u32, u32);

struct SampleEntry {
    calendar_id: &'static str,
    title: &'static str,
    start: Stamp,
    end: Stamp,
    all_day: bool,
}

const fn timed(calendar_id: &'static str, title: &'static str, start: Stamp, end: Stamp) -> SampleEntry {
    SampleEntry {
        calendar_id,
        title,
        start,
        end,
        all_day: false,
    }
}

const fn days(
    calendar_id: &'static str,
    title: &'static str,
    start: (i32, u32, u32),
    end: (i32, u32, u32),
) -> SampleEntry {
    SampleEntry {
        calendar_id,
        title,
        start: (start.0, start.1, start.2, 0, 0),
        end: (end.0, end.1, end.2, 0, 0),
        all_day: true,
    }
}

const ENTRIES: &[SampleEntry] = &[
    timed("sample-work", "Design review", (0, 2, 12, 9, 0), (0, 2, 12, 13, 30)),
    days("sample-work", "Release freeze", (0, 3, 4), (0, 3, 8)),
    days("sample-personal", "Summer vacation", (0, 7, 8), (0, 7, 23)),
    days("sample-project", "Project rollout window", (0, 10, 3), (0, 10, 29)),
    timed("sample-project", "Incident response drill", (0, 11, 20, 18, 0), (0, 11, 21, 2, 0)),
    days("sample-personal", "Year handover", (-1, 12, 29), (0, 1, 10)),
    days("sample-work", "Team building", (0, 3, 15), (0, 3, 18)),
    days("sample-personal", "Family reunion", (0, 4, 20), (0, 4, 23)),
    days("sample-project", "Beta testing", (0, 5, 10), (0, 5, 16)),
    days("sample-holidays", "Christmas break", (0, 12, 24), (0, 12, 27)),
    days("sample-holidays", "New Year", (0, 12, 31), (1, 1, 3)),
    days("sample-work", "Quarterly planning", (0, 5, 5), (0, 5, 20)),
    days("sample-work", "Client workshops", (0, 7, 7), (0, 7, 22)),
    days("sample-work", "Performance reviews", (0, 9, 1), (0, 9, 16)),
    days("sample-personal", "Extended family visit", (0, 5, 10), (0, 5, 25)),
    days("sample-personal", "Home renovation", (0, 8, 1), (0, 8, 16)),
    days("sample-personal", "Thanksgiving prep", (0, 11, 1), (0, 11, 16)),
    days("sample-project", "Development sprint", (0, 6, 1), (0, 6, 16)),
    days("sample-project", "User testing phase", (0, 5, 15), (0, 5, 30)),
    days("sample-project", "Launch preparation", (0, 10, 1), (0, 10, 16)),
    days("sample-holidays", "Spring break", (0, 4, 1), (0, 4, 16)),
    days("sample-holidays", "Memorial Day weekend", (0, 5, 20), (0, 6, 4)),
    days("sample-holidays", "Thanksgiving week", (0, 11, 20), (0, 12, 1)),
];

fn resolve(year: i32, stamp: Stamp) -> Option<NaiveDateTime> {
    let (offset, month, day, hour, minute) = stamp;
    NaiveDate::from_ymd_opt(year.checked_add(offset)?, month, day)?.and_hms_opt(hour, minute, 0)
}

/// In-memory source serving the demonstration data set.
#[derive(Debug, Clone, Copy, Default)]
pub struct SampleEventSource;

impl SampleEventSource {
    pub fn new() -> Self {
        Self
    }

    fn calendars() -> Vec<CalendarInfo> {
        CALENDARS
            .iter()
            .map(|(id, name, color)| CalendarInfo::new(*id, *name, Some(*color)))
            .collect()
    }

    fn records(year: i32) -> Vec<RawEvent> {
        ENTRIES
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| {
                let start = resolve(year, entry.start)?;
                let end = resolve(year, entry.end)?;
                let mut record = RawEvent::with_span(
                    format!("sample-{year}-{}", index + 1),
                    entry.title,
                    start,
                    end,
                    entry.all_day,
                );
                record.calendar_id = Some(entry.calendar_id.to_string());
                Some(record)
            })
            .collect()
    }
}

impl EventSource for SampleEventSource {
    fn fetch_calendars(&self) -> SourceResult<Vec<CalendarInfo>> {
        Ok(Self::calendars())
    }

    fn fetch_events(&self, year: i32, options: &FetchOptions) -> SourceResult<Vec<RawEvent>> {
        Ok(select_records(
            Self::records(year),
            &Self::calendars(),
            options,
        ))
    }
}
