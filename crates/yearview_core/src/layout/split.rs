//! Year clipping and per-row segment splitting.
//!
//! # Responsibility
//! - Clip an event to `[Jan 1 00:00:00.000, Dec 31 23:59:59.999]` of the year.
//! - Decompose the clipped span into one segment per touched grid row.
//!
//! # Invariants
//! - Events with an empty intersection with the year produce no segments.
//! - `start_unit <= end_unit` for every segment; units are inclusive.
//! - A same-day event occupies exactly one unit.
//! - Month-row continuation flags compare absolute months of the unclipped
//!   event; week-row flags follow segment ordinal.

use super::topology::{RowTopology, YearGrid, WEEK_ROW_DAYS};
use crate::dates::{days_in_month, effective_end, is_all_day, year_bounds};
use crate::model::event::{CalendarEvent, EventId};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::Serialize;

/// Portion of one event inside one grid row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub row_index: usize,
    /// First occupied unit (inclusive).
    pub start_unit: u32,
    /// Last occupied unit (inclusive).
    pub end_unit: u32,
    pub source_event_id: EventId,
    pub continues_from_prior_row: bool,
    pub continues_to_next_row: bool,
}

impl Segment {
    /// Whether two segments share a row and at least one unit.
    pub fn overlaps(&self, other: &Segment) -> bool {
        self.row_index == other.row_index
            && self.start_unit <= other.end_unit
            && other.start_unit <= self.end_unit
    }
}

/// Event span after clipping to the target year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClippedSpan {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub all_day: bool,
}

impl ClippedSpan {
    pub fn first_day(&self) -> NaiveDate {
        self.start.date()
    }

    pub fn last_day(&self) -> NaiveDate {
        self.end.date()
    }
}

/// Clips `[start, effective_end]` to the year; `None` when nothing remains.
pub fn clip_to_year(year: i32, event: &CalendarEvent) -> Option<ClippedSpan> {
    let (year_start, year_end) = year_bounds(year)?;
    let all_day = is_all_day(event);
    let start = event.start.max(year_start);
    let end = effective_end(event).min(year_end);
    if end < start {
        return None;
    }
    Some(ClippedSpan {
        start,
        end,
        all_day,
    })
}

/// Splits one event into segments for the grid's topology.
pub fn split_event(grid: &YearGrid, event: &CalendarEvent) -> Vec<Segment> {
    let Some(span) = clip_to_year(grid.year(), event) else {
        return Vec::new();
    };
    match grid.topology() {
        RowTopology::Linear | RowTopology::DayAligned => split_by_month(grid, event, &span),
        RowTopology::WeekRows => split_by_week_rows(grid, event, &span),
    }
}

fn month_ordinal(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 12 + i64::from(date.month0())
}

fn split_by_month(grid: &YearGrid, event: &CalendarEvent, span: &ClippedSpan) -> Vec<Segment> {
    let first = span.first_day();
    let last = span.last_day();
    let event_first_month = month_ordinal(event.start.date());
    let event_last_month = month_ordinal(effective_end(event).date());
    let aligned = grid.topology() == RowTopology::DayAligned;

    (first.month0()..=last.month0())
        .map(|month0| {
            let start_day = if month0 == first.month0() { first.day() } else { 1 };
            let end_day = if month0 == last.month0() {
                last.day()
            } else {
                days_in_month(grid.year(), month0 + 1)
            };
            let row_index = month0 as usize;
            let offset = if aligned { grid.month_offset(row_index) } else { 0 };
            let ordinal = i64::from(grid.year()) * 12 + i64::from(month0);
            Segment {
                row_index,
                start_unit: offset + start_day,
                end_unit: offset + end_day,
                source_event_id: event.id.clone(),
                continues_from_prior_row: ordinal > event_first_month,
                continues_to_next_row: ordinal < event_last_month,
            }
        })
        .collect()
}

fn split_by_week_rows(grid: &YearGrid, event: &CalendarEvent, span: &ClippedSpan) -> Vec<Segment> {
    let row_days = WEEK_ROW_DAYS as usize;
    let first_offset = (span.first_day() - grid.week_origin()).num_days() as usize;
    let last_offset = (span.last_day() - grid.week_origin()).num_days() as usize;
    let first_row = first_offset / row_days;
    let last_row = (last_offset / row_days).min(grid.row_count().saturating_sub(1));
    if first_row >= grid.row_count() {
        return Vec::new();
    }

    let mut segments: Vec<Segment> = (first_row..=last_row)
        .map(|row| {
            let row_first = row * row_days;
            let row_last = row_first + row_days - 1;
            Segment {
                row_index: row,
                start_unit: (first_offset.max(row_first) - row_first) as u32,
                end_unit: (last_offset.min(row_last) - row_first) as u32,
                source_event_id: event.id.clone(),
                continues_from_prior_row: false,
                continues_to_next_row: false,
            }
        })
        .collect();

    let count = segments.len();
    for (ordinal, segment) in segments.iter_mut().enumerate() {
        segment.continues_from_prior_row = ordinal > 0;
        segment.continues_to_next_row = ordinal + 1 < count;
    }
    segments
}
