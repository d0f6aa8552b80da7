//! Year layout engine.
//!
//! # Responsibility
//! - Turn canonical events into placed, lane-assigned segments for one year
//!   and one row topology.
//! - Derive row heights from lane occupancy.
//!
//! # Invariants
//! - A pass depends only on its inputs: identical events, topology, year,
//!   options and config give identical output regardless of input order.
//! - Every segment of one event carries the same lane.
//! - Segments sharing a row and lane never overlap (barring clamped events,
//!   which are counted in `degraded_events`).
//! - Bad configuration fails the call; bad individual events are dropped.

pub mod color;
pub mod filter;
pub mod heights;
pub mod lanes;
pub mod split;
pub mod topology;

use crate::config::{ConfigError, LayoutConfig};
use crate::dates::{duration_ms, is_all_day};
use crate::ingest::normalize::normalize_batch;
use crate::model::event::{CalendarEvent, RawEvent};
use color::BarColors;
use filter::{filter_by_calendar, filter_by_min_duration, FilterStats};
use heights::row_heights;
use lanes::{LanePacker, LaneTable};
use log::debug;
use serde::Serialize;
use split::{split_event, Segment};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;
use topology::{RowTopology, WeekLabel, YearGrid};

/// Fatal layout configuration errors.
#[derive(Debug)]
pub enum LayoutError {
    /// View mode name does not match any topology.
    UnknownTopology(String),
    /// Year outside the configured or representable range.
    UnsupportedYear(i32),
    InvalidConfig(ConfigError),
}

impl Display for LayoutError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownTopology(name) => write!(
                f,
                "unknown view mode `{name}`; expected linear|day-aligned|week-rows"
            ),
            Self::UnsupportedYear(year) => write!(f, "year {year} is outside the supported range"),
            Self::InvalidConfig(err) => write!(f, "{err}"),
        }
    }
}

impl Error for LayoutError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidConfig(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ConfigError> for LayoutError {
    fn from(value: ConfigError) -> Self {
        Self::InvalidConfig(value)
    }
}

/// Per-pass options supplied by the host.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutOptions {
    /// Emit ISO week labels on Monday cells.
    pub show_week_numbers: bool,
    /// Selected calendars; `None` keeps every calendar.
    pub calendar_ids: Option<BTreeSet<String>>,
    /// Events shorter than this are filtered out; `<= 0` disables the filter.
    pub min_duration_hours: f64,
}

/// Segment with its lane and display data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlacedSegment {
    #[serde(flatten)]
    pub segment: Segment,
    pub lane: usize,
    pub title: String,
    pub color: String,
    /// `color` at 25% opacity.
    pub background: String,
    /// `color` at 60% opacity.
    pub border: String,
    pub all_day: bool,
}

/// Full output of one layout pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearLayout {
    pub year: i32,
    pub topology: RowTopology,
    pub row_count: usize,
    /// Unit columns per row.
    pub row_width: u32,
    /// Renderer shows a content-sized header row above the grid.
    pub header_row: bool,
    pub segments: Vec<PlacedSegment>,
    /// One height per grid row, header excluded.
    pub row_heights: Vec<u32>,
    pub week_labels: Vec<WeekLabel>,
    pub filter_stats: FilterStats,
    /// Raw records dropped during normalization.
    pub dropped_records: usize,
    /// Events clamped after lane-search exhaustion.
    pub degraded_events: usize,
}

impl YearLayout {
    /// Lane assigned to an event, if it produced any segment.
    pub fn lane_of(&self, event_id: &str) -> Option<usize> {
        self.segments
            .iter()
            .find(|placed| placed.segment.source_event_id == event_id)
            .map(|placed| placed.lane)
    }

    pub fn segments_in_row(&self, row: usize) -> impl Iterator<Item = &PlacedSegment> {
        self.segments
            .iter()
            .filter(move |placed| placed.segment.row_index == row)
    }
}

/// Packing order: start ascending, duration descending, title ascending,
/// then ID as the final tie-break.
pub fn compare_events(a: &CalendarEvent, b: &CalendarEvent) -> Ordering {
    a.start
        .cmp(&b.start)
        .then_with(|| duration_ms(b).cmp(&duration_ms(a)))
        .then_with(|| a.title.cmp(&b.title))
        .then_with(|| a.id.cmp(&b.id))
}

/// Lays out canonical events for `year` under `topology`.
pub fn compute_layout(
    year: i32,
    topology: RowTopology,
    events: &[CalendarEvent],
    options: &LayoutOptions,
    config: &LayoutConfig,
) -> Result<YearLayout, LayoutError> {
    let started_at = Instant::now();
    config.validate()?;
    if !config.supports_year(year) {
        return Err(LayoutError::UnsupportedYear(year));
    }
    let grid = YearGrid::new(year, topology, config.week_rows_cap)?;

    let selected = filter_by_calendar(events.to_vec(), options.calendar_ids.as_ref());
    let (mut kept, filter_stats) = filter_by_min_duration(selected, options.min_duration_hours);
    kept.sort_by(compare_events);

    let mut packer = LanePacker::new(
        LaneTable::new(topology.occupancy_model(), grid.row_count()),
        config.max_lanes,
    );
    let mut segments = Vec::new();
    for event in &kept {
        let event_segments = split_event(&grid, event);
        if event_segments.is_empty() {
            continue;
        }
        let placement = packer.place(&event.id, &event_segments);
        let all_day = is_all_day(event);
        let color = event.display_color();
        let bar = BarColors::from_color(color);
        segments.extend(event_segments.into_iter().map(|segment| PlacedSegment {
            segment,
            lane: placement.lane,
            title: event.title.clone(),
            color: color.to_string(),
            background: bar.background.clone(),
            border: bar.border.clone(),
            all_day,
        }));
    }

    let layout = YearLayout {
        year,
        topology,
        row_count: grid.row_count(),
        row_width: grid.row_width(),
        header_row: topology.has_header_row(),
        row_heights: row_heights(&packer.lane_counts(), &config.row_heights),
        week_labels: if options.show_week_numbers {
            grid.week_labels()
        } else {
            Vec::new()
        },
        segments,
        filter_stats,
        dropped_records: 0,
        degraded_events: packer.clamped_events(),
    };

    debug!(
        "event=layout_pass module=layout status=ok year={} topology={} events={} segments={} degraded={} duration_ms={}",
        year,
        topology,
        kept.len(),
        layout.segments.len(),
        layout.degraded_events,
        started_at.elapsed().as_millis()
    );
    Ok(layout)
}

/// Like [`compute_layout`], selecting the topology by view-mode name.
///
/// Unknown names fail instead of falling back to a default topology.
pub fn compute_layout_for_mode(
    year: i32,
    mode: &str,
    events: &[CalendarEvent],
    options: &LayoutOptions,
    config: &LayoutConfig,
) -> Result<YearLayout, LayoutError> {
    let topology: RowTopology = mode.parse()?;
    compute_layout(year, topology, events, options, config)
}

/// Normalizes raw records, then lays them out.
pub fn layout_raw_events(
    year: i32,
    topology: RowTopology,
    raw: &[RawEvent],
    options: &LayoutOptions,
    config: &LayoutConfig,
) -> Result<YearLayout, LayoutError> {
    let batch = normalize_batch(raw);
    let mut layout = compute_layout(year, topology, &batch.events, options, config)?;
    layout.dropped_records = batch.dropped;
    Ok(layout)
}
