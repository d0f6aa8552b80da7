//! Year-view session service.
//!
//! # Responsibility
//! - Own the per-view state (year, topology, calendar selection, options)
//!   explicitly and persist user choices through `Preferences`.
//! - Run layout passes: fetch, normalize, filter, lay out.
//!
//! # Invariants
//! - The year always stays inside the configured range.
//! - Only the most recently issued pass may replace the current layout.
//! - Fetch and preference failures degrade to empty/default results; only
//!   layout configuration errors are returned.

use crate::config::LayoutConfig;
use crate::layout::filter::normalize_threshold_hours;
use crate::layout::topology::RowTopology;
use crate::layout::{compute_layout, layout_raw_events, LayoutError, LayoutOptions, YearLayout};
use crate::model::calendar::CalendarInfo;
use crate::prefs::{PreferenceStore, Preferences};
use crate::source::{EventSource, FetchOptions};
use log::{error, info};
use std::collections::BTreeSet;
use std::time::Instant;

/// Explicit per-view state threaded into every pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub year: i32,
    pub topology: RowTopology,
    pub selected_calendars: BTreeSet<String>,
    pub show_week_numbers: bool,
    pub all_day_only: bool,
    pub min_duration_hours: f64,
}

/// Identifies one requested layout pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PassTicket {
    generation: u64,
}

impl PassTicket {
    pub fn generation(self) -> u64 {
        self.generation
    }
}

pub struct YearViewService<S: EventSource, P: PreferenceStore> {
    source: S,
    prefs: Preferences<P>,
    config: LayoutConfig,
    state: ViewState,
    calendars: Vec<CalendarInfo>,
    issued_generation: u64,
    layout: Option<YearLayout>,
}

impl<S: EventSource, P: PreferenceStore> YearViewService<S, P> {
    /// Creates a session for `year`, restoring persisted view settings.
    pub fn new(source: S, store: P, config: LayoutConfig, year: i32) -> Self {
        let prefs = Preferences::new(store);
        let state = ViewState {
            year: config.clamp_year(year),
            topology: prefs.load_view_mode(),
            selected_calendars: BTreeSet::new(),
            show_week_numbers: prefs.load_show_week_numbers(),
            all_day_only: false,
            min_duration_hours: prefs.load_min_duration_hours(),
        };
        Self {
            source,
            prefs,
            config,
            state,
            calendars: Vec::new(),
            issued_generation: 0,
            layout: None,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn calendars(&self) -> &[CalendarInfo] {
        &self.calendars
    }

    /// Layout of the latest accepted pass.
    pub fn layout(&self) -> Option<&YearLayout> {
        self.layout.as_ref()
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn preferences(&self) -> &Preferences<P> {
        &self.prefs
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Fetches calendars and restores the persisted selection.
    ///
    /// A stored selection is intersected with the available calendars; when
    /// nothing was stored every calendar is selected. The result is persisted.
    pub fn load_calendars(&mut self) -> &[CalendarInfo] {
        self.calendars = match self.source.fetch_calendars() {
            Ok(calendars) => calendars,
            Err(err) => {
                error!(
                    "event=fetch_calendars module=service status=error error={}",
                    err
                );
                Vec::new()
            }
        };

        let persisted = self.prefs.load_selected_calendars();
        self.state.selected_calendars = self
            .calendars
            .iter()
            .filter(|calendar| !persisted.found || persisted.ids.contains(&calendar.id))
            .map(|calendar| calendar.id.clone())
            .collect();
        self.persist_selection();

        info!(
            "event=load_calendars module=service status=ok available={} selected={} restored={}",
            self.calendars.len(),
            self.state.selected_calendars.len(),
            persisted.found
        );
        &self.calendars
    }

    /// Flips one available calendar; returns whether it is now selected.
    ///
    /// Unknown IDs are ignored.
    pub fn toggle_calendar(&mut self, calendar_id: &str) -> bool {
        if !self.calendars.iter().any(|calendar| calendar.id == calendar_id) {
            return false;
        }
        let selected = if self.state.selected_calendars.remove(calendar_id) {
            false
        } else {
            self.state
                .selected_calendars
                .insert(calendar_id.to_string());
            true
        };
        self.persist_selection();
        selected
    }

    pub fn select_all(&mut self) {
        self.set_all_calendars(true);
    }

    pub fn deselect_all(&mut self) {
        self.set_all_calendars(false);
    }

    fn set_all_calendars(&mut self, selected: bool) {
        if self.calendars.is_empty() {
            return;
        }
        self.state.selected_calendars = if selected {
            self.calendars
                .iter()
                .map(|calendar| calendar.id.clone())
                .collect()
        } else {
            BTreeSet::new()
        };
        self.persist_selection();
    }

    fn persist_selection(&self) {
        self.prefs
            .save_selected_calendars(&self.state.selected_calendars);
    }

    /// Sets the year, clamped to the configured range; returns the result.
    pub fn set_year(&mut self, year: i32) -> i32 {
        self.state.year = self.config.clamp_year(year);
        self.state.year
    }

    pub fn step_year(&mut self, delta: i32) -> i32 {
        self.set_year(self.state.year.saturating_add(delta))
    }

    pub fn set_topology(&mut self, topology: RowTopology) {
        self.state.topology = topology;
        self.prefs.save_view_mode(topology);
    }

    /// Selects the topology by view-mode name; unknown names are rejected.
    pub fn set_view_mode(&mut self, mode: &str) -> Result<RowTopology, LayoutError> {
        let topology: RowTopology = mode.parse()?;
        self.set_topology(topology);
        Ok(topology)
    }

    pub fn set_show_week_numbers(&mut self, show: bool) {
        self.state.show_week_numbers = show;
        self.prefs.save_show_week_numbers(show);
    }

    pub fn set_all_day_only(&mut self, all_day_only: bool) {
        self.state.all_day_only = all_day_only;
    }

    /// Moves the minimum-duration threshold by `delta_hours`.
    ///
    /// The result never drops below zero and is rounded to two decimals.
    pub fn adjust_min_duration(&mut self, delta_hours: f64) -> f64 {
        let current = normalize_threshold_hours(self.state.min_duration_hours);
        let next = normalize_threshold_hours(current + delta_hours);
        self.state.min_duration_hours = (next * 100.0).round() / 100.0;
        self.prefs
            .save_min_duration_hours(self.state.min_duration_hours);
        self.state.min_duration_hours
    }

    fn layout_options(&self) -> LayoutOptions {
        LayoutOptions {
            show_week_numbers: self.state.show_week_numbers,
            calendar_ids: Some(self.state.selected_calendars.clone()),
            min_duration_hours: self.state.min_duration_hours,
        }
    }

    /// Issues a ticket for a new pass, invalidating all earlier tickets.
    pub fn begin_pass(&mut self) -> PassTicket {
        self.issued_generation += 1;
        PassTicket {
            generation: self.issued_generation,
        }
    }

    /// Runs one pass over the current state without storing the result.
    ///
    /// An empty selection yields an empty layout without fetching.
    pub fn compute_pass(&self) -> Result<YearLayout, LayoutError> {
        let started_at = Instant::now();
        let state = &self.state;
        let options = self.layout_options();
        if state.selected_calendars.is_empty() {
            return compute_layout(state.year, state.topology, &[], &options, &self.config);
        }

        let fetch = FetchOptions {
            calendar_ids: state.selected_calendars.iter().cloned().collect(),
            all_day_only: state.all_day_only,
        };
        let raw = match self.source.fetch_events(state.year, &fetch) {
            Ok(raw) => raw,
            Err(err) => {
                error!(
                    "event=fetch_events module=service status=error year={} error={}",
                    state.year, err
                );
                Vec::new()
            }
        };

        let layout = layout_raw_events(state.year, state.topology, &raw, &options, &self.config)?;
        info!(
            "event=layout_refresh module=service status=ok year={} topology={} records={} segments={} dropped={} duration_ms={}",
            state.year,
            state.topology,
            raw.len(),
            layout.segments.len(),
            layout.dropped_records,
            started_at.elapsed().as_millis()
        );
        Ok(layout)
    }

    /// Stores `layout` if `ticket` is the latest issued; returns whether it was kept.
    pub fn complete_pass(&mut self, ticket: PassTicket, layout: YearLayout) -> bool {
        if ticket.generation != self.issued_generation {
            info!(
                "event=layout_pass module=service status=ok outcome=stale generation={} latest={}",
                ticket.generation, self.issued_generation
            );
            return false;
        }
        self.layout = Some(layout);
        true
    }

    /// Begins and computes one pass, then stores it as the current layout.
    ///
    /// Supersedes any pass begun earlier.
    pub fn refresh(&mut self) -> Result<&YearLayout, LayoutError> {
        self.begin_pass();
        let layout = self.compute_pass()?;
        Ok(self.layout.insert(layout))
    }

    /// Names of the selected calendars, in calendar order.
    pub fn selected_calendar_names(&self) -> Vec<&str> {
        self.calendars
            .iter()
            .filter(|calendar| self.state.selected_calendars.contains(&calendar.id))
            .map(CalendarInfo::display_name)
            .collect()
    }

    /// `No calendars selected`, or `Showing X of Y calendars` followed by
    /// the duration-filter summary when that filter is active.
    pub fn selection_summary(&self) -> String {
        let selected = self.selected_calendar_names().len();
        if selected == 0 {
            return "No calendars selected".to_string();
        }
        let base = format!("Showing {} of {} calendars", selected, self.calendars.len());
        match self
            .layout
            .as_ref()
            .and_then(|layout| layout.filter_stats.summary())
        {
            Some(filter) => format!("{base} · {filter}"),
            None => base,
        }
    }
}
