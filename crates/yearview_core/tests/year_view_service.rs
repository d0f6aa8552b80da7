use serde_json::json;
use std::cell::Cell;
use yearview_core::model::calendar::CalendarInfo;
use yearview_core::source::{SourceError, SourceResult};
use yearview_core::{
    EventSource, FetchOptions, LayoutConfig, LayoutError, MemoryPreferenceStore, PreferenceStore,
    Preferences, RawEvent, RowTopology, SampleEventSource, YearViewService,
};

/// Sample data that counts event fetches.
#[derive(Default)]
struct CountingSource {
    inner: SampleEventSource,
    fetches: Cell<usize>,
}

impl EventSource for CountingSource {
    fn fetch_calendars(&self) -> SourceResult<Vec<CalendarInfo>> {
        self.inner.fetch_calendars()
    }

    fn fetch_events(&self, year: i32, options: &FetchOptions) -> SourceResult<Vec<RawEvent>> {
        self.fetches.set(self.fetches.get() + 1);
        self.inner.fetch_events(year, options)
    }
}

/// Lists calendars but never delivers events.
struct OfflineSource;

impl EventSource for OfflineSource {
    fn fetch_calendars(&self) -> SourceResult<Vec<CalendarInfo>> {
        Ok(vec![CalendarInfo::new("remote", "Remote", None)])
    }

    fn fetch_events(&self, _year: i32, _options: &FetchOptions) -> SourceResult<Vec<RawEvent>> {
        Err(SourceError::Unavailable("calendar backend offline".to_string()))
    }
}

fn service(
    store: &MemoryPreferenceStore,
) -> YearViewService<CountingSource, &MemoryPreferenceStore> {
    YearViewService::new(CountingSource::default(), store, LayoutConfig::default(), 2026)
}

#[test]
fn first_load_selects_every_calendar_and_persists_it() {
    let store = MemoryPreferenceStore::new();
    let mut view = service(&store);

    assert_eq!(view.load_calendars().len(), 4);
    assert_eq!(view.state().selected_calendars.len(), 4);
    assert_eq!(view.selection_summary(), "Showing 4 of 4 calendars");

    let persisted = Preferences::new(&store).load_selected_calendars();
    assert!(persisted.found);
    assert_eq!(persisted.ids, view.state().selected_calendars);
}

#[test]
fn persisted_selection_is_intersected_with_available_calendars() {
    let store = MemoryPreferenceStore::new();
    store
        .save("selectedCalendarIds", &json!(["sample-work", "retired-calendar"]))
        .unwrap();
    let mut view = service(&store);

    view.load_calendars();

    assert_eq!(
        view.state().selected_calendars.iter().collect::<Vec<_>>(),
        vec!["sample-work"]
    );
    assert_eq!(view.selected_calendar_names(), vec!["Work"]);
    assert_eq!(
        Preferences::new(&store).load_selected_calendars().ids.len(),
        1
    );
}

#[test]
fn toggle_and_bulk_selection_update_state() {
    let store = MemoryPreferenceStore::new();
    let mut view = service(&store);
    view.load_calendars();

    assert!(!view.toggle_calendar("sample-work"));
    assert_eq!(view.state().selected_calendars.len(), 3);
    assert!(view.toggle_calendar("sample-work"));
    assert!(!view.toggle_calendar("no-such-calendar"));
    assert_eq!(view.state().selected_calendars.len(), 4);

    view.deselect_all();
    assert!(view.state().selected_calendars.is_empty());
    assert!(Preferences::new(&store).load_selected_calendars().found);

    view.select_all();
    assert_eq!(view.state().selected_calendars.len(), 4);
}

#[test]
fn empty_selection_lays_out_nothing_without_fetching() {
    let store = MemoryPreferenceStore::new();
    let mut view = service(&store);
    view.load_calendars();
    view.deselect_all();

    let layout = view.refresh().unwrap();
    assert!(layout.segments.is_empty());
    assert_eq!(layout.row_count, 12);
    assert!(layout.row_heights.iter().all(|height| *height == 72));
    assert_eq!(view.selection_summary(), "No calendars selected");
}

#[test]
fn refresh_fetches_the_selected_calendars() {
    let store = MemoryPreferenceStore::new();
    let mut view = service(&store);
    view.load_calendars();
    view.toggle_calendar("sample-personal");

    let layout = view.refresh().unwrap().clone();

    assert_eq!(view.layout(), Some(&layout));
    assert!(!layout.segments.is_empty());
    assert!(layout
        .segments
        .iter()
        .all(|placed| placed.color != "#22c55e"));
}

#[test]
fn stale_pass_cannot_replace_newer_layout() {
    let store = MemoryPreferenceStore::new();
    let mut view = service(&store);
    view.load_calendars();

    let stale = view.begin_pass();
    let stale_layout = view.compute_pass().unwrap();

    view.set_topology(RowTopology::WeekRows);
    let current = view.begin_pass();
    assert!(current > stale);
    let current_layout = view.compute_pass().unwrap();

    assert!(view.complete_pass(current, current_layout));
    assert!(!view.complete_pass(stale, stale_layout));
    assert_eq!(
        view.layout().map(|layout| layout.topology),
        Some(RowTopology::WeekRows)
    );
}

#[test]
fn year_navigation_is_clamped_to_configured_range() {
    let store = MemoryPreferenceStore::new();
    let config = LayoutConfig {
        year_min: 2000,
        year_max: 2030,
        ..LayoutConfig::default()
    };
    let mut view = YearViewService::new(SampleEventSource::new(), &store, config, 2100);

    assert_eq!(view.state().year, 2030);
    assert_eq!(view.step_year(1), 2030);
    assert_eq!(view.step_year(-5), 2025);
    assert_eq!(view.set_year(1500), 2000);
    assert_eq!(view.step_year(i32::MIN), 2000);
}

#[test]
fn min_duration_adjustments_are_rounded_and_persisted() {
    let store = MemoryPreferenceStore::new();
    let mut view = service(&store);

    assert_eq!(view.adjust_min_duration(-1.0), 0.0);
    assert_eq!(view.adjust_min_duration(0.333), 0.33);
    assert_eq!(view.adjust_min_duration(23.67), 24.0);
    assert_eq!(Preferences::new(&store).load_min_duration_hours(), 24.0);

    let restored = service(&store);
    assert_eq!(restored.state().min_duration_hours, 24.0);
}

#[test]
fn summary_includes_duration_filter_after_refresh() {
    let store = MemoryPreferenceStore::new();
    let mut view = service(&store);
    view.load_calendars();
    view.adjust_min_duration(24.0);

    let layout = view.refresh().unwrap();
    assert_eq!(layout.filter_stats.filtered_out, 2);
    assert_eq!(
        view.selection_summary(),
        "Showing 4 of 4 calendars · Filtered out 2 of 23 events under 24h"
    );
}

#[test]
fn view_mode_is_persisted_and_unknown_modes_are_rejected() {
    let store = MemoryPreferenceStore::new();
    let mut view = service(&store);

    assert_eq!(view.set_view_mode("day-aligned").unwrap(), RowTopology::DayAligned);
    let err = view.set_view_mode("spiral").unwrap_err();
    assert!(matches!(err, LayoutError::UnknownTopology(_)));
    assert_eq!(view.state().topology, RowTopology::DayAligned);

    let restored = service(&store);
    assert_eq!(restored.state().topology, RowTopology::DayAligned);
}

#[test]
fn failing_source_yields_an_empty_layout() {
    let store = MemoryPreferenceStore::new();
    let mut view = YearViewService::new(OfflineSource, &store, LayoutConfig::default(), 2026);
    view.load_calendars();

    let layout = view.refresh().unwrap();
    assert!(layout.segments.is_empty());
    assert_eq!(layout.dropped_records, 0);
    assert_eq!(view.selection_summary(), "Showing 1 of 1 calendars");
}

#[test]
fn every_refresh_goes_back_to_the_source() {
    let store = MemoryPreferenceStore::new();
    let mut view = service(&store);
    view.load_calendars();

    view.refresh().unwrap();
    view.set_all_day_only(true);
    let all_day_segments = view.refresh().unwrap().segments.len();

    assert!(all_day_segments > 0);
    assert_eq!(view_fetches(&view), 2);
}

fn view_fetches(view: &YearViewService<CountingSource, &MemoryPreferenceStore>) -> usize {
    view.source().fetches.get()
}
