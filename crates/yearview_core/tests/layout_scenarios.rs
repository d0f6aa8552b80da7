use chrono::{NaiveDate, NaiveDateTime};
use yearview_core::dates::{duration_ms, iso_week_number};
use yearview_core::layout::topology::day_aligned_width;
use yearview_core::{
    compute_layout, compute_layout_for_mode, layout_raw_events, CalendarEvent, LayoutConfig,
    LayoutError, LayoutOptions, RawEvent, RowTopology,
};

fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|date| date.and_hms_opt(h, 0, 0))
        .expect("valid test date")
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
}

fn layout(topology: RowTopology, events: &[CalendarEvent]) -> yearview_core::YearLayout {
    compute_layout(
        2026,
        topology,
        events,
        &LayoutOptions::default(),
        &LayoutConfig::default(),
    )
    .expect("layout should succeed")
}

#[test]
fn earlier_start_takes_lane_zero_in_linear_march() {
    let short = CalendarEvent::new("short", "Stand-up", at(2026, 3, 1, 9), at(2026, 3, 1, 10));
    let long = CalendarEvent::new("long", "Overnight", at(2026, 3, 1, 8), at(2026, 3, 2, 8));

    let result = layout(RowTopology::Linear, &[short, long]);

    assert_eq!(result.segments.len(), 2);
    assert!(result.segments.iter().all(|p| p.segment.row_index == 2));
    assert_eq!(result.lane_of("long"), Some(0));
    assert_eq!(result.lane_of("short"), Some(1));

    let short_segment = &result.segments[1].segment;
    assert_eq!(short_segment.source_event_id, "short");
    assert_eq!((short_segment.start_unit, short_segment.end_unit), (1, 1));
    let long_segment = &result.segments[0].segment;
    assert_eq!((long_segment.start_unit, long_segment.end_unit), (1, 2));

    assert_eq!(result.row_heights[2], 81);
    assert_eq!(result.row_heights[0], 72);
}

#[test]
fn year_end_event_is_truncated_in_week_rows() {
    let event = CalendarEvent::new("ny", "New Year", at(2026, 12, 28, 0), at(2027, 1, 3, 0))
        .into_all_day();

    let result = layout(RowTopology::WeekRows, &[event]);

    assert_eq!(result.segments.len(), 1);
    let segment = &result.segments[0].segment;
    assert_eq!(segment.row_index, 13);
    assert_eq!((segment.start_unit, segment.end_unit), (0, 3));
    assert!(!segment.continues_from_prior_row);
    assert!(!segment.continues_to_next_row);
    assert_eq!(result.row_count, 14);
    assert_eq!(result.row_width, 28);
}

#[test]
fn month_rows_flag_continuations_across_years() {
    let handover = CalendarEvent::new(
        "handover",
        "Year handover",
        at(2025, 12, 29, 0),
        at(2026, 1, 10, 0),
    );
    let new_year =
        CalendarEvent::new("ny", "New Year", at(2026, 12, 31, 0), at(2027, 1, 3, 0)).into_all_day();

    let result = layout(RowTopology::Linear, &[handover, new_year]);

    let first = &result.segments[0].segment;
    assert_eq!(first.source_event_id, "handover");
    assert_eq!((first.row_index, first.start_unit, first.end_unit), (0, 1, 9));
    assert!(first.continues_from_prior_row);
    assert!(!first.continues_to_next_row);

    let last = &result.segments[1].segment;
    assert_eq!((last.row_index, last.start_unit, last.end_unit), (11, 31, 31));
    assert!(!last.continues_from_prior_row);
    assert!(last.continues_to_next_row);
}

#[test]
fn multi_month_event_splits_per_row_with_flags() {
    let event = CalendarEvent::new("m", "Memorial", at(2026, 5, 20, 0), at(2026, 6, 4, 0))
        .into_all_day();

    let result = layout(RowTopology::Linear, &[event]);
    let segments: Vec<_> = result.segments.iter().map(|p| &p.segment).collect();

    assert_eq!(segments.len(), 2);
    assert_eq!((segments[0].row_index, segments[0].start_unit, segments[0].end_unit), (4, 20, 31));
    assert!(segments[0].continues_to_next_row && !segments[0].continues_from_prior_row);
    assert_eq!((segments[1].row_index, segments[1].start_unit, segments[1].end_unit), (5, 1, 3));
    assert!(segments[1].continues_from_prior_row && !segments[1].continues_to_next_row);
}

#[test]
fn day_aligned_units_include_weekday_offset() {
    // 2026-01-01 is a Thursday: Monday-based offset 3.
    let event = CalendarEvent::new("a", "New Year's Day", at(2026, 1, 1, 0), at(2026, 1, 2, 0))
        .into_all_day();

    let result = layout(RowTopology::DayAligned, &[event]);

    let segment = &result.segments[0].segment;
    assert_eq!((segment.row_index, segment.start_unit, segment.end_unit), (0, 4, 4));
    assert_eq!(result.row_width, day_aligned_width(2026));
    assert!(result.header_row);
}

#[test]
fn same_day_timed_event_occupies_one_unit_everywhere() {
    let event = CalendarEvent::new("t", "Review", at(2026, 2, 12, 9), at(2026, 2, 12, 13));
    for topology in RowTopology::ALL {
        let result = layout(topology, &[event.clone()]);
        assert_eq!(result.segments.len(), 1, "{topology}");
        let segment = &result.segments[0].segment;
        assert_eq!(segment.start_unit, segment.end_unit, "{topology}");
    }
}

#[test]
fn events_outside_year_produce_nothing() {
    let before = CalendarEvent::new("b", "old", at(2025, 6, 1, 0), at(2025, 6, 3, 0));
    // Exclusive midnight end on Jan 1 keeps the whole event in 2025.
    let edge =
        CalendarEvent::new("e", "edge", at(2025, 12, 31, 0), at(2026, 1, 1, 0)).into_all_day();
    for topology in RowTopology::ALL {
        let result = layout(topology, &[before.clone(), edge.clone()]);
        assert!(result.segments.is_empty(), "{topology}");
    }
}

#[test]
fn all_day_duration_and_iso_week_laws() {
    let freeze = CalendarEvent::new("f", "Release freeze", at(2026, 3, 4, 0), at(2026, 3, 8, 0))
        .into_all_day();
    assert_eq!(duration_ms(&freeze), 4 * 86_400_000);
    assert_eq!(iso_week_number(date(2026, 1, 1)), 1);
    assert_eq!(iso_week_number(date(2025, 12, 29)), 1);
    assert_eq!(iso_week_number(date(2024, 1, 1)), 1);
}

#[test]
fn week_labels_mark_every_monday_of_the_year() {
    let options = LayoutOptions {
        show_week_numbers: true,
        ..LayoutOptions::default()
    };
    let result = compute_layout(2026, RowTopology::Linear, &[], &options, &LayoutConfig::default())
        .unwrap();

    assert_eq!(result.week_labels.len(), 52);
    let first = result.week_labels[0];
    assert_eq!((first.row, first.unit, first.week), (0, 5, 2));

    let hidden = layout(RowTopology::Linear, &[]);
    assert!(hidden.week_labels.is_empty());
}

#[test]
fn unknown_view_mode_is_fatal() {
    let err = compute_layout_for_mode(
        2026,
        "spiral",
        &[],
        &LayoutOptions::default(),
        &LayoutConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, LayoutError::UnknownTopology(ref name) if name == "spiral"));
    assert!(err.to_string().contains("spiral"));
}

#[test]
fn raw_records_are_normalized_and_counted() {
    let raw: Vec<RawEvent> = serde_json::from_value(serde_json::json!([
        { "id": "a", "title": "Freeze", "startDate": "20260304", "endDate": "20260308", "isAllDay": true },
        { "id": "b", "start": "not a date", "end": "20260308" },
        { "id": "c", "title": "Sync", "start": "20260304T090000", "end": "20260304T100000" }
    ]))
    .unwrap();

    let result = layout_raw_events(
        2026,
        RowTopology::Linear,
        &raw,
        &LayoutOptions::default(),
        &LayoutConfig::default(),
    )
    .unwrap();

    assert_eq!(result.dropped_records, 1);
    assert_eq!(result.segments.len(), 2);
    let freeze = &result.segments[0];
    assert_eq!(freeze.title, "Freeze");
    assert!(freeze.all_day);
    assert_eq!((freeze.segment.start_unit, freeze.segment.end_unit), (4, 7));
    assert_eq!(result.lane_of("c"), Some(1));
}

#[test]
fn min_duration_filter_reports_stats() {
    let short = CalendarEvent::new("s", "short", at(2026, 4, 1, 9), at(2026, 4, 1, 10));
    let long = CalendarEvent::new("l", "long", at(2026, 4, 1, 0), at(2026, 4, 3, 0));
    let options = LayoutOptions {
        min_duration_hours: 2.0,
        ..LayoutOptions::default()
    };

    let result = compute_layout(
        2026,
        RowTopology::Linear,
        &[short, long],
        &options,
        &LayoutConfig::default(),
    )
    .unwrap();

    assert_eq!(result.segments.len(), 1);
    assert_eq!(
        result.filter_stats.summary().as_deref(),
        Some("Filtered out 1 of 2 events under 2h")
    );
}

#[test]
fn lane_exhaustion_clamps_and_counts() {
    let config = LayoutConfig {
        max_lanes: 2,
        ..LayoutConfig::default()
    };
    let events: Vec<CalendarEvent> = (0..4)
        .map(|i| CalendarEvent::new(format!("e{i}"), "busy", at(2026, 7, 1, 9), at(2026, 7, 1, 10)))
        .collect();

    let result = compute_layout(
        2026,
        RowTopology::Linear,
        &events,
        &LayoutOptions::default(),
        &config,
    )
    .unwrap();

    assert_eq!(result.segments.len(), 4);
    assert_eq!(result.degraded_events, 2);
    assert!(result.segments.iter().all(|p| p.lane < 2));
    assert_eq!(result.row_heights[6], 81);
}
