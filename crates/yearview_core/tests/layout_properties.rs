use std::collections::BTreeMap;
use yearview_core::layout::heights::row_height;
use yearview_core::layout::split::clip_to_year;
use yearview_core::{
    compute_layout, normalize_batch, CalendarEvent, EventSource, FetchOptions, LayoutConfig,
    LayoutOptions, RowTopology, SampleEventSource, YearLayout,
};

const YEAR: i32 = 2026;

fn sample_events() -> Vec<CalendarEvent> {
    let raw = SampleEventSource::new()
        .fetch_events(YEAR, &FetchOptions::default())
        .expect("sample source never fails");
    let report = normalize_batch(&raw);
    assert_eq!(report.dropped, 0);
    report.events
}

fn layout_of(topology: RowTopology, events: &[CalendarEvent]) -> YearLayout {
    compute_layout(
        YEAR,
        topology,
        events,
        &LayoutOptions::default(),
        &LayoutConfig::default(),
    )
    .expect("layout should succeed")
}

#[test]
fn identical_inputs_give_identical_layouts() {
    let events = sample_events();
    for topology in RowTopology::ALL {
        let first = layout_of(topology, &events);
        let second = layout_of(topology, &events);
        assert_eq!(first, second, "{topology}");
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}

#[test]
fn input_order_does_not_change_the_layout() {
    let events = sample_events();
    let mut reversed = events.clone();
    reversed.reverse();
    let mut rotated = events.clone();
    rotated.rotate_left(7);

    for topology in RowTopology::ALL {
        let expected = layout_of(topology, &events);
        assert_eq!(layout_of(topology, &reversed), expected, "{topology}");
        assert_eq!(layout_of(topology, &rotated), expected, "{topology}");
    }
}

#[test]
fn segments_in_the_same_lane_never_overlap() {
    let events = sample_events();
    for topology in RowTopology::ALL {
        let layout = layout_of(topology, &events);
        assert_eq!(layout.degraded_events, 0);
        for (i, a) in layout.segments.iter().enumerate() {
            for b in &layout.segments[i + 1..] {
                if a.lane == b.lane {
                    assert!(
                        !a.segment.overlaps(&b.segment),
                        "{topology}: {} and {} collide in lane {}",
                        a.segment.source_event_id,
                        b.segment.source_event_id,
                        a.lane
                    );
                }
            }
        }
    }
}

#[test]
fn every_segment_of_an_event_shares_one_lane() {
    let events = sample_events();
    for topology in RowTopology::ALL {
        let layout = layout_of(topology, &events);
        let mut lanes: BTreeMap<&str, usize> = BTreeMap::new();
        for placed in &layout.segments {
            let lane = *lanes
                .entry(placed.segment.source_event_id.as_str())
                .or_insert(placed.lane);
            assert_eq!(lane, placed.lane, "{topology}");
        }
    }
}

#[test]
fn events_touching_the_year_are_covered_and_others_are_not() {
    let events = sample_events();
    for topology in RowTopology::ALL {
        let layout = layout_of(topology, &events);
        for event in &events {
            let visible = clip_to_year(YEAR, event).is_some();
            assert_eq!(
                layout.lane_of(&event.id).is_some(),
                visible,
                "{topology}: {}",
                event.id
            );
        }
    }
}

#[test]
fn segments_stay_inside_row_bounds() {
    let events = sample_events();
    for topology in RowTopology::ALL {
        let layout = layout_of(topology, &events);
        for placed in &layout.segments {
            let segment = &placed.segment;
            assert!(segment.row_index < layout.row_count, "{topology}");
            assert!(segment.start_unit <= segment.end_unit, "{topology}");
            assert!(segment.end_unit <= layout.row_width, "{topology}");
        }
    }
}

#[test]
fn row_heights_follow_lane_usage() {
    let events = sample_events();
    let config = LayoutConfig::default();
    for topology in RowTopology::ALL {
        let layout = layout_of(topology, &events);
        assert_eq!(layout.row_heights.len(), layout.row_count);
        for (row, height) in layout.row_heights.iter().enumerate() {
            let lanes = layout
                .segments_in_row(row)
                .map(|placed| placed.lane + 1)
                .max()
                .unwrap_or(0);
            assert_eq!(*height, row_height(lanes, &config.row_heights), "{topology} row {row}");
            assert!(*height >= 72);
        }
    }
}

#[test]
fn calendar_selection_limits_placed_events() {
    let events = sample_events();
    let options = LayoutOptions {
        calendar_ids: Some(["sample-holidays".to_string()].into_iter().collect()),
        ..LayoutOptions::default()
    };
    let layout = compute_layout(
        YEAR,
        RowTopology::Linear,
        &events,
        &options,
        &LayoutConfig::default(),
    )
    .unwrap();

    let holiday_ids: Vec<&str> = events
        .iter()
        .filter(|event| event.calendar_id.as_deref() == Some("sample-holidays"))
        .map(|event| event.id.as_str())
        .collect();
    assert!(!holiday_ids.is_empty());
    assert!(layout
        .segments
        .iter()
        .all(|placed| holiday_ids.contains(&placed.segment.source_event_id.as_str())));
    assert!(layout.segments.iter().all(|placed| placed.color == "#ef4444"
        && placed.background == "rgba(239, 68, 68, 0.25)"
        && placed.border == "rgba(239, 68, 68, 0.6)"));
}

#[test]
fn day_long_threshold_drops_only_short_sample_events() {
    let events = sample_events();
    let options = LayoutOptions {
        min_duration_hours: 24.0,
        ..LayoutOptions::default()
    };
    let layout = compute_layout(
        YEAR,
        RowTopology::WeekRows,
        &events,
        &options,
        &LayoutConfig::default(),
    )
    .unwrap();

    let stats = layout.filter_stats;
    assert!(stats.active);
    assert_eq!(stats.total, events.len());
    assert_eq!(stats.filtered_out, 2);
    assert_eq!(
        stats.summary().as_deref(),
        Some("Filtered out 2 of 23 events under 24h")
    );
}
