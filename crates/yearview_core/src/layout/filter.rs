//! Calendar-selection and minimum-duration filtering for one layout pass.

use crate::dates::duration_ms;
use crate::model::event::CalendarEvent;
use serde::Serialize;
use std::collections::BTreeSet;

const HOUR_MS: f64 = 60.0 * 60.0 * 1000.0;

/// Outcome of the minimum-duration filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FilterStats {
    /// Events removed for being shorter than the threshold.
    pub filtered_out: usize,
    /// Events considered by the duration filter.
    pub total: usize,
    pub threshold_hours: f64,
    /// Threshold > 0 and at least one event was considered.
    pub active: bool,
}

impl FilterStats {
    /// `Filtered out N of M events under Xh`, `No events under Xh`, or `None`
    /// when the filter is inactive.
    pub fn summary(&self) -> Option<String> {
        if !self.active || self.total == 0 {
            return None;
        }
        let hours = format_hours(self.threshold_hours);
        if self.filtered_out > 0 {
            Some(format!(
                "Filtered out {} of {} events under {}h",
                self.filtered_out, self.total, hours
            ))
        } else {
            Some(format!("No events under {hours}h"))
        }
    }
}

fn format_hours(hours: f64) -> String {
    let hours = if hours.is_finite() { hours } else { 0.0 };
    if hours.fract() == 0.0 {
        return format!("{hours:.0}");
    }
    let fixed = format!("{hours:.2}");
    fixed.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Sanitizes a user-entered threshold: negative or NaN becomes 0.
pub fn normalize_threshold_hours(hours: f64) -> f64 {
    if hours.is_nan() || hours < 0.0 {
        0.0
    } else {
        hours
    }
}

/// Keeps events whose calendar is selected.
///
/// `None` selects everything; events without a calendar ID are always kept.
pub fn filter_by_calendar(
    events: Vec<CalendarEvent>,
    selection: Option<&BTreeSet<String>>,
) -> Vec<CalendarEvent> {
    let Some(selection) = selection else {
        return events;
    };
    events
        .into_iter()
        .filter(|event| {
            event
                .calendar_id
                .as_ref()
                .map_or(true, |id| selection.contains(id))
        })
        .collect()
}

/// Keeps events lasting at least `min_hours` (see `dates::duration_ms`).
pub fn filter_by_min_duration(
    events: Vec<CalendarEvent>,
    min_hours: f64,
) -> (Vec<CalendarEvent>, FilterStats) {
    let threshold_hours = normalize_threshold_hours(min_hours);
    let total = events.len();
    let kept: Vec<CalendarEvent> = if threshold_hours > 0.0 {
        let min_ms = threshold_hours * HOUR_MS;
        events
            .into_iter()
            .filter(|event| duration_ms(event) as f64 >= min_ms)
            .collect()
    } else {
        events
    };
    let stats = FilterStats {
        filtered_out: total - kept.len(),
        total,
        threshold_hours,
        active: threshold_hours > 0.0 && total > 0,
    };
    (kept, stats)
}
