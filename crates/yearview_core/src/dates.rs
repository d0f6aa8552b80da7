//! Pure date and duration helpers shared by the layout engine.
//!
//! # Responsibility
//! - Decide whether a span is an all-day span.
//! - Convert exclusive all-day ends into the last included day.
//! - Compute durations and ISO-8601 week numbers.
//!
//! # Invariants
//! - All arithmetic is local wall-clock arithmetic; no timezone is applied.
//! - Every helper is total: missing inputs yield `false`/`0`, never a panic.

use crate::model::event::CalendarEvent;
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};

/// Milliseconds in one civil day.
pub const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Returns whether `value` is exactly local midnight, down to the nanosecond.
pub fn is_local_midnight(value: NaiveDateTime) -> bool {
    value.time() == NaiveTime::MIN
}

/// All-day detection over possibly missing bounds.
///
/// True when `flagged`, or when both bounds are local midnights and the span
/// is an exact multiple of 24h. Missing bounds yield `flagged`.
pub fn span_is_all_day(
    flagged: bool,
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
) -> bool {
    if flagged {
        return true;
    }
    let (Some(start), Some(end)) = (start, end) else {
        return false;
    };
    is_local_midnight(start)
        && is_local_midnight(end)
        && (end - start).num_milliseconds() % DAY_MS == 0
}

/// All-day detection for a canonical event.
pub fn is_all_day(event: &CalendarEvent) -> bool {
    span_is_all_day(event.is_all_day, Some(event.start), Some(event.end))
}

/// Treats a midnight `end` as exclusive and returns the last included day.
///
/// Non-midnight values are returned unchanged.
pub fn inclusive_end(end: NaiveDateTime) -> NaiveDateTime {
    if is_local_midnight(end) {
        end - Duration::days(1)
    } else {
        end
    }
}

/// End used for placement: inclusive for all-day events, raw otherwise.
pub fn effective_end(event: &CalendarEvent) -> NaiveDateTime {
    if is_all_day(event) {
        inclusive_end(event.end)
    } else {
        event.end
    }
}

/// Duration over possibly missing bounds, in milliseconds.
pub fn span_duration_ms(
    flagged_all_day: bool,
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
) -> i64 {
    let (Some(start), Some(end)) = (start, end) else {
        return 0;
    };
    if span_is_all_day(flagged_all_day, Some(start), Some(end)) {
        (inclusive_end(end) - start).num_milliseconds() + DAY_MS
    } else {
        (end - start).num_milliseconds()
    }
}

/// Duration of a canonical event in milliseconds.
///
/// All-day events count whole included days: `inclusive_end + 1 day - start`.
pub fn duration_ms(event: &CalendarEvent) -> i64 {
    span_duration_ms(event.is_all_day, Some(event.start), Some(event.end))
}

/// ISO-8601 week number (Monday weeks, week 1 holds the first Thursday).
///
/// Shifts the date to the Thursday of its week and counts weeks from that
/// Thursday's January 1st.
pub fn iso_week_number(date: NaiveDate) -> u32 {
    let day_num = i64::from(date.weekday().number_from_monday());
    let thursday = date + Duration::days(4 - day_num);
    let Some(year_start) = NaiveDate::from_ymd_opt(thursday.year(), 1, 1) else {
        return date.iso_week().week();
    };
    let day_index = (thursday - year_start).num_days() + 1;
    // Ceiling division; `day_index` is always in 1..=366.
    ((day_index + 6) / 7) as u32
}

/// Number of days in a 1-based `month` of `year`; 0 for invalid input.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return 0;
    };
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    next.map_or(0, |next| (next - first).num_days() as u32)
}

/// First and last representable instants of `year`:
/// `Jan 1 00:00:00.000` and `Dec 31 23:59:59.999`.
pub fn year_bounds(year: i32) -> Option<(NaiveDateTime, NaiveDateTime)> {
    let first = NaiveDate::from_ymd_opt(year, 1, 1)?.and_time(NaiveTime::MIN);
    let last = NaiveDate::from_ymd_opt(year, 12, 31)?.and_hms_milli_opt(23, 59, 59, 999)?;
    Some((first, last))
}

#[cfg(test)]
mod tests {
    use super::{
        days_in_month, duration_ms, inclusive_end, is_all_day, is_local_midnight,
        iso_week_number, span_duration_ms, span_is_all_day, year_bounds, DAY_MS,
    };
    use crate::model::event::CalendarEvent;
    use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|date| date.and_hms_opt(h, min, 0))
            .expect("valid test date")
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
    }

    #[test]
    fn midnight_whole_day_span_is_all_day_without_flag() {
        let event = CalendarEvent::new("a", "span", at(2026, 3, 4, 0, 0), at(2026, 3, 8, 0, 0));
        assert!(is_all_day(&event));
    }

    #[test]
    fn partial_day_span_is_not_all_day() {
        let event = CalendarEvent::new("a", "t", at(2026, 3, 4, 0, 0), at(2026, 3, 4, 12, 0));
        assert!(!is_all_day(&event));

        let shifted = CalendarEvent::new("b", "t", at(2026, 3, 4, 9, 0), at(2026, 3, 5, 9, 0));
        assert!(!is_all_day(&shifted));
    }

    #[test]
    fn missing_bounds_are_not_all_day_unless_flagged() {
        assert!(!span_is_all_day(false, None, Some(at(2026, 1, 1, 0, 0))));
        assert!(!span_is_all_day(false, None, None));
        assert!(span_is_all_day(true, None, None));
    }

    #[test]
    fn inclusive_end_only_moves_midnight_values() {
        assert_eq!(inclusive_end(at(2026, 3, 8, 0, 0)), at(2026, 3, 7, 0, 0));
        assert_eq!(inclusive_end(at(2026, 3, 8, 10, 30)), at(2026, 3, 8, 10, 30));
        assert_eq!(inclusive_end(at(2026, 1, 1, 0, 0)), at(2025, 12, 31, 0, 0));
    }

    #[test]
    fn fractional_second_past_midnight_is_not_midnight() {
        let half_second = date(2026, 3, 8)
            .and_hms_milli_opt(0, 0, 0, 500)
            .expect("valid test time");
        assert!(!is_local_midnight(half_second));
        assert_eq!(inclusive_end(half_second), half_second);
        assert!(!span_is_all_day(false, Some(at(2026, 3, 7, 0, 0)), Some(half_second)));
        assert!(is_local_midnight(at(2026, 3, 8, 0, 0)));
    }

    #[test]
    fn all_day_duration_counts_included_days() {
        let event = CalendarEvent::new("a", "freeze", at(2026, 3, 4, 0, 0), at(2026, 3, 8, 0, 0))
            .into_all_day();
        assert_eq!(duration_ms(&event), 4 * 86_400_000);
    }

    #[test]
    fn flagged_all_day_with_non_midnight_end_counts_through_end_day() {
        let event = CalendarEvent::new("a", "odd", at(2026, 3, 4, 0, 0), at(2026, 3, 4, 12, 0))
            .into_all_day();
        assert_eq!(duration_ms(&event), 12 * 60 * 60 * 1000 + DAY_MS);
    }

    #[test]
    fn timed_duration_is_plain_difference() {
        let event = CalendarEvent::new("a", "t", at(2026, 3, 1, 8, 0), at(2026, 3, 2, 8, 0));
        // 24h exact but starts at 08:00, so not all-day.
        assert_eq!(duration_ms(&event), DAY_MS);
        assert_eq!(span_duration_ms(false, None, Some(at(2026, 1, 1, 0, 0))), 0);
    }

    #[test]
    fn iso_week_matches_reference_cases() {
        assert_eq!(iso_week_number(date(2026, 1, 1)), 1);
        assert_eq!(iso_week_number(date(2025, 12, 29)), 1);
        assert_eq!(iso_week_number(date(2024, 1, 1)), 1);
        assert_eq!(iso_week_number(date(2021, 1, 3)), 53);
        assert_eq!(iso_week_number(date(2020, 12, 31)), 53);
    }

    #[test]
    fn iso_week_agrees_with_chrono_over_several_years() {
        let mut day = date(1999, 12, 1);
        let end = date(2031, 1, 31);
        while day <= end {
            assert_eq!(iso_week_number(day), day.iso_week().week(), "mismatch at {day}");
            day = day.succ_opt().expect("next day");
        }
    }

    #[test]
    fn days_in_month_handles_leap_years() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2026, 2), 28);
        assert_eq!(days_in_month(2026, 12), 31);
        assert_eq!(days_in_month(2026, 13), 0);
    }

    #[test]
    fn year_bounds_cover_whole_year() {
        let (first, last) = year_bounds(2026).unwrap();
        assert_eq!(first, at(2026, 1, 1, 0, 0));
        assert_eq!(last.date(), date(2026, 12, 31));
        assert_eq!(last.nanosecond() / 1_000_000, 999);
    }
}
