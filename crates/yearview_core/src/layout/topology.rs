//! Row topologies and the per-year grid geometry derived from them.
//!
//! # Responsibility
//! - Name the three supported row/column coordinate schemes.
//! - Map calendar days to `(row, unit)` grid positions and back.
//! - Derive year-level constants (row count, row width) for renderers.
//!
//! # Invariants
//! - Only days inside the target year are ever located on the grid.
//! - Units are 1-based day columns for month rows and 0-based day offsets for
//!   week rows.
//! - Weekday alignment uses Monday-start weeks, matching ISO week numbering.

use super::LayoutError;
use crate::dates::{days_in_month, iso_week_number};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Days covered by one week-rows row (four ISO weeks).
pub const WEEK_ROW_DAYS: u32 = 28;
/// Default upper bound on the number of week rows per year.
pub const DEFAULT_WEEK_ROWS_CAP: usize = 14;
/// Unit width of linear rows (longest month).
pub const LINEAR_ROW_WIDTH: u32 = 31;

/// How lane occupancy is tracked for a topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OccupancyModel {
    /// Per-lane high-water mark; valid for monotonic day ranges per row.
    HighWater,
    /// Explicit per-unit occupancy per lane.
    UnitSet,
}

/// Row/column coordinate scheme of one view mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RowTopology {
    /// One row per month; unit = day of month.
    #[default]
    Linear,
    /// One row per month; unit = weekday offset of the 1st + day of month.
    DayAligned,
    /// Rolling 28-day rows from the Monday on/before January 1st.
    WeekRows,
}

impl RowTopology {
    pub const ALL: [RowTopology; 3] = [Self::Linear, Self::DayAligned, Self::WeekRows];

    /// Stable name used in preferences and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::DayAligned => "day-aligned",
            Self::WeekRows => "week-rows",
        }
    }

    pub fn occupancy_model(self) -> OccupancyModel {
        match self {
            Self::Linear | Self::DayAligned => OccupancyModel::HighWater,
            Self::WeekRows => OccupancyModel::UnitSet,
        }
    }

    /// Whether the renderer shows a weekday header row above the grid.
    pub fn has_header_row(self) -> bool {
        !matches!(self, Self::Linear)
    }
}

impl Display for RowTopology {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts only the names produced by [`RowTopology::as_str`], ignoring
/// surrounding whitespace and ASCII case.
impl FromStr for RowTopology {
    type Err = LayoutError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|topology| value.trim().eq_ignore_ascii_case(topology.as_str()))
            .ok_or_else(|| LayoutError::UnknownTopology(value.to_string()))
    }
}

/// A day's position on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GridPosition {
    pub row: usize,
    pub unit: u32,
}

/// One in-year day cell, for renderers that draw the background grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GridCell {
    pub row: usize,
    pub unit: u32,
    pub date: NaiveDate,
    pub weekend: bool,
}

/// ISO week label anchored on a Monday cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeekLabel {
    pub row: usize,
    pub unit: u32,
    pub week: u32,
}

/// Year-wide column count of the day-aligned topology:
/// the maximum of `weekday offset of the 1st + days in month` over all months.
pub fn day_aligned_width(year: i32) -> u32 {
    (1..=12)
        .filter_map(|month| {
            let first = NaiveDate::from_ymd_opt(year, month, 1)?;
            Some(first.weekday().num_days_from_monday() + days_in_month(year, month))
        })
        .max()
        .unwrap_or(0)
}

/// Grid geometry of one topology for one year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearGrid {
    year: i32,
    topology: RowTopology,
    first_day: NaiveDate,
    last_day: NaiveDate,
    month_offsets: [u32; 12],
    week_origin: NaiveDate,
    row_count: usize,
    row_width: u32,
}

impl YearGrid {
    /// Builds the grid for `year`.
    ///
    /// `week_rows_cap` bounds the week-rows row count; it is ignored by
    /// month-row topologies.
    pub fn new(year: i32, topology: RowTopology, week_rows_cap: usize) -> Result<Self, LayoutError> {
        let (first_day, last_day) = match (
            NaiveDate::from_ymd_opt(year, 1, 1),
            NaiveDate::from_ymd_opt(year, 12, 31),
        ) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(LayoutError::UnsupportedYear(year)),
        };

        let mut month_offsets = [0_u32; 12];
        for (index, offset) in month_offsets.iter_mut().enumerate() {
            let month = index as u32 + 1;
            *offset = NaiveDate::from_ymd_opt(year, month, 1)
                .map_or(0, |first| first.weekday().num_days_from_monday());
        }

        let week_origin =
            first_day - Duration::days(i64::from(first_day.weekday().num_days_from_monday()));
        let span_days = (last_day - week_origin).num_days() as usize + 1;
        let week_rows_needed = span_days.div_ceil(WEEK_ROW_DAYS as usize);

        let (row_count, row_width) = match topology {
            RowTopology::Linear => (12, LINEAR_ROW_WIDTH),
            RowTopology::DayAligned => (12, day_aligned_width(year)),
            RowTopology::WeekRows => {
                if week_rows_needed > week_rows_cap {
                    warn!(
                        "event=grid_build module=layout status=degraded topology={} year={} rows_needed={} rows_cap={}",
                        topology, year, week_rows_needed, week_rows_cap
                    );
                }
                (week_rows_needed.min(week_rows_cap), WEEK_ROW_DAYS)
            }
        };

        Ok(Self {
            year,
            topology,
            first_day,
            last_day,
            month_offsets,
            week_origin,
            row_count,
            row_width,
        })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn topology(&self) -> RowTopology {
        self.topology
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Number of unit columns per row.
    pub fn row_width(&self) -> u32 {
        self.row_width
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first_day
    }

    pub fn last_day(&self) -> NaiveDate {
        self.last_day
    }

    /// Monday on/before January 1st; day 0 of week row 0.
    pub fn week_origin(&self) -> NaiveDate {
        self.week_origin
    }

    /// Monday-start weekday offset of the 1st of a 0-based month.
    pub fn month_offset(&self, month0: usize) -> u32 {
        self.month_offsets.get(month0).copied().unwrap_or(0)
    }

    /// Grid position of an in-year `date`, or `None` outside the grid.
    pub fn locate(&self, date: NaiveDate) -> Option<GridPosition> {
        if date < self.first_day || date > self.last_day {
            return None;
        }
        match self.topology {
            RowTopology::Linear => Some(GridPosition {
                row: date.month0() as usize,
                unit: date.day(),
            }),
            RowTopology::DayAligned => {
                let row = date.month0() as usize;
                Some(GridPosition {
                    row,
                    unit: self.month_offset(row) + date.day(),
                })
            }
            RowTopology::WeekRows => {
                let offset = (date - self.week_origin).num_days() as usize;
                let row = offset / WEEK_ROW_DAYS as usize;
                if row >= self.row_count {
                    return None;
                }
                Some(GridPosition {
                    row,
                    unit: (offset % WEEK_ROW_DAYS as usize) as u32,
                })
            }
        }
    }

    /// In-year date shown at `(row, unit)`, if any.
    pub fn date_at(&self, row: usize, unit: u32) -> Option<NaiveDate> {
        if row >= self.row_count {
            return None;
        }
        let date = match self.topology {
            RowTopology::Linear => NaiveDate::from_ymd_opt(self.year, row as u32 + 1, unit)?,
            RowTopology::DayAligned => {
                let day = unit.checked_sub(self.month_offset(row))?;
                NaiveDate::from_ymd_opt(self.year, row as u32 + 1, day)?
            }
            RowTopology::WeekRows => {
                if unit >= WEEK_ROW_DAYS {
                    return None;
                }
                let offset = row as i64 * i64::from(WEEK_ROW_DAYS) + i64::from(unit);
                self.week_origin + Duration::days(offset)
            }
        };
        (date >= self.first_day && date <= self.last_day).then_some(date)
    }

    /// Every in-year day that has a grid position, in date order.
    pub fn cells(&self) -> Vec<GridCell> {
        self.first_day
            .iter_days()
            .take_while(|date| *date <= self.last_day)
            .filter_map(|date| {
                let position = self.locate(date)?;
                Some(GridCell {
                    row: position.row,
                    unit: position.unit,
                    date,
                    weekend: matches!(date.weekday(), Weekday::Sat | Weekday::Sun),
                })
            })
            .collect()
    }

    /// ISO week labels for every in-year Monday that has a grid position.
    pub fn week_labels(&self) -> Vec<WeekLabel> {
        self.first_day
            .iter_days()
            .take_while(|date| *date <= self.last_day)
            .filter(|date| date.weekday() == Weekday::Mon)
            .filter_map(|date| {
                let position = self.locate(date)?;
                Some(WeekLabel {
                    row: position.row,
                    unit: position.unit,
                    week: iso_week_number(date),
                })
            })
            .collect()
    }
}
