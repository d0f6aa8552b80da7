//! Greedy lane packing across all segments of an event.
//!
//! # Responsibility
//! - Assign each event one lane, shared by every segment it produced.
//! - Track per-row, per-lane occupancy in the representation the topology
//!   requires.
//!
//! # Invariants
//! - A lane choice is atomic: every segment of the event fits that lane or the
//!   next lane is tried for all of them.
//! - Two segments in the same row and lane never share a unit, except for
//!   events clamped after lane-search exhaustion.
//! - Lane search never runs past `max_lanes`.

use super::split::Segment;
use super::topology::OccupancyModel;
use log::warn;

/// Default bound on lane search.
pub const DEFAULT_MAX_LANES: usize = 50;

/// Per-row, per-lane occupancy bookkeeping.
pub trait LaneOccupancy {
    /// Whether `segment` can be placed in `lane` of its row.
    fn fits(&self, lane: usize, segment: &Segment) -> bool;
    /// Marks the units of `segment` as occupied in `lane` of its row.
    fn occupy(&mut self, lane: usize, segment: &Segment);
    /// Number of lanes in use per row (highest used lane + 1).
    fn lane_counts(&self) -> Vec<usize>;
}

/// High-water occupancy: last occupied unit per lane.
///
/// Valid when segments are placed in ascending start order within each row.
#[derive(Debug, Clone, Default)]
pub struct HighWaterLanes {
    rows: Vec<Vec<Option<u32>>>,
}

impl HighWaterLanes {
    pub fn new(row_count: usize) -> Self {
        Self {
            rows: vec![Vec::new(); row_count],
        }
    }
}

impl LaneOccupancy for HighWaterLanes {
    fn fits(&self, lane: usize, segment: &Segment) -> bool {
        let high_water = self
            .rows
            .get(segment.row_index)
            .and_then(|lanes| lanes.get(lane))
            .copied()
            .flatten();
        match high_water {
            Some(end) => end < segment.start_unit,
            None => true,
        }
    }

    fn occupy(&mut self, lane: usize, segment: &Segment) {
        let Some(lanes) = self.rows.get_mut(segment.row_index) else {
            return;
        };
        if lanes.len() <= lane {
            lanes.resize(lane + 1, None);
        }
        let slot = &mut lanes[lane];
        *slot = Some(slot.map_or(segment.end_unit, |end| end.max(segment.end_unit)));
    }

    fn lane_counts(&self) -> Vec<usize> {
        self.rows.iter().map(Vec::len).collect()
    }
}

/// Explicit occupancy: one unit bitmap per lane.
#[derive(Debug, Clone, Default)]
pub struct UnitSetLanes {
    rows: Vec<Vec<UnitMask>>,
}

impl UnitSetLanes {
    pub fn new(row_count: usize) -> Self {
        Self {
            rows: vec![Vec::new(); row_count],
        }
    }
}

impl LaneOccupancy for UnitSetLanes {
    fn fits(&self, lane: usize, segment: &Segment) -> bool {
        self.rows
            .get(segment.row_index)
            .and_then(|lanes| lanes.get(lane))
            .map_or(true, |mask| {
                !mask.any_in(segment.start_unit, segment.end_unit)
            })
    }

    fn occupy(&mut self, lane: usize, segment: &Segment) {
        let Some(lanes) = self.rows.get_mut(segment.row_index) else {
            return;
        };
        if lanes.len() <= lane {
            lanes.resize_with(lane + 1, UnitMask::default);
        }
        lanes[lane].set_range(segment.start_unit, segment.end_unit);
    }

    fn lane_counts(&self) -> Vec<usize> {
        self.rows.iter().map(Vec::len).collect()
    }
}

/// Growable unit bitmap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct UnitMask {
    words: Vec<u64>,
}

impl UnitMask {
    fn contains(&self, unit: u32) -> bool {
        let (word, bit) = (unit as usize / 64, unit % 64);
        self.words.get(word).is_some_and(|w| w & (1 << bit) != 0)
    }

    fn any_in(&self, first: u32, last: u32) -> bool {
        (first..=last).any(|unit| self.contains(unit))
    }

    fn set_range(&mut self, first: u32, last: u32) {
        for unit in first..=last {
            let (word, bit) = (unit as usize / 64, unit % 64);
            if self.words.len() <= word {
                self.words.resize(word + 1, 0);
            }
            self.words[word] |= 1 << bit;
        }
    }
}

/// Occupancy table selected by topology.
#[derive(Debug, Clone)]
pub enum LaneTable {
    HighWater(HighWaterLanes),
    UnitSet(UnitSetLanes),
}

impl LaneTable {
    pub fn new(model: OccupancyModel, row_count: usize) -> Self {
        match model {
            OccupancyModel::HighWater => Self::HighWater(HighWaterLanes::new(row_count)),
            OccupancyModel::UnitSet => Self::UnitSet(UnitSetLanes::new(row_count)),
        }
    }
}

impl LaneOccupancy for LaneTable {
    fn fits(&self, lane: usize, segment: &Segment) -> bool {
        match self {
            Self::HighWater(lanes) => lanes.fits(lane, segment),
            Self::UnitSet(lanes) => lanes.fits(lane, segment),
        }
    }

    fn occupy(&mut self, lane: usize, segment: &Segment) {
        match self {
            Self::HighWater(lanes) => lanes.occupy(lane, segment),
            Self::UnitSet(lanes) => lanes.occupy(lane, segment),
        }
    }

    fn lane_counts(&self) -> Vec<usize> {
        match self {
            Self::HighWater(lanes) => lanes.lane_counts(),
            Self::UnitSet(lanes) => lanes.lane_counts(),
        }
    }
}

/// Outcome of placing one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanePlacement {
    pub lane: usize,
    /// Set when lane search was exhausted and the event was forced into the
    /// last lane.
    pub clamped: bool,
}

/// Greedy interval colouring over an occupancy table.
#[derive(Debug, Clone)]
pub struct LanePacker<O: LaneOccupancy> {
    occupancy: O,
    max_lanes: usize,
    clamped_events: usize,
}

impl<O: LaneOccupancy> LanePacker<O> {
    /// `max_lanes` is raised to at least one lane.
    pub fn new(occupancy: O, max_lanes: usize) -> Self {
        Self {
            occupancy,
            max_lanes: max_lanes.max(1),
            clamped_events: 0,
        }
    }

    /// Places all segments of one event into the lowest lane they all fit.
    pub fn place(&mut self, event_id: &str, segments: &[Segment]) -> LanePlacement {
        let found = (0..self.max_lanes).find(|&lane| {
            segments
                .iter()
                .all(|segment| self.occupancy.fits(lane, segment))
        });

        let placement = match found {
            Some(lane) => LanePlacement {
                lane,
                clamped: false,
            },
            None => {
                self.clamped_events += 1;
                warn!(
                    "event=lane_search module=layout status=degraded event_id={} max_lanes={}",
                    event_id, self.max_lanes
                );
                LanePlacement {
                    lane: self.max_lanes - 1,
                    clamped: true,
                }
            }
        };

        for segment in segments {
            self.occupancy.occupy(placement.lane, segment);
        }
        placement
    }

    /// Number of events forced into the last lane so far.
    pub fn clamped_events(&self) -> usize {
        self.clamped_events
    }

    pub fn lane_counts(&self) -> Vec<usize> {
        self.occupancy.lane_counts()
    }
}
