//! Row sizing from lane occupancy.
//!
//! Header rows (day-aligned, week-rows) are content-sized by the renderer and
//! never pass through this formula.

use serde::{Deserialize, Serialize};

/// Size constants shared by every topology, in layout units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RowHeightConfig {
    /// Minimum row size; also the size of rows without events.
    pub base_unit: u32,
    /// Size needed to show the first lane.
    pub first_lane_offset: u32,
    /// Extra size per additional lane.
    pub lane_spacing: u32,
}

impl Default for RowHeightConfig {
    fn default() -> Self {
        Self {
            base_unit: 72,
            first_lane_offset: 55,
            lane_spacing: 26,
        }
    }
}

/// `max(base_unit, first_lane_offset + (lane_count - 1) * lane_spacing)`,
/// or `base_unit` for an empty row.
pub fn row_height(lane_count: usize, config: &RowHeightConfig) -> u32 {
    if lane_count == 0 {
        return config.base_unit;
    }
    let extra_lanes = u32::try_from(lane_count - 1).unwrap_or(u32::MAX);
    let needed = config
        .first_lane_offset
        .saturating_add(extra_lanes.saturating_mul(config.lane_spacing));
    needed.max(config.base_unit)
}

/// Applies [`row_height`] to every row.
pub fn row_heights(lane_counts: &[usize], config: &RowHeightConfig) -> Vec<u32> {
    lane_counts
        .iter()
        .map(|&count| row_height(count, config))
        .collect()
}
