//! Layout configuration.
//!
//! # Responsibility
//! - Hold the sizing and safety constants of the layout engine.
//! - Load overrides from JSON and reject unusable values up front.
//!
//! # Invariants
//! - A validated config always has at least one lane, one week row, a
//!   non-empty year range and a non-zero lane spacing.

use crate::layout::heights::RowHeightConfig;
use crate::layout::lanes::DEFAULT_MAX_LANES;
use crate::layout::topology::DEFAULT_WEEK_ROWS_CAP;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Lowest year the view navigates to.
pub const DEFAULT_YEAR_MIN: i32 = 1900;
/// Highest year the view navigates to.
pub const DEFAULT_YEAR_MAX: i32 = 2999;

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(serde_json::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config JSON: {err}"),
            Self::Invalid(message) => write!(f, "invalid layout config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Engine-wide layout constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub row_heights: RowHeightConfig,
    /// Lane-search bound; exceeding it clamps to the last lane.
    pub max_lanes: usize,
    /// Maximum number of 28-day rows in the week-rows topology.
    pub week_rows_cap: usize,
    pub year_min: i32,
    pub year_max: i32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            row_heights: RowHeightConfig::default(),
            max_lanes: DEFAULT_MAX_LANES,
            week_rows_cap: DEFAULT_WEEK_ROWS_CAP,
            year_min: DEFAULT_YEAR_MIN,
            year_max: DEFAULT_YEAR_MAX,
        }
    }
}

impl LayoutConfig {
    /// Parses a (possibly partial) JSON config; missing keys keep defaults.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_lanes == 0 {
            return Err(ConfigError::Invalid("max_lanes must be >= 1".to_string()));
        }
        if self.week_rows_cap == 0 {
            return Err(ConfigError::Invalid(
                "week_rows_cap must be >= 1".to_string(),
            ));
        }
        if self.year_min > self.year_max {
            return Err(ConfigError::Invalid(format!(
                "year_min ({}) must be <= year_max ({})",
                self.year_min, self.year_max
            )));
        }
        if self.row_heights.lane_spacing == 0 {
            return Err(ConfigError::Invalid(
                "row_heights.lane_spacing must be >= 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Clamps `year` into `[year_min, year_max]`.
    pub fn clamp_year(&self, year: i32) -> i32 {
        year.clamp(self.year_min, self.year_max)
    }

    pub fn supports_year(&self, year: i32) -> bool {
        (self.year_min..=self.year_max).contains(&year)
    }
}
