//! Calendar provenance metadata.

use serde::{Deserialize, Serialize};

/// Label shown for calendars that carry no usable name.
pub const UNNAMED_CALENDAR: &str = "(unnamed)";

/// One calendar exposed by an event source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarInfo {
    /// Source-defined stable calendar ID.
    pub id: String,
    /// Display name; may be blank in source data.
    #[serde(default)]
    pub name: String,
    /// CSS-style colour (`#rrggbb` in practice).
    #[serde(default)]
    pub color: Option<String>,
}

impl CalendarInfo {
    pub fn new(id: impl Into<String>, name: impl Into<String>, color: Option<&str>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: color.map(str::to_string),
        }
    }

    /// Returns the name to display, substituting a placeholder for blanks.
    pub fn display_name(&self) -> &str {
        let trimmed = self.name.trim();
        if trimmed.is_empty() {
            UNNAMED_CALENDAR
        } else {
            trimmed
        }
    }
}
