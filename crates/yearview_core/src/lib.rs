//! Core domain logic for the year-calendar view.
//! Turns calendar events into lane-packed bar segments for one year under a
//! chosen row topology.

pub mod config;
pub mod dates;
pub mod db;
pub mod ingest;
pub mod layout;
pub mod logging;
pub mod model;
pub mod prefs;
pub mod service;
pub mod source;

pub use config::{ConfigError, LayoutConfig};
pub use ingest::ics::parse_vevent;
pub use ingest::normalize::{normalize_batch, NormalizeReport};
pub use layout::filter::FilterStats;
pub use layout::split::Segment;
pub use layout::topology::{RowTopology, YearGrid};
pub use layout::{
    compute_layout, compute_layout_for_mode, layout_raw_events, LayoutError, LayoutOptions,
    PlacedSegment, YearLayout,
};
pub use logging::{default_log_level, init_logging, init_logging_from_env, logging_status};
pub use model::calendar::CalendarInfo;
pub use model::event::{CalendarEvent, RawDate, RawEvent};
pub use prefs::{MemoryPreferenceStore, PreferenceStore, Preferences, SqlitePreferenceStore};
pub use service::{PassTicket, ViewState, YearViewService};
pub use source::{EventSource, FetchOptions, JsonEventSource, SampleEventSource};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
