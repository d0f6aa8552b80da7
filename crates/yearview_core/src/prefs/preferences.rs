//! Typed preference accessors.
//!
//! # Responsibility
//! - Map each view preference to its storage key and default.
//!
//! # Invariants
//! - Loads never fail: store errors and malformed values yield the default.
//! - Saves never fail: store errors are logged and ignored.

use super::PreferenceStore;
use crate::layout::topology::RowTopology;
use log::error;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeSet;

pub const KEY_SELECTED_CALENDARS: &str = "selectedCalendarIds";
pub const KEY_CALENDAR_PANEL_EXPANDED: &str = "calendarPanelExpanded";
pub const KEY_THEME: &str = "uiThemeOverride";
pub const KEY_SHOW_WEEK_NUMBERS: &str = "showWeekNumbers";
pub const KEY_GRAY_PAST_DAYS: &str = "grayPastDays";
pub const KEY_HIGHLIGHT_CURRENT_DAY: &str = "highlightCurrentDay";
pub const KEY_REFRESH_SETTINGS: &str = "refreshSettings";
pub const KEY_VIEW_MODE: &str = "viewMode";
pub const KEY_MIN_DURATION_HOURS: &str = "minDurationHours";

/// Auto-refresh period used when none is stored (5 minutes).
pub const DEFAULT_REFRESH_INTERVAL_MS: u64 = 300_000;

/// Persisted calendar selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectedCalendars {
    pub ids: BTreeSet<String>,
    /// A selection was stored at all (possibly empty).
    pub found: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    #[default]
    Auto,
    Light,
    Dark,
}

impl ThemePreference {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "auto" => Some(Self::Auto),
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshSettings {
    pub auto_refresh_enabled: bool,
    #[serde(rename = "autoRefreshInterval")]
    pub auto_refresh_interval_ms: u64,
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            auto_refresh_enabled: true,
            auto_refresh_interval_ms: DEFAULT_REFRESH_INTERVAL_MS,
        }
    }
}

impl RefreshSettings {
    // Only an explicit `false` disables refresh; a missing or zero interval
    // means the default period.
    fn from_value(value: &Value) -> Self {
        let auto_refresh_enabled = value.get("autoRefreshEnabled") != Some(&Value::Bool(false));
        let auto_refresh_interval_ms = value
            .get("autoRefreshInterval")
            .and_then(Value::as_u64)
            .filter(|interval| *interval > 0)
            .unwrap_or(DEFAULT_REFRESH_INTERVAL_MS);
        Self {
            auto_refresh_enabled,
            auto_refresh_interval_ms,
        }
    }
}

/// Typed view over a `PreferenceStore`.
#[derive(Debug)]
pub struct Preferences<P: PreferenceStore> {
    store: P,
}

impl<P: PreferenceStore> Preferences<P> {
    pub fn new(store: P) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &P {
        &self.store
    }

    fn load_value(&self, key: &str) -> Option<Value> {
        match self.store.load(key) {
            Ok(value) => value,
            Err(err) => {
                error!(
                    "event=preference_load module=prefs status=error key={} error={}",
                    key, err
                );
                None
            }
        }
    }

    fn save_value(&self, key: &str, value: Value) {
        if let Err(err) = self.store.save(key, &value) {
            error!(
                "event=preference_save module=prefs status=error key={} error={}",
                key, err
            );
        }
    }

    fn load_flag(&self, key: &str, default: bool) -> bool {
        self.load_value(key)
            .map_or(default, |value| truthy(&value))
    }

    pub fn load_selected_calendars(&self) -> SelectedCalendars {
        let Some(value) = self.load_value(KEY_SELECTED_CALENDARS) else {
            return SelectedCalendars::default();
        };
        let ids = value
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        SelectedCalendars { ids, found: true }
    }

    pub fn save_selected_calendars<'a>(&self, ids: impl IntoIterator<Item = &'a String>) {
        let ids: Vec<&String> = ids.into_iter().collect();
        self.save_value(KEY_SELECTED_CALENDARS, json!(ids));
    }

    pub fn load_calendar_panel_expanded(&self) -> bool {
        self.load_flag(KEY_CALENDAR_PANEL_EXPANDED, false)
    }

    pub fn save_calendar_panel_expanded(&self, expanded: bool) {
        self.save_value(KEY_CALENDAR_PANEL_EXPANDED, Value::Bool(expanded));
    }

    /// Unknown stored values read as `auto`.
    pub fn load_theme(&self) -> ThemePreference {
        self.load_value(KEY_THEME)
            .and_then(|value| value.as_str().and_then(ThemePreference::parse))
            .unwrap_or_default()
    }

    pub fn save_theme(&self, theme: ThemePreference) {
        self.save_value(KEY_THEME, Value::from(theme.as_str()));
    }

    pub fn load_show_week_numbers(&self) -> bool {
        self.load_flag(KEY_SHOW_WEEK_NUMBERS, true)
    }

    pub fn save_show_week_numbers(&self, show: bool) {
        self.save_value(KEY_SHOW_WEEK_NUMBERS, Value::Bool(show));
    }

    pub fn load_gray_past_days(&self) -> bool {
        self.load_flag(KEY_GRAY_PAST_DAYS, false)
    }

    pub fn save_gray_past_days(&self, enabled: bool) {
        self.save_value(KEY_GRAY_PAST_DAYS, Value::Bool(enabled));
    }

    pub fn load_highlight_current_day(&self) -> bool {
        self.load_flag(KEY_HIGHLIGHT_CURRENT_DAY, false)
    }

    pub fn save_highlight_current_day(&self, enabled: bool) {
        self.save_value(KEY_HIGHLIGHT_CURRENT_DAY, Value::Bool(enabled));
    }

    pub fn load_refresh_settings(&self) -> RefreshSettings {
        self.load_value(KEY_REFRESH_SETTINGS)
            .map_or_else(RefreshSettings::default, |value| {
                RefreshSettings::from_value(&value)
            })
    }

    pub fn save_refresh_settings(&self, settings: RefreshSettings) {
        match serde_json::to_value(settings) {
            Ok(value) => self.save_value(KEY_REFRESH_SETTINGS, value),
            Err(err) => error!(
                "event=preference_save module=prefs status=error key={} error={}",
                KEY_REFRESH_SETTINGS, err
            ),
        }
    }

    /// Unknown stored names read as the default topology.
    pub fn load_view_mode(&self) -> RowTopology {
        self.load_value(KEY_VIEW_MODE)
            .and_then(|value| value.as_str().and_then(|name| name.parse().ok()))
            .unwrap_or_default()
    }

    pub fn save_view_mode(&self, topology: RowTopology) {
        self.save_value(KEY_VIEW_MODE, Value::from(topology.as_str()));
    }

    pub fn load_min_duration_hours(&self) -> f64 {
        self.load_value(KEY_MIN_DURATION_HOURS)
            .and_then(|value| value.as_f64())
            .filter(|hours| hours.is_finite() && *hours >= 0.0)
            .unwrap_or(0.0)
    }

    pub fn save_min_duration_hours(&self, hours: f64) {
        self.save_value(KEY_MIN_DURATION_HOURS, json!(hours));
    }
}

// Loose truthiness for flags written by older hosts.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
