//! CLI entry point for inspecting year layouts.
//!
//! # Responsibility
//! - Lay out one year from the configured event source.
//! - Print a text summary or the full layout as JSON.
//!
//! Logging follows `YEARVIEW_LOG_DIR` and `YEARVIEW_LOG_LEVEL`.

use chrono::Datelike;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use yearview_core::{
    core_version, init_logging_from_env, EventSource, JsonEventSource, LayoutConfig,
    MemoryPreferenceStore, PreferenceStore, RowTopology, SampleEventSource,
    SqlitePreferenceStore, YearLayout, YearViewService,
};

/// Lays out one calendar year as lane-packed event bars
#[derive(Parser, Debug, PartialEq)]
#[command(name = "yearview_cli")]
#[command(version, about, long_about = None)]
struct CliArgs {
    /// Year to lay out (defaults to the current year)
    year: Option<i32>,

    /// Row topology: linear, day-aligned or week-rows (defaults to the saved mode)
    #[arg(short, long, value_parser = parse_mode)]
    mode: Option<RowTopology>,

    /// JSON event document (sample data when absent)
    #[arg(long, env = "YEARVIEW_EVENTS_PATH")]
    events: Option<PathBuf>,

    /// SQLite preference file (in-memory when absent)
    #[arg(long, env = "YEARVIEW_PREFS_PATH")]
    prefs: Option<PathBuf>,

    /// Print the full layout as JSON
    #[arg(long)]
    json: bool,
}

fn parse_mode(value: &str) -> Result<RowTopology, String> {
    value.parse().map_err(|err| format!("{err}"))
}

fn event_source(path: Option<PathBuf>) -> Box<dyn EventSource> {
    match path {
        Some(path) => Box::new(JsonEventSource::new(path)),
        None => Box::new(SampleEventSource::new()),
    }
}

fn preference_store(path: Option<PathBuf>) -> Box<dyn PreferenceStore> {
    let Some(path) = path else {
        return Box::new(MemoryPreferenceStore::new());
    };
    match SqlitePreferenceStore::open(&path) {
        Ok(store) => Box::new(store),
        Err(err) => {
            eprintln!(
                "warning: preferences unavailable at `{}`: {err}",
                path.display()
            );
            Box::new(MemoryPreferenceStore::new())
        }
    }
}

fn print_summary(layout: &YearLayout, selection: &str) {
    println!(
        "year={} topology={} rows={} row_width={} segments={} dropped={} degraded={}",
        layout.year,
        layout.topology,
        layout.row_count,
        layout.row_width,
        layout.segments.len(),
        layout.dropped_records,
        layout.degraded_events
    );
    println!("{selection}");
    for (row, height) in layout.row_heights.iter().enumerate() {
        println!("row {row:>2} height={height}");
        for placed in layout.segments_in_row(row) {
            let segment = &placed.segment;
            println!(
                "    lane {} units {:>2}-{:<2} {}{}{}",
                placed.lane,
                segment.start_unit,
                segment.end_unit,
                if segment.continues_from_prior_row { "<" } else { "" },
                placed.title,
                if segment.continues_to_next_row { ">" } else { "" },
            );
        }
    }
}

fn main() -> ExitCode {
    if let Err(err) = init_logging_from_env() {
        eprintln!("warning: logging disabled: {err}");
    }

    let args = CliArgs::parse();

    let year = args
        .year
        .unwrap_or_else(|| chrono::Local::now().year());
    let mut service = YearViewService::new(
        event_source(args.events),
        preference_store(args.prefs),
        LayoutConfig::default(),
        year,
    );
    if let Some(topology) = args.mode {
        service.set_topology(topology);
    }
    service.load_calendars();

    let layout = match service.refresh() {
        Ok(layout) => layout.clone(),
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    if args.json {
        match serde_json::to_string_pretty(&layout) {
            Ok(text) => println!("{text}"),
            Err(err) => {
                eprintln!("error: failed to encode layout: {err}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        println!("yearview_core version={}", core_version());
        print_summary(&layout, &service.selection_summary());
    }
    ExitCode::SUCCESS
}
