//! Ingestion of loosely-typed event records.
//!
//! # Responsibility
//! - Parse heterogeneous raw records into canonical `CalendarEvent` values.
//! - Extract raw records from iCalendar `VEVENT` text.
//!
//! # Invariants
//! - Problems with a single record drop that record only; a batch never fails.

pub mod ics;
pub mod normalize;
