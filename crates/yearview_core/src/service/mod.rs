//! Session services for hosts embedding the year view.
//!
//! # Responsibility
//! - Orchestrate event sources, preferences and the layout engine into
//!   view-level operations.
//! - Keep hosts decoupled from storage and fetch details.

pub mod year_view_service;

pub use year_view_service::{PassTicket, ViewState, YearViewService};
