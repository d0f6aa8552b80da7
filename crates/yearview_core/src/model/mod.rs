//! Canonical data model for calendar events and their provenance.
//!
//! # Responsibility
//! - Define the loosely-typed raw record accepted from event sources.
//! - Define the canonical event value every layout pass works on.
//!
//! # Invariants
//! - Canonical events always satisfy `start <= end`.
//! - Values carry no identity beyond the pass that produced them.

pub mod calendar;
pub mod event;
