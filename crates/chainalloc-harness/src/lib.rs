//! Correctness and timing harness for the chainalloc arena.
//!
//! Both harnesses are ordinary callers of the core's three operations:
//! - `scenarios`: adversarial call sequences whose observable behavior
//!   (return values, fault records, leak state) is checked and reported
//! - `grind`: repeated allocation patterns timed for average
//!   per-iteration latency
//! - `report`: serializable report model shared by the CLI and tests

#![forbid(unsafe_code)]

pub mod grind;
pub mod report;
pub mod scenarios;

/// Largest request the stock scenarios and workloads issue. Deliberately
/// well under the arena capacity so several can be live at once.
pub const MAX_REQUEST: usize = 511;

pub use report::{CorrectnessReport, ReportError};
pub use scenarios::{Check, ScenarioOutcome};
