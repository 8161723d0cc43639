//! Append-only store of evaluated samples.
//!
//! Every simulated point ends up here as an [`table::EvalRecord`]: the point,
//! its outcome (robustness + verdict, horizon failure, or execution failure),
//! and an optional trace summary. Records are never mutated or deleted, which
//! makes the table safe to hand to multiple readers. The [`log`] module
//! persists the table as a line-per-record append log.

pub mod log;
pub mod table;

pub use log::{read_log, LogError, LogWriter};
pub use table::{ErrorTable, EvalRecord, Outcome};
