//! Operator-facing reporting.
//!
//! The installer never prints directly; it is handed a [`Reporter`] and
//! sends every informational message and failure through it.

mod output;

pub use output::{format_failure, format_report, Output, Reporter};
