//! Core logic for the timesheet reformatter.
//!
//! This crate contains:
//! - Time resolution: reading `10`, `3:30p`, `12a` as concrete times
//! - Line grammar: matching hand-typed timesheet lines
//! - Range evaluation: durations and reconciled daily totals
//! - Formatting: the canonical, re-parseable rendering of a line
//! - Aggregation: weekly summaries and invoice records over a whole file

mod aggregate;
mod error;
pub mod format;
pub mod grammar;
pub mod invoice;
mod line;
mod ranges;
mod settings;
pub mod time;

pub use aggregate::{Aggregator, MAX_DAILY_HOURS, Output, Report, Totals, process};
pub use error::{GrammarError, LineError, TimesheetError, Warning, Warnings};
pub use format::{format_hours, format_line};
pub use grammar::parse_line;
pub use invoice::{Invoice, InvoiceItem, InvoiceRecord, LineItem};
pub use line::{ClockTime, ParsedLine, RangeEntry};
pub use settings::{Billcode, Settings, Trigger};
pub use time::resolve;
