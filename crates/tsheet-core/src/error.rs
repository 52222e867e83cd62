//! Error and warning types for timesheet processing.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

/// A line matched none of the timesheet grammar alternatives.
///
/// Recoverable: the aggregation engine echoes the line unchanged.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("line does not match any timesheet grammar: {line:?}")]
pub struct GrammarError {
    pub line: String,
}

impl GrammarError {
    pub fn new(line: impl Into<String>) -> Self {
        Self { line: line.into() }
    }
}

/// A fatal timesheet error. Aborts the whole run.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimesheetError {
    /// A resolved time range ends before it starts.
    #[error("end before start in {line:?}: range {start} -> {end}")]
    EndBeforeStart {
        line: String,
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
}

/// Failure to turn a single line into a [`crate::ParsedLine`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LineError {
    #[error(transparent)]
    Grammar(#[from] GrammarError),

    #[error(transparent)]
    Timesheet(#[from] TimesheetError),
}

/// Advisory conditions noticed while processing. Never alter control flow.
#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    /// The typed hour figure disagrees with the sum of the ranges.
    HoursMismatch {
        date: NaiveDate,
        stated: String,
        computed: String,
    },
    /// A data line is dated earlier than the one before it.
    DateRegression {
        date: NaiveDate,
        previous: NaiveDate,
    },
    /// A date appears on more than one data line.
    DuplicateDate { date: NaiveDate },
    /// The accumulated hours for one day exceed the daily threshold.
    LongDay { date: NaiveDate, hours: String },
    /// A time without a meridiem was assumed to be afternoon.
    AssumedPm { date: NaiveDate, token: String },
    /// An invoice marker carried no `# id, description` comment.
    MissingInvoiceId { line: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HoursMismatch {
                date,
                stated,
                computed,
            } => write!(f, "{date}: changing total hours from {stated} to {computed}"),
            Self::DateRegression { date, previous } => {
                write!(f, "{date}: date goes backwards (previous line was {previous})")
            }
            Self::DuplicateDate { date } => write!(f, "{date}: duplicate date"),
            Self::LongDay { date, hours } => write!(f, "{date}: {hours} hours in one day"),
            Self::AssumedPm { date, token } => write!(f, "{date}: assuming time {token} is PM"),
            Self::MissingInvoiceId { line } => {
                write!(f, "invoice marker without an id comment: {line:?}")
            }
        }
    }
}

/// Collects warnings, logging each one as it arrives.
#[derive(Debug, Default)]
pub struct Warnings(Vec<Warning>);

impl Warnings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, warning: Warning) {
        tracing::warn!("{warning}");
        self.0.push(warning);
    }

    pub fn as_slice(&self) -> &[Warning] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<Warning> {
        self.0
    }
}
