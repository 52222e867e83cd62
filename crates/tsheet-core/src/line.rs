//! Structured form of one timesheet data line.

use chrono::{NaiveDate, NaiveDateTime};

/// One end of a timed span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClockTime {
    /// A concrete time on the line's date.
    Resolved(NaiveDateTime),
    /// A token of the right shape that names no real time (e.g. `25:00`).
    /// Kept as typed so it is re-emitted unchanged.
    Unresolved(String),
}

impl ClockTime {
    pub const fn resolved(&self) -> Option<NaiveDateTime> {
        match self {
            Self::Resolved(t) => Some(*t),
            Self::Unresolved(_) => None,
        }
    }
}

/// One item of a range list.
#[derive(Debug, Clone, PartialEq)]
pub enum RangeEntry {
    /// A bare hour figure such as `.25` or `2h`.
    Duration(f64),
    /// `start-end`, or the open form `start-`.
    Span {
        start: ClockTime,
        end: Option<ClockTime>,
        /// Hours between start and end; `None` for open or unresolved spans.
        duration: Option<f64>,
    },
}

impl RangeEntry {
    pub const fn duration(&self) -> Option<f64> {
        match self {
            Self::Duration(hours) => Some(*hours),
            Self::Span { duration, .. } => *duration,
        }
    }

    /// True for `start-` with nothing after it.
    pub const fn is_open(&self) -> bool {
        matches!(
            self,
            Self::Span {
                end: None,
                duration: None,
                ..
            }
        )
    }
}

/// A successfully parsed data line.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLine {
    /// Leading `*` markers and spaces, verbatim.
    pub prefix: String,
    pub date: NaiveDate,
    pub billcode: Option<String>,
    /// Total hours for the line; `None` for a bare date.
    pub hours: Option<f64>,
    /// Empty unless the line carried a range list. When non-empty, `hours`
    /// is the sum of the entry durations.
    pub ranges: Vec<RangeEntry>,
    /// Trailing whitespace and `#` comment, verbatim.
    pub suffix: String,
}

impl ParsedLine {
    /// Hours counted toward totals.
    pub fn billable_hours(&self) -> f64 {
        self.hours.unwrap_or(0.0)
    }

    /// Billcode used for invoice line items; the default code is empty.
    pub fn billcode_key(&self) -> &str {
        self.billcode.as_deref().unwrap_or("")
    }
}
