//! Turns matched ranges into durations and settles the line's total hours.

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::{TimesheetError, Warning, Warnings};
use crate::format::format_hours;
use crate::grammar::{RawLine, RawRange};
use crate::line::{ClockTime, ParsedLine, RangeEntry};
use crate::time::resolve_detailed;

/// Builds a [`ParsedLine`] from a grammar match.
///
/// With a range list the total is always recomputed from the ranges; a
/// differing typed figure only produces a warning. Fails when a range ends
/// before it starts.
pub fn evaluate(
    line: &str,
    raw: RawLine<'_>,
    warnings: &mut Warnings,
) -> Result<ParsedLine, TimesheetError> {
    let stated = raw.hours.flatten();
    let mut hours = stated;
    let mut entries = Vec::new();

    if let Some(items) = raw.ranges {
        entries = items
            .into_iter()
            .map(|item| evaluate_item(line, raw.date, item, warnings))
            .collect::<Result<Vec<_>, _>>()?;

        // A lone `start-` is noise; keep whatever hours were typed.
        if entries.len() == 1 && entries[0].is_open() {
            entries.clear();
        }

        if !entries.is_empty() {
            let total = entries
                .iter()
                .filter_map(RangeEntry::duration)
                .fold(0.0, |acc, h| acc + h);
            if let Some(stated) = stated {
                let (stated, computed) = (format_hours(Some(stated)), format_hours(Some(total)));
                if stated != computed {
                    warnings.push(Warning::HoursMismatch {
                        date: raw.date,
                        stated,
                        computed,
                    });
                }
            }
            hours = Some(total);

            if matches!(entries.as_slice(), [RangeEntry::Duration(_)]) {
                entries.clear();
            }
        }
    }

    Ok(ParsedLine {
        prefix: raw.prefix.to_string(),
        date: raw.date,
        billcode: raw.billcode.map(str::to_string),
        hours,
        ranges: entries,
        suffix: raw.suffix.to_string(),
    })
}

fn evaluate_item(
    line: &str,
    date: NaiveDate,
    item: RawRange<'_>,
    warnings: &mut Warnings,
) -> Result<RangeEntry, TimesheetError> {
    let (start_token, end_token) = match item {
        RawRange::Duration(hours) => return Ok(RangeEntry::Duration(hours)),
        RawRange::Span { start, end, .. } => (start, end),
    };

    let start = clock_time(date, start_token, None, warnings);
    let end = end_token.map(|token| clock_time(date, token, start.resolved(), warnings));

    let duration = match (start.resolved(), end.as_ref().and_then(ClockTime::resolved)) {
        (Some(s), Some(e)) => {
            if e < s {
                return Err(TimesheetError::EndBeforeStart {
                    line: line.to_string(),
                    start: s,
                    end: e,
                });
            }
            Some(hours_between(s, e))
        }
        _ => None,
    };

    Ok(RangeEntry::Span {
        start,
        end,
        duration,
    })
}

fn clock_time(
    date: NaiveDate,
    token: &str,
    after: Option<NaiveDateTime>,
    warnings: &mut Warnings,
) -> ClockTime {
    match resolve_detailed(date, token, after) {
        Some(resolution) => {
            if resolution.assumed_pm {
                warnings.push(Warning::AssumedPm {
                    date,
                    token: token.to_string(),
                });
            }
            ClockTime::Resolved(resolution.time)
        }
        None => {
            tracing::debug!(token, %date, "unresolvable time kept as typed");
            ClockTime::Unresolved(token.to_string())
        }
    }
}

#[expect(
    clippy::cast_precision_loss,
    reason = "minute counts within one day are far below f64 precision limits"
)]
fn hours_between(start: NaiveDateTime, end: NaiveDateTime) -> f64 {
    (end - start).num_minutes() as f64 / 60.0
}
