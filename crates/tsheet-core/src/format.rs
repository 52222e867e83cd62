//! Canonical rendering of parsed lines.
//!
//! The output of [`format_line`] parses back to the same record, so
//! reformatting an already canonical timesheet changes nothing.

use chrono::{NaiveDateTime, Timelike};

use crate::line::{ClockTime, ParsedLine, RangeEntry};
use crate::settings::Settings;

const DATE_WIDTH: usize = 10;
const BILLCODE_WIDTH: usize = 5;
const HOURS_WIDTH: usize = 5;

/// Renders an hour figure: `-` for none, `3` for whole hours, `.25` or
/// `3.50` otherwise.
pub fn format_hours(hours: Option<f64>) -> String {
    let Some(hours) = hours else {
        return "-".to_string();
    };
    let hours = (hours * 100.0).round() / 100.0;
    if hours.fract() == 0.0 {
        format!("{hours:.0}")
    } else {
        format!("{hours:.2}").trim_start_matches('0').to_string()
    }
}

/// Renders a time as 12-hour clock with a lowercase meridiem, e.g. `9:05a`,
/// `12p`, `12a`.
pub fn format_time(time: NaiveDateTime) -> String {
    let (pm, hour) = time.hour12();
    let meridiem = if pm { 'p' } else { 'a' };
    match time.minute() {
        0 => format!("{hour}{meridiem}"),
        minute => format!("{hour}:{minute:02}{meridiem}"),
    }
}

fn format_clock(time: &ClockTime) -> String {
    match time {
        ClockTime::Resolved(t) => format_time(*t),
        ClockTime::Unresolved(raw) => raw.clone(),
    }
}

/// Renders one range-list item.
pub fn format_range(entry: &RangeEntry) -> String {
    match entry {
        RangeEntry::Duration(hours) => format_hours(Some(*hours)),
        RangeEntry::Span {
            start,
            end: None,
            ..
        } => format!("{}-", format_clock(start)),
        RangeEntry::Span {
            start,
            end: Some(end),
            duration,
        } => {
            let span = format!("{}-{}", format_clock(start), format_clock(end));
            match duration {
                Some(hours) => format!("{span}({})", format_hours(Some(*hours))),
                None => span,
            }
        }
    }
}

/// Renders a parsed line in the canonical column layout.
///
/// The billcode column appears when `settings.billcode` is set or when the
/// line has a billcode. A line typed without a prefix gets `settings.prefix`.
pub fn format_line(line: &ParsedLine, settings: &Settings) -> String {
    let prefix = if line.prefix.is_empty() {
        settings.prefix.as_str()
    } else {
        line.prefix.as_str()
    };

    let mut out = String::from(prefix);
    let date = line.date.format("%Y-%m-%d").to_string();
    out.push_str(&format!("{date:>DATE_WIDTH$}"));

    if settings.billcode || line.billcode.is_some() {
        let code = line.billcode.as_deref().unwrap_or("");
        out.push_str(&format!(" {code:>BILLCODE_WIDTH$}"));
    }

    let hours = format_hours(line.hours);
    out.push_str(&format!(" {hours:>HOURS_WIDTH$}"));

    if !line.ranges.is_empty() {
        let ranges: Vec<String> = line.ranges.iter().map(format_range).collect();
        out.push(' ');
        out.push_str(&ranges.join(", "));
    }

    out.push_str(line.suffix.trim_end());
    out
}
