//! Stream aggregation.
//!
//! Feeds lines through the parser one at a time, keeping running weekly and
//! invoice totals, and emits canonical lines, summary lines and invoice
//! records.
//!
//! # Per-line behaviour
//!
//! 1. Lines matching a rendered summary template are stale output from an
//!    earlier run and are dropped.
//! 2. Once a data line has been seen: invoice markers flush an invoice,
//!    blank lines are dropped, summary markers flush the weekly total.
//! 3. Everything else goes to the parser. Unparseable lines pass through
//!    verbatim; data lines update the totals and are rewritten canonically.

use std::collections::HashMap;

use chrono::{Datelike, IsoWeek, NaiveDate, Weekday};
use regex::Regex;

use crate::error::{LineError, TimesheetError, Warning, Warnings};
use crate::format::{format_hours, format_line};
use crate::grammar::parse_line_with;
use crate::invoice::{InvoiceRecord, LineItem, marker_comment};
use crate::line::ParsedLine;
use crate::settings::{Settings, Trigger};

/// More hours than this on one date produces a warning.
pub const MAX_DAILY_HOURS: f64 = 9.0;

const HOURS_THIS_WEEK: &str = "{hours_this_week}";
const HOURS_SINCE_INVOICE: &str = "{hours_since_invoice}";

/// Running hour totals for one scope (a week or an invoice period).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Totals {
    pub hours: f64,
    /// Per-billcode hours in first-seen order; the default code is empty.
    pub by_billcode: Vec<(String, f64)>,
}

impl Totals {
    pub fn add(&mut self, billcode: &str, hours: f64) {
        self.hours += hours;
        match self.by_billcode.iter_mut().find(|(code, _)| code == billcode) {
            Some((_, total)) => *total += hours,
            None => self.by_billcode.push((billcode.to_string(), hours)),
        }
    }

    /// Zeroes the totals, returning what they held.
    pub fn reset(&mut self) -> Self {
        std::mem::take(self)
    }
}

/// Something produced by the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    Line(String),
    Invoice(InvoiceRecord),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    BeforeData,
    InData,
}

/// Mutable state for one run over one file.
#[derive(Debug)]
struct RunState {
    phase: Phase,
    weekly: Totals,
    invoice: Totals,
    last_date: Option<NaiveDate>,
    day_hours: HashMap<NaiveDate, f64>,
}

impl RunState {
    fn new() -> Self {
        Self {
            phase: Phase::BeforeData,
            weekly: Totals::default(),
            invoice: Totals::default(),
            last_date: None,
            day_hours: HashMap::new(),
        }
    }
}

/// Line-at-a-time aggregation engine.
#[derive(Debug)]
pub struct Aggregator<'s> {
    settings: &'s Settings,
    state: RunState,
    stale: Vec<Regex>,
    warnings: Warnings,
}

impl<'s> Aggregator<'s> {
    pub fn new(settings: &'s Settings) -> Self {
        let stale = [
            &settings.weekly_summary_template,
            &settings.invoice_template,
        ]
        .into_iter()
        .filter_map(|template| template_pattern(template))
        .collect();

        Self {
            settings,
            state: RunState::new(),
            stale,
            warnings: Warnings::new(),
        }
    }

    /// Hours since the last weekly summary.
    pub const fn weekly(&self) -> &Totals {
        &self.state.weekly
    }

    /// Hours since the last invoice.
    pub const fn invoice(&self) -> &Totals {
        &self.state.invoice
    }

    pub fn warnings(&self) -> &[Warning] {
        self.warnings.as_slice()
    }

    /// Processes one input line.
    ///
    /// Only an impossible time range is an error; it aborts the run.
    pub fn feed(&mut self, line: &str) -> Result<Vec<Output>, TimesheetError> {
        let line = line.trim_end_matches(['\n', '\r']);
        let mut out = Vec::new();

        if self.is_stale_summary(line) {
            tracing::debug!(line, "dropping stale summary line");
            return Ok(out);
        }

        if self.state.phase == Phase::InData {
            let settings = self.settings;
            if settings.invoice_on == Trigger::Marker && is_marker(line, &settings.invoice_marker) {
                out.push(Output::Line(line.to_string()));
                let after_marker = line
                    .strip_prefix(settings.invoice_marker.as_str())
                    .unwrap_or(line);
                let (id, description) = marker_comment(after_marker).unwrap_or_else(|| {
                    self.warnings.push(Warning::MissingInvoiceId {
                        line: line.to_string(),
                    });
                    (String::new(), String::new())
                });
                self.flush_invoice(id, description, &mut out);
                return Ok(out);
            }
            if line.trim().is_empty() {
                return Ok(out);
            }
            if settings.summary_on == Trigger::Marker && is_marker(line, &settings.summary_marker) {
                out.push(Output::Line(line.to_string()));
                self.flush_weekly(&mut out);
                return Ok(out);
            }
        }

        match parse_line_with(line, &mut self.warnings) {
            Ok(Some(parsed)) => self.apply(&parsed, &mut out),
            Ok(None) => out.push(Output::Line(line.to_string())),
            Err(LineError::Grammar(err)) => {
                tracing::debug!(%err, "passing line through");
                out.push(Output::Line(line.to_string()));
            }
            Err(LineError::Timesheet(err)) => return Err(err),
        }

        Ok(out)
    }

    /// Ends the run, emitting the final weekly summary.
    pub fn finish(mut self) -> (Vec<Output>, Vec<Warning>) {
        let mut out = Vec::new();
        self.flush_weekly(&mut out);
        (out, self.warnings.into_vec())
    }

    fn apply(&mut self, parsed: &ParsedLine, out: &mut Vec<Output>) {
        let settings = self.settings;
        let date = parsed.date;
        let hours = parsed.billable_hours();

        if let Some(previous) = self.state.last_date {
            if date < previous {
                self.warnings
                    .push(Warning::DateRegression { date, previous });
            }
        }
        if self.state.day_hours.contains_key(&date) {
            self.warnings.push(Warning::DuplicateDate { date });
        }

        if let Some(previous) = self.state.last_date {
            if date.iso_week() != previous.iso_week() {
                tracing::debug!(%previous, %date, "week boundary");
                if settings.summary_on == Trigger::Weekly {
                    self.flush_weekly(out);
                }
                if settings.invoice_on == Trigger::Weekly {
                    let (id, description) = weekly_invoice_label(previous.iso_week());
                    self.flush_invoice(id, description, out);
                }
            }
        }

        let billcode = parsed.billcode_key();
        self.state.weekly.add(billcode, hours);
        self.state.invoice.add(billcode, hours);

        let day = self.state.day_hours.entry(date).or_insert(0.0);
        *day += hours;
        if *day > MAX_DAILY_HOURS {
            let hours = format_hours(Some(*day));
            self.warnings.push(Warning::LongDay { date, hours });
        }

        self.state.last_date = Some(date);
        self.state.phase = Phase::InData;
        out.push(Output::Line(format_line(parsed, settings)));
    }

    fn flush_weekly(&mut self, out: &mut Vec<Output>) {
        let line = self.render(&self.settings.weekly_summary_template);
        tracing::debug!(hours = self.state.weekly.hours, "weekly summary");
        out.push(Output::Line(line));
        self.state.weekly.reset();
    }

    fn flush_invoice(&mut self, id: String, description: String, out: &mut Vec<Output>) {
        out.push(Output::Line(self.render(&self.settings.invoice_template)));

        let totals = self.state.invoice.reset();
        let record = InvoiceRecord {
            id,
            description,
            hours: totals.hours,
            items: totals
                .by_billcode
                .into_iter()
                .map(|(billcode, hours)| LineItem { billcode, hours })
                .collect(),
        };
        tracing::info!(id = %record.id, hours = record.hours, "invoice flushed");
        out.push(Output::Invoice(record));
    }

    fn render(&self, template: &str) -> String {
        template
            .replace(HOURS_THIS_WEEK, &format_hours(Some(self.state.weekly.hours)))
            .replace(
                HOURS_SINCE_INVOICE,
                &format_hours(Some(self.state.invoice.hours)),
            )
    }

    fn is_stale_summary(&self, line: &str) -> bool {
        let line = line.trim_end();
        self.stale.iter().any(|re| re.is_match(line))
    }
}

/// Result of running a whole file through the engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    pub lines: Vec<String>,
    pub invoices: Vec<InvoiceRecord>,
    pub warnings: Vec<Warning>,
}

impl Report {
    fn push(&mut self, output: Output) {
        match output {
            Output::Line(line) => self.lines.push(line),
            Output::Invoice(record) => self.invoices.push(record),
        }
    }
}

/// Runs every line through a fresh [`Aggregator`].
pub fn process<I, S>(lines: I, settings: &Settings) -> Result<Report, TimesheetError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut aggregator = Aggregator::new(settings);
    let mut report = Report::default();

    for line in lines {
        for output in aggregator.feed(line.as_ref())? {
            report.push(output);
        }
    }

    let (tail, warnings) = aggregator.finish();
    for output in tail {
        report.push(output);
    }
    report.warnings = warnings;
    Ok(report)
}

fn is_marker(line: &str, marker: &str) -> bool {
    !marker.is_empty() && line.starts_with(marker)
}

/// Id and description for an invoice closed by a week change.
fn weekly_invoice_label(week: IsoWeek) -> (String, String) {
    let id = format!("{}-W{:02}", week.year(), week.week());
    let description = NaiveDate::from_isoywd_opt(week.year(), week.week(), Weekday::Mon)
        .map(|monday| format!("week of {monday}"))
        .unwrap_or_default();
    (id, description)
}

/// Matches lines a summary template would render, with any hour figure in
/// place of each placeholder.
fn template_pattern(template: &str) -> Option<Regex> {
    let template = template.trim_end();
    if template.trim().is_empty() {
        return None;
    }

    let hours = r"(?:-|[.0-9]+)";
    let pattern = template
        .split(HOURS_THIS_WEEK)
        .map(|part| {
            part.split(HOURS_SINCE_INVOICE)
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(hours)
        })
        .collect::<Vec<_>>()
        .join(hours);

    Regex::new(&format!("^{pattern}$")).ok()
}
