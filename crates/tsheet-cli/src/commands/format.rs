//! `tsheet format`: rewrite a timesheet and hand off its invoices.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use tsheet_core::{Aggregator, Invoice, InvoiceRecord, Output, Settings};

use super::input::Input;
use crate::cli::FormatArgs;

/// What a format run produced.
#[derive(Debug, Default)]
pub struct Formatted {
    pub lines: Vec<String>,
    pub invoices: Vec<InvoiceRecord>,
    pub warning_count: usize,
}

/// Runs the aggregation engine over `input`.
///
/// With `echo`, every input line is written to `writer` followed by its
/// rewrite prefixed with `+ `.
pub fn transform<W: Write>(writer: &mut W, input: &Input, echo: bool) -> Result<Formatted> {
    let mut aggregator = Aggregator::new(&input.settings);
    let mut formatted = Formatted {
        lines: input.header.clone(),
        ..Formatted::default()
    };

    for (number, line) in input.body.iter().enumerate() {
        let outputs = aggregator
            .feed(line)
            .with_context(|| format!("line {}", number + 1 + input.header.len()))?;
        if echo {
            writeln!(writer, "{line}")?;
        }
        collect(writer, outputs, &mut formatted, echo)?;
    }

    let (tail, warnings) = aggregator.finish();
    collect(writer, tail, &mut formatted, echo)?;
    formatted.warning_count = warnings.len();

    Ok(formatted)
}

fn collect<W: Write>(
    writer: &mut W,
    outputs: Vec<Output>,
    formatted: &mut Formatted,
    echo: bool,
) -> Result<()> {
    for output in outputs {
        match output {
            Output::Line(line) => {
                if echo {
                    writeln!(writer, "+ {line}")?;
                }
                formatted.lines.push(line);
            }
            Output::Invoice(record) => formatted.invoices.push(record),
        }
    }
    Ok(())
}

pub fn run<W: Write>(writer: &mut W, args: &FormatArgs, input: &Input) -> Result<()> {
    if let Some(backup) = &input.backup {
        tracing::info!(path = %backup.display(), "backed up input");
    }

    let formatted = transform(writer, input, args.echo)?;

    match &args.out {
        Some(out) => {
            let mut text = formatted.lines.join("\n");
            text.push('\n');
            fs::write(out, text).with_context(|| format!("failed to write {}", out.display()))?;
            tracing::info!(path = %out.display(), lines = formatted.lines.len(), "wrote timesheet");
        }
        None if !args.echo => {
            for line in &formatted.lines {
                writeln!(writer, "{line}")?;
            }
        }
        None => {}
    }

    match &args.invoice_dir {
        Some(dir) => {
            let today = Local::now().date_naive();
            for (index, record) in formatted.invoices.iter().enumerate() {
                write_invoice(dir, index, record, &input.settings, today)?;
            }
        }
        None if !formatted.invoices.is_empty() => {
            tracing::info!(
                count = formatted.invoices.len(),
                "invoices collected; pass --invoice-dir to write them"
            );
        }
        None => {}
    }

    if formatted.warning_count > 0 {
        tracing::info!(count = formatted.warning_count, "finished with warnings");
    }

    Ok(())
}

/// Writes one invoice as `<dir>/<id>.json`.
fn write_invoice(
    dir: &Path,
    index: usize,
    record: &InvoiceRecord,
    settings: &Settings,
    date: NaiveDate,
) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;

    let invoice = Invoice::from_record(record, settings, date);
    let path = dir.join(format!("{}.json", file_stem(&record.id, index)));
    let json = serde_json::to_string_pretty(&invoice).context("failed to serialize invoice")?;
    fs::write(&path, json).with_context(|| format!("failed to write {}", path.display()))?;

    tracing::info!(
        id = %invoice.id,
        total = invoice.total(),
        path = %path.display(),
        "wrote invoice"
    );
    Ok(path)
}

/// A file name for an invoice id, or `invoice-<n>` when the id is empty.
fn file_stem(id: &str, index: usize) -> String {
    let stem: String = id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if stem.is_empty() {
        format!("invoice-{}", index + 1)
    } else {
        stem
    }
}
