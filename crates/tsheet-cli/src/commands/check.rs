//! `tsheet check`: parse a timesheet and list its warnings.

use std::io::Write;

use anyhow::{Context, Result};
use tsheet_core::{format_hours, process};

use super::input::Input;

pub fn run<W: Write>(writer: &mut W, input: &Input) -> Result<()> {
    let report = process(&input.body, &input.settings).context("timesheet check failed")?;

    for warning in &report.warnings {
        writeln!(writer, "warning: {warning}")?;
    }

    let invoiced = report.invoices.iter().fold(0.0, |acc, r| acc + r.hours);
    writeln!(
        writer,
        "{} warnings, {} invoices, {} hours invoiced",
        report.warnings.len(),
        report.invoices.len(),
        format_hours(Some(invoiced))
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use tsheet_core::Settings;

    #[test]
    fn check_lists_warnings() {
        let input = Input {
            settings: Settings::default(),
            header: Vec::new(),
            body: vec![
                "2015-06-05 6".to_string(),
                "2015-06-04 2".to_string(),
                "==== # INV1".to_string(),
            ],
            backup: None,
        };
        let mut output = Vec::new();

        run(&mut output, &input).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert_eq!(
            output,
            "warning: 2015-06-04: date goes backwards (previous line was 2015-06-05)\n\
             1 warnings, 1 invoices, 8 hours invoiced\n"
        );
    }
}
