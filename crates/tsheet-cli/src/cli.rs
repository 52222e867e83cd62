//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Timesheet reformatter.
///
/// Rewrites hand-typed timesheet lines into a canonical layout, adds weekly
/// summaries, and collects hours for invoices.
#[derive(Debug, Parser)]
#[command(name = "tsheet", version, about, long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to a settings file (TOML).
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Reformat a timesheet and emit summaries and invoices.
    Format(FormatArgs),

    /// Parse a timesheet and report warnings without writing anything.
    Check(InputArgs),
}

/// The timesheet to read.
#[derive(Debug, Clone, Args)]
pub struct InputArgs {
    /// Timesheet file to read.
    #[arg(short, long)]
    pub file: PathBuf,
}

#[derive(Debug, Clone, Args)]
pub struct FormatArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Write the result here instead of stdout. May be the input file, in
    /// which case a `.backup` copy is made first.
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Directory to write one JSON document per invoice.
    #[arg(long)]
    pub invoice_dir: Option<PathBuf>,

    /// Print each input line followed by its rewrite.
    #[arg(long)]
    pub echo: bool,
}
