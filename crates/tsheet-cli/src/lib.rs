//! Timesheet reformatter CLI library.
//!
//! This crate provides the CLI interface for the timesheet reformatter.

mod cli;
pub mod commands;
mod config;
pub mod frontmatter;

pub use cli::{Cli, Commands, FormatArgs, InputArgs};
pub use config::load_settings;
