use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tsheet_cli::commands::{check, format, input};
use tsheet_cli::{Cli, Commands};

/// Builds the log filter from the larger of the `-v` count and the
/// `verbose` setting; `RUST_LOG` applies when both are zero.
fn log_filter(verbose: u8) -> EnvFilter {
    match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    }
}

fn init_tracing(verbose: u8) {
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(log_filter(verbose))
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.config.as_deref();
    let mut stdout = std::io::stdout().lock();

    match &cli.command {
        Some(Commands::Format(args)) => {
            let input = input::load(&args.input.file, args.out.as_deref(), config)?;
            init_tracing(cli.verbose.max(input.settings.verbose));
            tracing::debug!(settings = ?input.settings, "loaded settings");
            format::run(&mut stdout, args, &input)?;
        }
        Some(Commands::Check(args)) => {
            let input = input::load(&args.file, None, config)?;
            init_tracing(cli.verbose.max(input.settings.verbose));
            check::run(&mut stdout, &input)?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
