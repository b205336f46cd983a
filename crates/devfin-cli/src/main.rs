mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::schedule::ScheduleArgs;
use commands::simplified::SimplifiedArgs;

/// Development project financial schedules
#[derive(Parser)]
#[command(
    name = "devfin",
    version,
    about = "Year-by-year financial schedules for real-estate development projects",
    long_about = "Builds debt, capitalised interest, inventory, presales collection, \
                  revenue recognition, P&L, tax and cash schedules for a development \
                  project with decimal precision. Input is JSON or YAML, from a file \
                  or piped on stdin."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log engine stages to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a schedule from project totals, periods and a presales schedule
    Schedule(ScheduleArgs),
    /// Build a schedule from pipeline parameters (sales shares, ASP escalation)
    Simplified(SimplifiedArgs),
    /// Run the built-in sample project
    Demo,
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Schedule(args) => commands::schedule::run_schedule(args),
        Commands::Simplified(args) => commands::simplified::run_simplified(args),
        Commands::Demo => commands::demo::run_demo(),
        Commands::Version => {
            println!("devfin {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
