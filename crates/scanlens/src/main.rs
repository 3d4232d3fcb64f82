//! Scanlens launcher
//!
//! Command-line host for scan report review:
//! - **show**: filtered, sorted record tables per test case
//! - **check**: validate a filter expression and print its canonical form
//! - **suggest**: completion candidates for a partially typed filter

use clap::{Parser, Subcommand};
use scanlens::cli;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "scanlens", about = "Diagnostic scan report review")]
struct Cli {
    /// Enable verbose logging
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Display records of a scan report, optionally filtered
    Show {
        /// Path to the scan report JSON file
        report: PathBuf,

        /// Filter expression, e.g. 'request.name == read_dtc && uid != 0x10'
        #[arg(short, long)]
        filter: Option<String>,

        /// Restrict output to one test case by name
        #[arg(short, long)]
        case: Option<String>,

        /// Column to sort by
        #[arg(long, value_enum, default_value = "uid")]
        sort: cli::show::SortColumn,

        /// Sort direction
        #[arg(long, value_enum, default_value = "asc")]
        order: cli::show::SortOrder,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Parse a filter expression and print its canonical form
    Check {
        /// Filter expression to validate
        filter: String,
    },

    /// Suggest completions for a partially typed filter
    Suggest {
        /// Path to the scan report JSON file
        report: PathBuf,

        /// Partial filter text
        text: String,

        /// Build suggestions from this test case (default: first in report)
        #[arg(short, long)]
        case: Option<String>,

        /// Cursor position in characters (default: end of text)
        #[arg(long)]
        cursor: Option<usize>,
    },
}

fn command_wants_json(command: &Commands) -> bool {
    match command {
        Commands::Show { json, .. } => *json,
        _ => false,
    }
}

fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Show {
            report,
            filter,
            case,
            sort,
            order,
            json,
        } => cli::show::run(cli::show::ShowArgs {
            report,
            filter,
            case,
            sort,
            order,
            json,
        }),

        Commands::Check { filter } => cli::check::run(cli::check::CheckArgs { filter }),

        Commands::Suggest {
            report,
            text,
            case,
            cursor,
        } => cli::suggest::run(cli::suggest::SuggestArgs {
            report,
            case,
            text,
            cursor,
        }),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "scanlens=debug,scanlens_filter=debug,scanlens_report=debug"
    } else {
        "scanlens=info"
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    // Logs go to stderr so table and JSON output stay clean on stdout.
    let json_mode = command_wants_json(&cli.command);
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if json_mode {
                eprintln!(
                    "{}",
                    serde_json::json!({ "error": format!("{:#}", err) })
                );
            } else {
                eprintln!("Error: {:#}", err);
            }
            ExitCode::from(1)
        }
    }
}
