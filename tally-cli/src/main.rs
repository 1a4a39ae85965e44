//! Tally CLI - Shared expenses in your terminal

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tally_core::PersonId;

mod commands;
mod output;

use commands::{balance, expense, group, person, settle, transfer};

/// Tally - split shared expenses within a group
#[derive(Parser)]
#[command(name = "tally", version, about, long_about = None)]
struct Cli {
    /// Act as this person instead of TALLY_PERSON or the saved active person
    #[arg(long = "as", value_name = "ID", global = true)]
    acting_person: Option<PersonId>,

    /// Print debug logs to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register people and choose who you act as
    Person {
        #[command(subcommand)]
        command: person::PersonCommands,
    },

    /// Create, join and inspect groups
    Group {
        #[command(subcommand)]
        command: group::GroupCommands,
    },

    /// Record and list group expenses
    Expense {
        #[command(subcommand)]
        command: expense::ExpenseCommands,
    },

    /// Record and list money handed between members
    Transfer {
        #[command(subcommand)]
        command: transfer::TransferCommands,
    },

    /// Show how far each member is from an even split
    Balance {
        /// Group ID
        group: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Propose the payments that settle a group
    Settle {
        /// Group ID
        group: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("Error: {:#}", e));
            // 2 for rejected input, 1 for everything else
            match e.downcast_ref::<tally_core::Error>() {
                Some(err) if err.is_client_error() => ExitCode::from(2),
                _ => ExitCode::FAILURE,
            }
        }
    }
}

/// Logs go to stderr so `--json` output stays parseable
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("TALLY_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let acting = cli.acting_person;
    match cli.command {
        Commands::Person { command } => person::run(command, acting).await,
        Commands::Group { command } => group::run(command, acting).await,
        Commands::Expense { command } => expense::run(command, acting).await,
        Commands::Transfer { command } => transfer::run(command, acting).await,
        Commands::Balance { group, json } => balance::run(group, json).await,
        Commands::Settle { group, json } => settle::run(group, json).await,
    }
}
