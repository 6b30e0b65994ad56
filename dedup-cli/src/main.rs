//! Dedup CLI
//!
//! Command-line interface for finding and resolving duplicate contacts.

mod commands;
mod config;
mod display;

use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use tracing_subscriber::EnvFilter;

use commands::contacts::NewContact;
use config::CliConfig;

#[derive(Parser)]
#[command(name = "dedup")]
#[command(version, about = "Find and resolve duplicate contacts")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Data directory (default: ~/.dedup)
    #[arg(long, global = true, env = "DEDUP_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage contacts
    #[command(subcommand)]
    Contacts(ContactCommands),

    /// Compare every pair of contacts and record new duplicates
    Scan,

    /// List pending duplicates, highest score first
    Pending,

    /// Check one contact against all others
    Check {
        /// Contact ID
        contact_id: i64,
    },

    /// Merge a duplicate pair, deleting the contact not kept
    Merge {
        /// Pair ID
        pair_id: i64,

        /// Contact ID to keep
        #[arg(long)]
        keep: i64,
    },

    /// Mark a pair as not a duplicate
    Ignore {
        /// Pair ID
        pair_id: i64,
    },

    /// Show duplicate statistics
    Stats,

    /// Generate shell completions
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum ContactCommands {
    /// Add a contact
    Add {
        #[arg(long)]
        first: Option<String>,
        #[arg(long)]
        middle: Option<String>,
        #[arg(long)]
        last: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },

    /// List all contacts
    List,

    /// Import contacts from a JSON array
    ///
    /// Contacts are stored one at a time. If a write fails, the contacts
    /// stored before it are kept.
    Import {
        /// Input file path
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    // Logs go to stderr so stdout stays parseable
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("dedup=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = CliConfig::resolve(cli.data_dir, cli.json);

    match cli.command {
        Commands::Contacts(cmd) => match cmd {
            ContactCommands::Add {
                first,
                middle,
                last,
                email,
                phone,
            } => {
                let fields = NewContact {
                    first,
                    middle,
                    last,
                    email,
                    phone,
                };
                commands::contacts::add(&config, fields)?;
            }
            ContactCommands::List => commands::contacts::list(&config)?,
            ContactCommands::Import { file } => commands::contacts::import(&config, &file)?,
        },
        Commands::Scan => commands::duplicates::scan(&config)?,
        Commands::Pending => commands::duplicates::pending(&config)?,
        Commands::Check { contact_id } => commands::duplicates::check(&config, contact_id)?,
        Commands::Merge { pair_id, keep } => commands::duplicates::merge(&config, pair_id, keep)?,
        Commands::Ignore { pair_id } => commands::duplicates::ignore(&config, pair_id)?,
        Commands::Stats => commands::duplicates::stats(&config)?,
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "dedup", &mut io::stdout());
        }
    }

    Ok(())
}
