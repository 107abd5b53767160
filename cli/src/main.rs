mod commands;
mod config;
mod server;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process;

use crate::commands::{cmd_entries, cmd_history, cmd_log, cmd_summary};
use crate::config::Config;
use nibble_core::service::NibbleService;

#[derive(Parser)]
#[command(name = "nibble", version, about = "A simple calorie logging tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log a food entry
    Log {
        /// Food name
        name: String,
        /// Calories (nonnegative integer)
        calories: i64,
        /// Timestamp to log at (RFC 3339, e.g. 2024-01-15T12:30:00Z; default: now)
        #[arg(long)]
        at: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List entries for a day (defaults to today)
    Entries {
        /// Date to show (YYYY-MM-DD, "today" or "yesterday")
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show daily summary (defaults to today)
    Summary {
        /// Date to show (YYYY-MM-DD, "today" or "yesterday")
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show daily totals for the last N days
    History {
        /// Number of days to show
        #[arg(short, long, default_value = "7")]
        days: u32,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Start the REST API server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,
        /// Address to bind to (default: 127.0.0.1, use 0.0.0.0 to expose to network)
        #[arg(short, long, default_value = "127.0.0.1")]
        bind: String,
        /// Disable API key authentication (for development/testing)
        #[arg(long)]
        no_auth: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let svc = NibbleService::new(&config.db_path)?;

    match cli.command {
        Commands::Log {
            name,
            calories,
            at,
            json,
        } => cmd_log(&svc, &name, calories, at, json),
        Commands::Entries { date, json } => cmd_entries(&svc, date, json),
        Commands::Summary { date, json } => cmd_summary(&svc, date, json),
        Commands::History { days, json } => cmd_history(&svc, days, json),
        Commands::Serve {
            port,
            bind,
            no_auth,
        } => {
            let api_key = if no_auth {
                None
            } else {
                Some(config.load_or_create_api_key()?)
            };
            server::start_server(svc, port, &bind, api_key).await
        }
    }
}
