mod cmd;
mod credentials;
mod output;
mod prompt;

use clap::{Parser, Subcommand};
use cmd::{sync::SyncArgs, RunStatus};
use std::path::PathBuf;
use usersync_core::config::Settings;

/// Exit status when every directive ran but at least one failed.
const EXIT_COMPLETED_WITH_ERRORS: i32 = 2;

#[derive(Parser)]
#[command(
    name = "wpe-usersync",
    about = "Add, update and remove WP Engine account users from a CSV file",
    version,
    propagate_version = true
)]
struct Cli {
    /// Settings file (default: ./usersync.yaml when present)
    #[arg(long, global = true, env = "USERSYNC_CONFIG")]
    config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    /// More diagnostic output (-v info, -vv debug)
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply the CSV to the directory (dry run unless --dryrun false)
    Sync(SyncArgs),

    /// Check a CSV file offline without contacting the API
    Validate {
        /// CSV file to check
        csv_file: PathBuf,
    },
}

fn main() {
    // Must run before parsing so `.env` can feed the env-backed flags.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Sync(args) => {
            let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            Settings::discover(cli.config.as_deref(), &cwd)
                .map_err(anyhow::Error::from)
                .and_then(|settings| cmd::sync::run(args, &settings, cli.json))
        }
        Commands::Validate { csv_file } => {
            cmd::validate::run(&csv_file, cli.json).map(|()| RunStatus::Completed)
        }
    };

    match result {
        Ok(RunStatus::Completed) => {}
        Ok(RunStatus::CompletedWithErrors) => std::process::exit(EXIT_COMPLETED_WITH_ERRORS),
        Err(e) => {
            // Print the full error chain (anyhow's alternate Display)
            eprintln!("error: {e:#}");
            std::process::exit(1);
        }
    }
}
