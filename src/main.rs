mod handlers;
mod models;

use clap::{Parser, Subcommand};
use handlers::schema::{ApiClient, DiffOutcome, SchemaError, apply_handler, sync_handler};
use models::{AppConfig, SchemaFiles};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "schema-sync",
    version,
    about = "Copy a CMS schema from a source instance to a destination instance"
)]
struct Cli {
    /// key=value file holding the instance URLs and tokens.
    #[arg(long, env = "SCHEMA_SYNC_ENV_FILE", default_value = ".env", global = true)]
    env_file: PathBuf,

    /// Directory for snapshots and the computed diff.
    #[arg(long, env = "SCHEMA_SYNC_SNAPSHOTS_DIR", default_value = "snapshots", global = true)]
    snapshots_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, Subcommand)]
enum Command {
    /// Export both snapshots and store the diff the destination computes.
    Sync,
    /// Apply the stored diff to the destination.
    Apply,
}

impl Command {
    fn label(self) -> &'static str {
        match self {
            Command::Sync => "Sync",
            Command::Apply => "Apply",
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    let command = cli.command;

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} failed: {}", command.label(), e);
            ExitCode::from(1)
        }
    }
}

async fn run(cli: Cli) -> Result<(), SchemaError> {
    let config = AppConfig::from_env(&cli.env_file)?;
    let files = SchemaFiles::new(&cli.snapshots_dir);
    let client = ApiClient::new();

    match cli.command {
        Command::Sync => {
            if let DiffOutcome::Written(path) = sync_handler(&config, &files, &client).await? {
                tracing::debug!(path = %path.display(), "diff ready to apply");
            }
        }
        Command::Apply => {
            apply_handler(&config, &files, &client).await?;
        }
    }

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
