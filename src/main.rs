use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use pgchangeset::commands::{self, InspectFormat, OutputOptions};
use pgchangeset::config::{self, Config, DatabaseArgs};
use pgchangeset::constants::CONFIG_FILENAME;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(long, default_value = CONFIG_FILENAME, global = true)]
    config_file: String,

    /// Prefix for environment variable names (APP_ reads APP_DATABASE_URL)
    #[arg(long, global = true)]
    env_prefix: Option<String>,

    /// Enable verbose output (info level, one line per changeset)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Suppress all non-essential output (error level only)
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    /// Enable debug output (debug level)
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Migration commands
    Migrate {
        #[command(subcommand)]
        command: MigrateCommands,
    },

    /// Parse a changelog file and print its changesets without touching a database
    Inspect {
        /// Root changelog file
        file: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: InspectFormat,
    },
}

#[derive(Subcommand)]
enum MigrateCommands {
    /// Apply pending changesets in file order
    All {
        /// Root changelog file
        file: PathBuf,

        /// Apply at most N changesets (0 applies all)
        #[arg(long, default_value_t = 0)]
        max: usize,

        #[command(flatten)]
        database_args: DatabaseArgs,
    },

    /// Roll back applied changesets, most recent first
    Reset {
        /// Root changelog file; must still contain every applied changeset
        file: PathBuf,

        /// Roll back at most N changesets (0 rolls back all)
        #[arg(long, default_value_t = 0)]
        max: usize,

        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,

        #[command(flatten)]
        database_args: DatabaseArgs,
    },

    /// Show which changesets are applied, pending or modified
    Status {
        /// Root changelog file
        file: PathBuf,

        #[command(flatten)]
        database_args: DatabaseArgs,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();
    initialize_logging(&cli);
    tokio::select! {
        result = run_main(cli) => result,
        _ = wait_for_shutdown_signal() => {
            warn!("Received shutdown signal, open transaction is rolled back");
            Err(anyhow!("Interrupted"))
        }
    }
}

async fn wait_for_shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

fn initialize_logging(cli: &Cli) {
    let level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };

    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(level)
    };

    fmt().with_env_filter(filter).with_target(false).init();
}

fn resolve_config(cli: &Cli, database_args: &DatabaseArgs) -> Result<Config> {
    let file_config = config::load_config(&cli.config_file)?;
    let cli_config = database_args
        .clone()
        .into_config_input(cli.env_prefix.clone());

    config::ConfigBuilder::new()
        .with_file(file_config)
        .with_cli_args(cli_config)
        .resolve()
}

async fn run_main(cli: Cli) -> Result<()> {
    let output = OutputOptions {
        verbose: cli.verbose || cli.debug,
        quiet: cli.quiet,
    };

    match &cli.command {
        Commands::Inspect { file, format } => commands::cmd_inspect(file, *format),
        Commands::Migrate { command } => match command {
            MigrateCommands::All {
                file,
                max,
                database_args,
            } => {
                let config = resolve_config(&cli, database_args)?;
                info!("Applying changesets from {}", file.display());
                commands::cmd_migrate_all(&config, file, *max, output).await
            }
            MigrateCommands::Reset {
                file,
                max,
                yes,
                database_args,
            } => {
                let config = resolve_config(&cli, database_args)?;
                info!("Rolling back changesets from {}", file.display());
                commands::cmd_migrate_reset(&config, file, *max, *yes, output).await
            }
            MigrateCommands::Status {
                file,
                database_args,
            } => {
                let config = resolve_config(&cli, database_args)?;
                info!("Checking changeset status");
                commands::cmd_migrate_status(&config, file).await
            }
        },
    }
}
