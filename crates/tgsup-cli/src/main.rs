//! CLI entry point.
//!
//! Loads `.env`, installs the tracing subscriber and dispatches to the
//! command handlers.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use tgsup_cli::{Cli, CliError, Commands, handlers};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.default_log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli.command).await {
        eprintln!("Error: {e:#}");
        let code = e.downcast_ref::<CliError>().map_or(1, CliError::exit_code);
        std::process::exit(code);
    }
}

async fn run(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Run {
            server,
            stats_interval,
            ready_timeout,
        } => handlers::run::execute(server, stats_interval, ready_timeout).await,
        Commands::Version { executable } => handlers::version::execute(&executable).await,
        Commands::Stats {
            port,
            json,
            timeout,
        } => handlers::stats::execute(port, json, timeout).await,
        Commands::Parse { file, json } => handlers::parse::execute(&file, json),
    }
}
