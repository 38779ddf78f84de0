//! Run command handler.
//!
//! Launches the server in the foreground, forwards its output to the
//! terminal and stops it on Ctrl-C.

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tgsup_core::{OutputLine, OutputSinkPort};
use tgsup_runtime::BotApiServer;
use tokio::time::{Interval, MissedTickBehavior, interval};
use tracing::{info, warn};

use crate::commands::ServerArgs;
use crate::error::CliError;
use crate::presentation::display_statistics;

/// How often the foreground loop checks that the server is still alive.
const LIVENESS_INTERVAL: Duration = Duration::from_millis(500);

/// Execute the run command.
///
/// # Errors
///
/// Returns an error if the options are invalid, the server fails to
/// launch or become ready, or the server exits before Ctrl-C.
pub async fn execute(
    server: ServerArgs,
    stats_interval: Option<u64>,
    ready_timeout: Option<u64>,
) -> Result<()> {
    let options = server.into_options();
    if (stats_interval.is_some() || ready_timeout.is_some()) && options.http_stat_port.is_none() {
        return Err(CliError::Config(
            "--stats-interval and --ready-timeout require --http-stat-port".to_string(),
        )
        .into());
    }

    let supervisor = BotApiServer::new(options).map_err(CliError::from)?;
    let sink: Arc<dyn OutputSinkPort> = Arc::new(|line: OutputLine| eprintln!("{line}"));
    let pid = supervisor.start(Some(sink)).await.map_err(CliError::from)?;
    println!("Server started (pid {pid}). Press Ctrl-C to stop.");

    if let Some(secs) = ready_timeout {
        if let Err(e) = supervisor.wait_until_ready(Duration::from_secs(secs)).await {
            shutdown(&supervisor).await;
            return Err(CliError::from(e).into());
        }
        println!("Statistics endpoint is answering.");
    }

    let mut stats_ticker = stats_interval.filter(|secs| *secs > 0).map(|secs| {
        let mut ticker = interval(Duration::from_secs(secs));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker
    });
    let mut liveness = interval(LIVENESS_INTERVAL);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            signal = &mut ctrl_c => {
                if let Err(e) = signal {
                    warn!(error = %e, "Failed to listen for Ctrl-C, stopping server");
                }
                info!("Interrupt received, stopping server");
                break;
            }
            _ = liveness.tick() => {
                if !supervisor.is_running() {
                    shutdown(&supervisor).await;
                    return Err(CliError::Process("server exited unexpectedly".to_string()).into());
                }
            }
            () = next_tick(&mut stats_ticker) => {
                match supervisor.statistics().await {
                    Ok(snapshot) => display_statistics(&snapshot),
                    Err(e) => warn!(error = %e, "Failed to fetch statistics"),
                }
            }
        }
    }

    supervisor.stop().await.map_err(CliError::from)?;
    println!("Server stopped.");
    Ok(())
}

/// Wait for the next statistics tick, or forever when printing is off.
async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

async fn shutdown(supervisor: &BotApiServer) {
    if let Err(e) = supervisor.dispose().await {
        warn!(error = %e, "Failed to dispose server");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Cli;
    use crate::commands::Commands;
    use clap::Parser;

    #[tokio::test]
    async fn test_stats_interval_requires_stat_port() {
        let cli = Cli::parse_from([
            "tgsup",
            "run",
            "--api-id",
            "1",
            "--api-hash",
            "hash",
            "--stats-interval",
            "5",
        ]);
        let Commands::Run {
            server,
            stats_interval,
            ready_timeout,
        } = cli.command
        else {
            panic!("expected run command");
        };

        let err = execute(server, stats_interval, ready_timeout)
            .await
            .unwrap_err();
        let cli_err = err.downcast_ref::<CliError>().unwrap();
        assert_eq!(cli_err.exit_code(), 78);
    }

    #[tokio::test]
    async fn test_missing_executable_is_process_error() {
        let cli = Cli::parse_from([
            "tgsup",
            "run",
            "--api-id",
            "1",
            "--api-hash",
            "hash",
            "--executable",
            "/nonexistent/telegram-bot-api",
        ]);
        let Commands::Run { server, .. } = cli.command else {
            panic!("expected run command");
        };

        let err = execute(server, None, None).await.unwrap_err();
        let cli_err = err.downcast_ref::<CliError>().unwrap();
        assert!(matches!(cli_err, CliError::Process(_)));
    }
}
