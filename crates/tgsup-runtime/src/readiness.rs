//! Readiness polling against the statistics endpoint.

use std::time::{Duration, Instant};
use tgsup_core::{StatisticsSourcePort, SupervisorError, SupervisorResult};
use tokio::time::sleep;
use tracing::{debug, info};

/// Delay between readiness probes.
pub const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Poll the statistics endpoint until it answers.
///
/// `alive` is checked before every probe so a server that dies during
/// startup fails fast with `NotRunning` instead of waiting out `timeout`.
pub async fn wait_for_statistics(
    source: &dyn StatisticsSourcePort,
    port: u16,
    timeout: Duration,
    alive: impl Fn() -> bool,
) -> SupervisorResult<()> {
    let started = Instant::now();
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;
        if !alive() {
            return Err(SupervisorError::NotRunning);
        }

        match source.fetch(port).await {
            Ok(_) => {
                info!(port, attempt, "Statistics endpoint is ready");
                return Ok(());
            }
            Err(e) => debug!(port, attempt, error = %e, "Statistics endpoint not ready, retrying"),
        }

        if started.elapsed() >= timeout {
            return Err(SupervisorError::NotReady {
                port,
                waited_secs: timeout.as_secs(),
            });
        }
        sleep(POLL_INTERVAL).await;
    }
}
