//! Supervisor for a single Telegram Bot API server process.
//!
//! Lifecycle is `created -> running -> disposed`. Stopping is terminal: a
//! stopped supervisor is disposed and rejects every further operation.
//! "Running" is never stored; it is re-derived from the child handle on
//! each query, so a crashed server reads as not running without any
//! background watcher.

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tgsup_core::{
    OutputSinkPort, ServerOptions, StatisticsSnapshot, StatisticsSourcePort, SupervisorError,
    SupervisorResult, parse_statistics,
};
use tokio::process::Child;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::command::{spawn_output_readers, spawn_server};
use crate::readiness::wait_for_statistics;
use crate::shutdown::terminate_child;
use crate::stats_source::HttpStatisticsSource;
use crate::version::query_version;

/// Cached pid value meaning "no process".
const UNSET_PID: i64 = -1;

/// Owns one `telegram-bot-api` child process.
///
/// Start, stop and dispose are serialised by an internal async lock, so
/// concurrent callers cannot launch two children or release one twice.
/// Two supervisors compare equal when their cached process ids are equal;
/// supervisors that never started (or were stopped) are all equal.
pub struct BotApiServer {
    options: ServerOptions,
    source: Arc<dyn StatisticsSourcePort>,
    /// Serialises lifecycle transitions.
    lifecycle: tokio::sync::Mutex<()>,
    child: Mutex<Option<Child>>,
    pid: AtomicI64,
    disposed: AtomicBool,
}

impl BotApiServer {
    /// Create a supervisor fetching statistics over HTTP.
    pub fn new(options: ServerOptions) -> SupervisorResult<Self> {
        Self::with_statistics_source(options, Arc::new(HttpStatisticsSource::new()))
    }

    /// Create a supervisor with a custom statistics source.
    pub fn with_statistics_source(
        options: ServerOptions,
        source: Arc<dyn StatisticsSourcePort>,
    ) -> SupervisorResult<Self> {
        options.validate()?;
        Ok(Self {
            options,
            source,
            lifecycle: tokio::sync::Mutex::new(()),
            child: Mutex::new(None),
            pid: AtomicI64::new(UNSET_PID),
            disposed: AtomicBool::new(false),
        })
    }

    pub const fn options(&self) -> &ServerOptions {
        &self.options
    }

    /// Process id of the supervised child, if one was started and not yet stopped.
    pub fn pid(&self) -> Option<u32> {
        u32::try_from(self.pid.load(Ordering::SeqCst)).ok()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    /// Whether the child process is alive right now.
    ///
    /// Requires a cached pid, a held handle, and a handle that has not
    /// exited. Checked against the OS on every call.
    pub fn is_running(&self) -> bool {
        if self.pid.load(Ordering::SeqCst) < 0 {
            return false;
        }

        let mut slot = self.child_slot();
        let Some(child) = slot.as_mut() else {
            return false;
        };

        match child.try_wait() {
            Ok(None) => true,
            Ok(Some(status)) => {
                debug!(pid = ?child.id(), ?status, "Server process has exited");
                false
            }
            Err(e) => {
                warn!(error = %e, "Failed to query server process status");
                false
            }
        }
    }

    /// Launch the server.
    ///
    /// Output lines are forwarded to `sink` as they arrive. Returns the new
    /// process id once the OS has created the process, without waiting for
    /// the server to become ready.
    pub async fn start(&self, sink: Option<Arc<dyn OutputSinkPort>>) -> SupervisorResult<u32> {
        let _guard = self.lifecycle.lock().await;
        self.ensure_not_disposed()?;
        if self.is_running() {
            return Err(SupervisorError::AlreadyRunning);
        }

        let mut child = spawn_server(&self.options)?;
        let pid = child.id().ok_or_else(|| SupervisorError::LaunchFailed {
            executable: self.options.executable.clone(),
            source: std::io::Error::other("process exited before its id could be read"),
        })?;

        spawn_output_readers(&mut child, pid, sink);

        let stale = self.child_slot().replace(child);
        if stale.is_some() {
            debug!("Released handle of previously exited server process");
        }
        self.pid.store(i64::from(pid), Ordering::SeqCst);

        info!(
            pid,
            executable = %self.options.executable.display(),
            http_port = self.options.http_port,
            "Telegram Bot API server started"
        );
        Ok(pid)
    }

    /// Terminate the server and dispose the supervisor.
    ///
    /// Blocks until the OS confirms the process exited. The supervisor
    /// cannot be restarted afterwards.
    pub async fn stop(&self) -> SupervisorResult<()> {
        let _guard = self.lifecycle.lock().await;
        self.ensure_not_disposed()?;
        if !self.is_running() {
            return Err(SupervisorError::NotRunning);
        }

        self.release().await
    }

    /// Dispose the supervisor, terminating the child if one is held.
    ///
    /// Idempotent: disposing twice is a no-op, and a server that is not
    /// running is not an error here.
    pub async fn dispose(&self) -> SupervisorResult<()> {
        let _guard = self.lifecycle.lock().await;
        if self.is_disposed() {
            return Ok(());
        }

        self.release().await
    }

    /// Query the executable's version string.
    ///
    /// Runs a separate short-lived invocation; works whether or not the
    /// supervised server is running.
    pub async fn version(&self) -> SupervisorResult<String> {
        self.ensure_not_disposed()?;
        query_version(&self.options.executable).await
    }

    /// Fetch and parse the server's current statistics.
    pub async fn statistics(&self) -> SupervisorResult<StatisticsSnapshot> {
        self.ensure_not_disposed()?;
        if !self.is_running() {
            return Err(SupervisorError::NotRunning);
        }
        let port = self.stat_port()?;

        let text = self.source.fetch(port).await?;
        Ok(parse_statistics(&text)?)
    }

    /// Wait until the statistics endpoint answers.
    ///
    /// Fails with `NotRunning` if the process exits first and with
    /// `NotReady` once `timeout` has elapsed.
    pub async fn wait_until_ready(&self, timeout: Duration) -> SupervisorResult<()> {
        self.ensure_not_disposed()?;
        let port = self.stat_port()?;
        wait_for_statistics(self.source.as_ref(), port, timeout, || self.is_running()).await
    }

    /// [`start`](Self::start) on a background task, abandonable via `cancel`.
    pub async fn start_cancellable(
        self: &Arc<Self>,
        sink: Option<Arc<dyn OutputSinkPort>>,
        cancel: &CancellationToken,
    ) -> SupervisorResult<u32> {
        let this = Arc::clone(self);
        run_detached(cancel, async move { this.start(sink).await }).await
    }

    /// [`stop`](Self::stop) on a background task, abandonable via `cancel`.
    pub async fn stop_cancellable(self: &Arc<Self>, cancel: &CancellationToken) -> SupervisorResult<()> {
        let this = Arc::clone(self);
        run_detached(cancel, async move { this.stop().await }).await
    }

    /// [`version`](Self::version) on a background task, abandonable via `cancel`.
    pub async fn version_cancellable(
        self: &Arc<Self>,
        cancel: &CancellationToken,
    ) -> SupervisorResult<String> {
        let this = Arc::clone(self);
        run_detached(cancel, async move { this.version().await }).await
    }

    /// [`statistics`](Self::statistics) on a background task, abandonable via `cancel`.
    pub async fn statistics_cancellable(
        self: &Arc<Self>,
        cancel: &CancellationToken,
    ) -> SupervisorResult<StatisticsSnapshot> {
        let this = Arc::clone(self);
        run_detached(cancel, async move { this.statistics().await }).await
    }

    /// Kill and reap the child, clear the pid, and mark disposed.
    ///
    /// Callers hold the lifecycle lock. The handle is released even when
    /// termination reports an error.
    async fn release(&self) -> SupervisorResult<()> {
        let child = self.child_slot().take();
        let pid = self.pid.swap(UNSET_PID, Ordering::SeqCst);
        self.disposed.store(true, Ordering::SeqCst);

        let Some(child) = child else {
            debug!("Disposed supervisor with no server process");
            return Ok(());
        };

        let status = terminate_child(child, self.options.shutdown_grace)
            .await
            .map_err(SupervisorError::Terminate)?;
        info!(pid, ?status, "Telegram Bot API server stopped");
        Ok(())
    }

    fn ensure_not_disposed(&self) -> SupervisorResult<()> {
        if self.is_disposed() {
            return Err(SupervisorError::AlreadyDisposed);
        }
        Ok(())
    }

    fn stat_port(&self) -> SupervisorResult<u16> {
        self.options
            .http_stat_port
            .ok_or(SupervisorError::ConfigurationMissing("http_stat_port"))
    }

    fn child_slot(&self) -> MutexGuard<'_, Option<Child>> {
        self.child.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Run `work` on a spawned task and wait for it unless `cancel` fires first.
///
/// Cancellation only releases the caller; the task keeps running to
/// completion in the background.
async fn run_detached<T, F>(cancel: &CancellationToken, work: F) -> SupervisorResult<T>
where
    T: Send + 'static,
    F: Future<Output = SupervisorResult<T>> + Send + 'static,
{
    if cancel.is_cancelled() {
        return Err(SupervisorError::Cancelled);
    }

    let task = tokio::spawn(work);
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(SupervisorError::Cancelled),
        joined = task => joined.map_err(|e| SupervisorError::Task(e.to_string()))?,
    }
}

impl PartialEq for BotApiServer {
    fn eq(&self, other: &Self) -> bool {
        self.pid.load(Ordering::SeqCst) == other.pid.load(Ordering::SeqCst)
    }
}

impl Eq for BotApiServer {}

impl std::fmt::Debug for BotApiServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotApiServer")
            .field("executable", &self.options.executable)
            .field("pid", &self.pid())
            .field("disposed", &self.is_disposed())
            .finish_non_exhaustive()
    }
}

// Drop cannot await, so the child is only signalled here; tokio reaps it
// in the background. Call `stop` or `dispose` to wait for exit.
impl Drop for BotApiServer {
    fn drop(&mut self) {
        let slot = self.child.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(mut child) = slot.take() {
            if let Err(e) = child.start_kill() {
                debug!(error = %e, "Server process already gone at drop");
            }
        }
    }
}
