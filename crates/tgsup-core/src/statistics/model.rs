//! Statistics record model.

use serde::{Deserialize, Serialize};

/// Server-wide figures reported by the statistics endpoint.
///
/// Memory sizes are kept as the server prints them (for example `128MB`);
/// callers interpret the unit. Cumulative counters are `f64` so very large
/// totals survive without overflow. Counts and gauges are unsigned: a
/// negative value such as `active_requests\t-1` is dropped like any other
/// unparseable value and the field keeps its previous value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerStatistics {
    /// Seconds since the server started.
    ///
    /// `uptime` is a server-scoped key, so an `uptime` line inside a bot
    /// block also lands here and overwrites the server figure with the
    /// bot's. The server prints its own uptime first, so read this value
    /// with that in mind when bots are listed.
    pub uptime: f64,
    pub bot_count: u64,
    pub active_bot_count: u64,

    /// Resident set size.
    pub rss: String,
    /// Virtual memory size.
    pub vm: String,
    pub rss_peak: String,
    pub vm_peak: String,

    /// CPU utilisation percentages.
    pub total_cpu: f64,
    pub user_cpu: f64,
    pub system_cpu: f64,

    pub buffer_memory: String,

    pub active_webhook_connections: u64,
    pub active_requests: u64,
    pub active_network_queries: u64,

    pub request_count: f64,
    pub request_bytes: f64,
    pub request_file_count: f64,
    pub request_files_bytes: f64,
    pub request_max_bytes: f64,
    pub response_count: f64,
    pub response_count_ok: f64,
    pub response_count_error: f64,
    pub response_bytes: f64,
    pub update_count: f64,
}

/// Figures for one bot hosted by the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkerStatistics {
    /// Bot user id.
    pub id: i64,
    /// Seconds the bot has been served.
    ///
    /// Never filled by the parser: `uptime` lines are attributed to
    /// [`ServerStatistics::uptime`] even inside a bot block. Kept so callers
    /// with another source of per-bot uptime can record it.
    pub uptime: f64,
    /// Bot token, usually partially masked by the server.
    pub token: String,
    pub username: String,
    pub active_request_count: u64,
    /// Identifier of the most recently processed update.
    pub head_update_id: i64,
    pub requests_per_sec: f64,
    pub updates_per_sec: f64,
}

impl WorkerStatistics {
    /// Create an empty record for the bot with the given id.
    pub fn new(id: i64) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }
}

/// One parse result: the server record and its bots in order of appearance.
///
/// Duplicate bot ids are preserved as separate records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatisticsSnapshot {
    server: ServerStatistics,
    workers: Vec<WorkerStatistics>,
}

impl StatisticsSnapshot {
    pub const fn new(server: ServerStatistics, workers: Vec<WorkerStatistics>) -> Self {
        Self { server, workers }
    }

    pub const fn server(&self) -> &ServerStatistics {
        &self.server
    }

    pub fn workers(&self) -> &[WorkerStatistics] {
        &self.workers
    }

    /// Iterate over the bot records.
    pub fn iter(&self) -> std::slice::Iter<'_, WorkerStatistics> {
        self.workers.iter()
    }

    /// Number of bot records.
    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// First bot record with the given id.
    pub fn worker(&self, id: i64) -> Option<&WorkerStatistics> {
        self.workers.iter().find(|w| w.id == id)
    }

    /// Split into the server record and the bot records.
    pub fn into_parts(self) -> (ServerStatistics, Vec<WorkerStatistics>) {
        (self.server, self.workers)
    }
}

impl<'a> IntoIterator for &'a StatisticsSnapshot {
    type Item = &'a WorkerStatistics;
    type IntoIter = std::slice::Iter<'a, WorkerStatistics>;

    fn into_iter(self) -> Self::IntoIter {
        self.workers.iter()
    }
}

impl IntoIterator for StatisticsSnapshot {
    type Item = WorkerStatistics;
    type IntoIter = std::vec::IntoIter<WorkerStatistics>;

    fn into_iter(self) -> Self::IntoIter {
        self.workers.into_iter()
    }
}
