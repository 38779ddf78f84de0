//! Parser for the server's plaintext statistics document.
//!
//! The document is a list of `key<TAB>value` lines. Server-wide fields come
//! first, then one block per bot. A block starts at an `id` line; there is
//! no other delimiter. The parser is an accumulator holding the server
//! record, the bot records seen so far and the index of the open bot.
//!
//! Malformed lines and values are dropped, never fatal. Only an input with
//! no visible characters is rejected.

use regex::Regex;
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;
use tracing::trace;

use super::model::{ServerStatistics, StatisticsSnapshot, WorkerStatistics};

/// A whole value of the form `12.34%`, `.5%` or `3 %`.
///
/// Anchored at both ends so a malformed mantissa such as `1e2%` or `12,5%`
/// is rejected outright instead of matching its numeric tail.
static PERCENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([+-]?(?:\d+(?:\.\d*)?|\.\d+))\s*%$").expect("percentage pattern is valid")
});

/// Whole-input parse failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StatsParseError {
    #[error("statistics text is empty or whitespace-only")]
    InvalidInput,
}

/// Parse a statistics document into a snapshot.
///
/// Keys are matched case-insensitively. Unknown keys, lines without a tab,
/// and values that fail to parse are skipped; the affected field keeps its
/// previous value. When a line carries more than one value column only the
/// first is read.
pub fn parse_statistics(text: &str) -> Result<StatisticsSnapshot, StatsParseError> {
    if text.trim().is_empty() {
        return Err(StatsParseError::InvalidInput);
    }

    let mut acc = Accumulator::default();
    for line in text.lines() {
        let mut columns = line.split('\t');
        let (Some(key), Some(value)) = (columns.next(), columns.next()) else {
            continue;
        };

        let key = key.trim();
        let value = value.trim();
        if key.is_empty() || value.is_empty() {
            continue;
        }

        acc.apply(&key.to_ascii_lowercase(), value);
    }

    Ok(acc.finish())
}

/// Non-failing variant of [`parse_statistics`].
pub fn try_parse_statistics(text: &str) -> Option<StatisticsSnapshot> {
    parse_statistics(text).ok()
}

impl FromStr for StatisticsSnapshot {
    type Err = StatsParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_statistics(s)
    }
}

#[derive(Default)]
struct Accumulator {
    server: ServerStatistics,
    workers: Vec<WorkerStatistics>,
    /// Index into `workers` of the bot block currently being filled.
    current: Option<usize>,
}

impl Accumulator {
    fn apply(&mut self, key: &str, value: &str) {
        match key {
            "id" => self.open_worker(value),
            "token" | "username" | "active_request_count" | "head_update_id"
            | "request_count/sec" | "update_count/sec" => self.apply_worker(key, value),
            _ => self.apply_server(key, value),
        }
    }

    fn open_worker(&mut self, value: &str) {
        match value.parse::<i64>() {
            Ok(id) => {
                self.workers.push(WorkerStatistics::new(id));
                self.current = Some(self.workers.len() - 1);
            }
            Err(_) => trace!(value, "ignoring unparseable bot id"),
        }
    }

    fn apply_worker(&mut self, key: &str, value: &str) {
        let Some(worker) = self.current.and_then(|i| self.workers.get_mut(i)) else {
            trace!(key, "bot field before any id line");
            return;
        };

        match key {
            "token" => worker.token = value.to_string(),
            "username" => worker.username = value.to_string(),
            "active_request_count" => set_parsed(&mut worker.active_request_count, key, value),
            "head_update_id" => set_parsed(&mut worker.head_update_id, key, value),
            "request_count/sec" => set_parsed(&mut worker.requests_per_sec, key, value),
            "update_count/sec" => set_parsed(&mut worker.updates_per_sec, key, value),
            _ => {}
        }
    }

    fn apply_server(&mut self, key: &str, value: &str) {
        let s = &mut self.server;
        match key {
            "uptime" => set_parsed(&mut s.uptime, key, value),
            "bot_count" => set_parsed(&mut s.bot_count, key, value),
            "active_bot_count" => set_parsed(&mut s.active_bot_count, key, value),
            "rss" => s.rss = value.to_string(),
            "vm" => s.vm = value.to_string(),
            "rss_peak" => s.rss_peak = value.to_string(),
            "vm_peak" => s.vm_peak = value.to_string(),
            "total_cpu" => set_percent(&mut s.total_cpu, key, value),
            "user_cpu" => set_percent(&mut s.user_cpu, key, value),
            "system_cpu" => set_percent(&mut s.system_cpu, key, value),
            "buffer_memory" => s.buffer_memory = value.to_string(),
            "active_webhook_connections" => {
                set_parsed(&mut s.active_webhook_connections, key, value);
            }
            "active_requests" => set_parsed(&mut s.active_requests, key, value),
            "active_network_queries" => set_parsed(&mut s.active_network_queries, key, value),
            "request_count" => set_parsed(&mut s.request_count, key, value),
            "request_bytes" => set_parsed(&mut s.request_bytes, key, value),
            "request_file_count" => set_parsed(&mut s.request_file_count, key, value),
            "request_files_bytes" => set_parsed(&mut s.request_files_bytes, key, value),
            "request_max_bytes" => set_parsed(&mut s.request_max_bytes, key, value),
            "response_count" => set_parsed(&mut s.response_count, key, value),
            "response_count_ok" => set_parsed(&mut s.response_count_ok, key, value),
            "response_count_error" => set_parsed(&mut s.response_count_error, key, value),
            "response_bytes" => set_parsed(&mut s.response_bytes, key, value),
            "update_count" => set_parsed(&mut s.update_count, key, value),
            _ => trace!(key, "ignoring unknown statistics key"),
        }
    }

    fn finish(self) -> StatisticsSnapshot {
        StatisticsSnapshot::new(self.server, self.workers)
    }
}

fn set_parsed<T: FromStr>(slot: &mut T, key: &str, value: &str) {
    match value.parse() {
        Ok(parsed) => *slot = parsed,
        Err(_) => trace!(key, value, "dropping unparseable value"),
    }
}

fn set_percent(slot: &mut f64, key: &str, value: &str) {
    let mantissa = PERCENT_RE
        .captures(value)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok());

    match mantissa {
        Some(percent) => *slot = percent,
        None => trace!(key, value, "dropping value without a percentage"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_whitespace_rejected() {
        assert_eq!(parse_statistics(""), Err(StatsParseError::InvalidInput));
        assert_eq!(
            parse_statistics(" \t\r\n  "),
            Err(StatsParseError::InvalidInput)
        );
        assert!(try_parse_statistics("\n\n").is_none());
    }

    #[test]
    fn test_cpu_percentage() {
        let snap = parse_statistics("total_cpu\t7.50%\nuser_cpu\t3%\nsystem_cpu\t 4.5 %").unwrap();
        assert!((snap.server().total_cpu - 7.5).abs() < f64::EPSILON);
        assert!((snap.server().user_cpu - 3.0).abs() < f64::EPSILON);
        assert!((snap.server().system_cpu - 4.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_cpu_garbage_keeps_previous() {
        let snap = parse_statistics("total_cpu\tgarbage").unwrap();
        assert!(snap.server().total_cpu.abs() < f64::EPSILON);

        let snap = parse_statistics("total_cpu\t12.25%\ntotal_cpu\tgarbage").unwrap();
        assert!((snap.server().total_cpu - 12.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_cpu_leading_dot_mantissa() {
        let snap = parse_statistics("total_cpu\t.5%\nuser_cpu\t-0.25%\nsystem_cpu\t7.%").unwrap();
        assert!((snap.server().total_cpu - 0.5).abs() < f64::EPSILON);
        assert!((snap.server().user_cpu + 0.25).abs() < f64::EPSILON);
        assert!((snap.server().system_cpu - 7.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_cpu_malformed_mantissa_keeps_previous() {
        for bad in ["1e2%", "12,5%", "abc%", "5%%", "%", "50% busy", "load 3%"] {
            let text = format!("total_cpu\t9.75%\ntotal_cpu\t{bad}");
            let snap = parse_statistics(&text).unwrap();
            assert!(
                (snap.server().total_cpu - 9.75).abs() < f64::EPSILON,
                "{bad:?} overwrote total_cpu with {}",
                snap.server().total_cpu
            );
        }
    }

    #[test]
    fn test_cpu_requires_percent_sign() {
        let snap = parse_statistics("total_cpu\t42.0").unwrap();
        assert!(snap.server().total_cpu.abs() < f64::EPSILON);
    }

    #[test]
    fn test_keys_are_case_insensitive_and_trimmed() {
        let snap = parse_statistics("  BOT_COUNT \t 3 \nId\t7\nUserName\tAlice").unwrap();
        assert_eq!(snap.server().bot_count, 3);
        assert_eq!(snap.len(), 1);
        assert_eq!(snap.workers()[0].username, "Alice");
    }

    #[test]
    fn test_lines_without_tab_or_value_skipped() {
        let snap = parse_statistics("bot_count 5\nactive_bot_count\t\n\tfoo\nbot_count\t2").unwrap();
        assert_eq!(snap.server().bot_count, 2);
        assert_eq!(snap.server().active_bot_count, 0);
    }

    #[test]
    fn test_extra_columns_use_first_value() {
        let snap = parse_statistics("request_count\t1500\t0.25\t1.5\t3.0").unwrap();
        assert!((snap.server().request_count - 1500.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_bad_integer_dropped() {
        let snap = parse_statistics("bot_count\t4\nbot_count\tfour\nactive_requests\t-1").unwrap();
        assert_eq!(snap.server().bot_count, 4);
        assert_eq!(snap.server().active_requests, 0);
    }

    #[test]
    fn test_uptime_in_bot_block_updates_server() {
        let snap = parse_statistics("uptime\t1000\nid\t1\nuptime\t5").unwrap();
        assert!((snap.server().uptime - 5.0).abs() < f64::EPSILON);
        assert!(snap.workers()[0].uptime.abs() < f64::EPSILON);
    }

    #[test]
    fn test_bad_id_does_not_open_worker() {
        let snap = parse_statistics("id\tabc\nusername\tghost").unwrap();
        assert!(snap.is_empty());
    }

    #[test]
    fn test_bad_id_keeps_previous_worker_open() {
        let snap = parse_statistics("id\t1\nid\tnope\nusername\tstill_one").unwrap();
        assert_eq!(snap.len(), 1);
        assert_eq!(snap.workers()[0].username, "still_one");
    }

    #[test]
    fn test_textual_fields_verbatim() {
        let snap = parse_statistics("rss\t 128MB \nvm_peak\t1.5GB\nbuffer_memory\t12KB").unwrap();
        assert_eq!(snap.server().rss, "128MB");
        assert_eq!(snap.server().vm_peak, "1.5GB");
        assert_eq!(snap.server().buffer_memory, "12KB");
    }

    #[test]
    fn test_from_str() {
        let snap: StatisticsSnapshot = "id\t9\ntoken\t123:abc".parse().unwrap();
        assert_eq!(snap.worker(9).map(|w| w.token.as_str()), Some("123:abc"));
        assert!("   ".parse::<StatisticsSnapshot>().is_err());
    }
}
