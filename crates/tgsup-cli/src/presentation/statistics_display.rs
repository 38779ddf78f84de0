//! Statistics rendering for terminal and JSON output.

use tgsup_core::{ServerStatistics, StatisticsSnapshot, WorkerStatistics};

use super::tables::{format_optional, print_separator, truncate_string};

/// Render a snapshot as pretty-printed JSON.
pub fn statistics_json(snapshot: &StatisticsSnapshot) -> serde_json::Result<String> {
    serde_json::to_string_pretty(snapshot)
}

/// Print a server summary followed by one row per worker.
pub fn display_statistics(snapshot: &StatisticsSnapshot) {
    for line in server_summary(snapshot.server()) {
        println!("{line}");
    }
    println!();

    if snapshot.is_empty() {
        println!("No bots are being served.");
        return;
    }

    println!("{}", worker_header());
    print_separator(96);
    for worker in snapshot {
        println!("{}", worker_row(worker));
    }
}

fn server_summary(server: &ServerStatistics) -> Vec<String> {
    vec![
        format!("Uptime:          {:.0}s", server.uptime),
        format!(
            "Bots:            {} ({} active)",
            server.bot_count, server.active_bot_count
        ),
        format!(
            "Memory:          rss {} (peak {}), vm {} (peak {})",
            format_optional(&server.rss, "--"),
            format_optional(&server.rss_peak, "--"),
            format_optional(&server.vm, "--"),
            format_optional(&server.vm_peak, "--"),
        ),
        format!(
            "CPU:             {:.1}% total, {:.1}% user, {:.1}% system",
            server.total_cpu, server.user_cpu, server.system_cpu
        ),
        format!(
            "Buffers:         {}",
            format_optional(&server.buffer_memory, "--")
        ),
        format!(
            "Connections:     {} webhook, {} requests, {} network queries",
            server.active_webhook_connections, server.active_requests, server.active_network_queries
        ),
        format!(
            "Totals:          {:.0} requests, {:.0} responses ({:.0} ok, {:.0} error), {:.0} updates",
            server.request_count,
            server.response_count,
            server.response_count_ok,
            server.response_count_error,
            server.update_count
        ),
    ]
}

fn worker_header() -> String {
    format!(
        "{:<12} {:<24} {:<10} {:<8} {:<14} {:<10} {:<10}",
        "ID", "Username", "Uptime", "Active", "Head update", "Req/s", "Upd/s"
    )
}

fn worker_row(worker: &WorkerStatistics) -> String {
    format!(
        "{:<12} {:<24} {:<10.0} {:<8} {:<14} {:<10.3} {:<10.3}",
        worker.id,
        truncate_string(&format_optional(&worker.username, "--"), 23),
        worker.uptime,
        worker.active_request_count,
        worker.head_update_id,
        worker.requests_per_sec,
        worker.updates_per_sec,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tgsup_core::parse_statistics;

    const SAMPLE: &str = "uptime\t3600\nbot_count\t2\ntotal_cpu\t1.5%\n\
                          id\t12345\nusername\tsample_bot\nhead_update_id\t77\n";

    #[test]
    fn test_worker_row_contains_fields() {
        let snapshot = parse_statistics(SAMPLE).unwrap();
        let row = worker_row(snapshot.worker(12345).unwrap());
        assert!(row.starts_with("12345"));
        assert!(row.contains("sample_bot"));
        assert!(row.contains("77"));
    }

    #[test]
    fn test_server_summary_formats_cpu() {
        let snapshot = parse_statistics(SAMPLE).unwrap();
        let summary = server_summary(snapshot.server());
        assert!(summary[0].contains("3600s"));
        assert!(summary[1].contains("2 (0 active)"));
        assert!(summary[3].contains("1.5% total"));
        assert!(summary[4].ends_with("--"));
    }

    #[test]
    fn test_server_summary_labels_counters_as_totals() {
        let snapshot =
            parse_statistics("request_count\t1500\nresponse_count\t1490\nupdate_count\t42")
                .unwrap();
        let summary = server_summary(snapshot.server());
        let totals = &summary[6];
        assert!(totals.starts_with("Totals:"));
        assert!(totals.contains("1500 requests"));
        assert!(totals.contains("1490 responses"));
        assert!(totals.contains("42 updates"));
        assert!(!totals.contains("/s"));
    }

    #[test]
    fn test_json_contains_workers() {
        let snapshot = parse_statistics(SAMPLE).unwrap();
        let json = statistics_json(&snapshot).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["workers"][0]["id"], 12345);
        assert_eq!(value["server"]["bot_count"], 2);
    }
}
