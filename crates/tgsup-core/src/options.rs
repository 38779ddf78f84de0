//! Launch options for the Telegram Bot API server.
//!
//! `ServerOptions` is a plain value: the supervisor reads it at start time
//! and never mutates it. Rendering into arguments is deterministic so the
//! same options always produce the same command line.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::OptionsError;

/// Default port the server listens on for Bot API requests.
pub const DEFAULT_HTTP_PORT: u16 = 8081;

/// Flag that makes the server print its version and exit.
pub const VERSION_FLAG: &str = "--version";

/// Highest verbosity level the server accepts.
pub const MAX_VERBOSITY: u16 = 1024;

/// Launch configuration for a single server process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerOptions {
    /// Application identifier obtained from my.telegram.org.
    pub api_id: i32,
    /// Application hash paired with `api_id`.
    pub api_hash: String,
    /// Allow local file paths and lift upload/download limits.
    pub local: bool,
    /// Port for Bot API requests.
    pub http_port: u16,
    /// Port for the plaintext statistics endpoint (disabled when None).
    pub http_stat_port: Option<u16>,
    /// Server working directory; also the child's current directory.
    pub working_dir: PathBuf,
    /// Directory for temporary files.
    pub temp_dir: Option<PathBuf>,
    /// Log file written by the server itself.
    pub log_path: Option<PathBuf>,
    /// Log verbosity level.
    pub verbosity: Option<u16>,
    /// Path to the `telegram-bot-api` executable.
    pub executable: PathBuf,
    /// Maximum number of open file descriptors.
    pub max_connections: Option<u32>,
    /// CPU affinity mask; negative means unrestricted.
    pub cpu_affinity: i64,
    /// Upstream HTTP proxy (`host:port`) for webhook requests.
    pub proxy: Option<String>,
    /// Maximum size of the log file before rotation, in bytes.
    pub max_log_file_size: Option<u64>,
    /// Time to wait after SIGTERM before killing outright. Zero kills immediately.
    #[serde(default)]
    pub shutdown_grace: Duration,
}

impl ServerOptions {
    /// Create options with required credentials and executable.
    pub fn new(api_id: i32, api_hash: impl Into<String>, executable: impl Into<PathBuf>) -> Self {
        Self {
            api_id,
            api_hash: api_hash.into(),
            local: false,
            http_port: DEFAULT_HTTP_PORT,
            http_stat_port: None,
            working_dir: PathBuf::from("."),
            temp_dir: None,
            log_path: None,
            verbosity: None,
            executable: executable.into(),
            max_connections: None,
            cpu_affinity: -1,
            proxy: None,
            max_log_file_size: None,
            shutdown_grace: Duration::ZERO,
        }
    }

    #[must_use]
    pub const fn with_local(mut self, local: bool) -> Self {
        self.local = local;
        self
    }

    #[must_use]
    pub const fn with_http_port(mut self, port: u16) -> Self {
        self.http_port = port;
        self
    }

    #[must_use]
    pub const fn with_http_stat_port(mut self, port: u16) -> Self {
        self.http_stat_port = Some(port);
        self
    }

    #[must_use]
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = dir.into();
        self
    }

    #[must_use]
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn with_log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_path = Some(path.into());
        self
    }

    #[must_use]
    pub const fn with_verbosity(mut self, level: u16) -> Self {
        self.verbosity = Some(level);
        self
    }

    #[must_use]
    pub const fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = Some(max);
        self
    }

    #[must_use]
    pub const fn with_cpu_affinity(mut self, mask: i64) -> Self {
        self.cpu_affinity = mask;
        self
    }

    #[must_use]
    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    #[must_use]
    pub const fn with_max_log_file_size(mut self, bytes: u64) -> Self {
        self.max_log_file_size = Some(bytes);
        self
    }

    #[must_use]
    pub const fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }

    /// Render the options into the server's argument list.
    ///
    /// Order is fixed: credentials, `--local`, ports, directories, logging,
    /// then resource limits. Unset optional values emit nothing.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![
            format!("--api-id={}", self.api_id),
            format!("--api-hash={}", self.api_hash),
        ];

        if self.local {
            args.push("--local".to_string());
        }

        args.push(format!("--http-port={}", self.http_port));
        if let Some(port) = self.http_stat_port {
            args.push(format!("--http-stat-port={port}"));
        }

        args.push(format!("--dir={}", self.working_dir.display()));
        if let Some(ref dir) = self.temp_dir {
            args.push(format!("--temp-dir={}", dir.display()));
        }

        if let Some(ref path) = self.log_path {
            args.push(format!("--log={}", path.display()));
        }
        if let Some(level) = self.verbosity {
            args.push(format!("--verbosity={level}"));
        }

        if let Some(max) = self.max_connections {
            args.push(format!("--max-connections={max}"));
        }
        if self.cpu_affinity >= 0 {
            args.push(format!("--cpu-affinity={}", self.cpu_affinity));
        }
        if let Some(ref proxy) = self.proxy {
            args.push(format!("--proxy={proxy}"));
        }
        if let Some(size) = self.max_log_file_size {
            args.push(format!("--log-max-file-size={size}"));
        }

        args
    }

    /// Check the options for values the server would reject.
    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.api_id <= 0 {
            return Err(OptionsError::InvalidApiId(self.api_id));
        }

        if self.api_hash.trim().is_empty() {
            return Err(OptionsError::EmptyApiHash);
        }

        if self.http_port == 0 {
            return Err(OptionsError::InvalidPort(self.http_port));
        }

        if let Some(port) = self.http_stat_port {
            if port == 0 {
                return Err(OptionsError::InvalidPort(port));
            }
            if port == self.http_port {
                return Err(OptionsError::PortConflict(port));
            }
        }

        if let Some(level) = self.verbosity {
            if level > MAX_VERBOSITY {
                return Err(OptionsError::InvalidVerbosity(level));
            }
        }

        if self.executable.as_os_str().is_empty() {
            return Err(OptionsError::EmptyExecutable);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> ServerOptions {
        ServerOptions::new(12345, "0123456789abcdef", "/usr/bin/telegram-bot-api")
    }

    #[test]
    fn test_minimal_args() {
        let args = minimal().to_args();
        assert_eq!(
            args,
            vec![
                "--api-id=12345",
                "--api-hash=0123456789abcdef",
                "--http-port=8081",
                "--dir=.",
            ]
        );
    }

    #[test]
    fn test_full_args_order() {
        let options = minimal()
            .with_local(true)
            .with_http_port(9000)
            .with_http_stat_port(9001)
            .with_working_dir("/var/lib/tgbot")
            .with_temp_dir("/tmp/tgbot")
            .with_log_path("/var/log/tgbot.log")
            .with_verbosity(2)
            .with_max_connections(4096)
            .with_cpu_affinity(3)
            .with_proxy("127.0.0.1:3128")
            .with_max_log_file_size(1_000_000);

        assert_eq!(
            options.to_args(),
            vec![
                "--api-id=12345",
                "--api-hash=0123456789abcdef",
                "--local",
                "--http-port=9000",
                "--http-stat-port=9001",
                "--dir=/var/lib/tgbot",
                "--temp-dir=/tmp/tgbot",
                "--log=/var/log/tgbot.log",
                "--verbosity=2",
                "--max-connections=4096",
                "--cpu-affinity=3",
                "--proxy=127.0.0.1:3128",
                "--log-max-file-size=1000000",
            ]
        );
    }

    #[test]
    fn test_local_false_emits_nothing() {
        let args = minimal().with_local(false).to_args();
        assert!(!args.iter().any(|a| a == "--local"));
    }

    #[test]
    fn test_negative_affinity_is_unrestricted() {
        let args = minimal().with_cpu_affinity(-5).to_args();
        assert!(!args.iter().any(|a| a.starts_with("--cpu-affinity")));

        let args = minimal().with_cpu_affinity(0).to_args();
        assert!(args.iter().any(|a| a == "--cpu-affinity=0"));
    }

    #[test]
    fn test_executable_and_grace_not_rendered() {
        let args = minimal()
            .with_shutdown_grace(Duration::from_secs(3))
            .to_args();
        assert!(!args.iter().any(|a| a.contains("telegram-bot-api")));
        assert!(!args.iter().any(|a| a.contains("grace")));
    }

    #[test]
    fn test_validate_accepts_minimal() {
        assert!(minimal().validate().is_ok());
    }

    #[test]
    fn test_validate_rejections() {
        let mut options = minimal();
        options.api_id = 0;
        assert!(matches!(
            options.validate(),
            Err(OptionsError::InvalidApiId(0))
        ));

        let mut options = minimal();
        options.api_hash = "   ".to_string();
        assert!(matches!(options.validate(), Err(OptionsError::EmptyApiHash)));

        let options = minimal().with_http_port(0);
        assert!(matches!(options.validate(), Err(OptionsError::InvalidPort(0))));

        let options = minimal().with_http_port(9000).with_http_stat_port(9000);
        assert!(matches!(
            options.validate(),
            Err(OptionsError::PortConflict(9000))
        ));

        let options = minimal().with_verbosity(2000);
        assert!(matches!(
            options.validate(),
            Err(OptionsError::InvalidVerbosity(2000))
        ));

        let mut options = minimal();
        options.executable = PathBuf::new();
        assert!(matches!(
            options.validate(),
            Err(OptionsError::EmptyExecutable)
        ));
    }

    #[test]
    fn test_serde_defaults_grace() {
        let json = serde_json::json!({
            "api_id": 1,
            "api_hash": "h",
            "local": false,
            "http_port": 8081,
            "http_stat_port": null,
            "working_dir": ".",
            "temp_dir": null,
            "log_path": null,
            "verbosity": null,
            "executable": "telegram-bot-api",
            "max_connections": null,
            "cpu_affinity": -1,
            "proxy": null,
            "max_log_file_size": null
        });
        let options: ServerOptions = serde_json::from_value(json).unwrap();
        assert_eq!(options.shutdown_grace, Duration::ZERO);
        assert_eq!(options, ServerOptions::new(1, "h", "telegram-bot-api"));
    }
}
