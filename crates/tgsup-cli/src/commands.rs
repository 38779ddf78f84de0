//! Commands enum and server launch arguments.

use clap::{Args, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tgsup_core::{DEFAULT_HTTP_PORT, ServerOptions};

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Launch the server, stream its output and stop it on Ctrl-C
    Run {
        #[command(flatten)]
        server: ServerArgs,
        /// Print a statistics summary every N seconds (needs --http-stat-port)
        #[arg(long, value_name = "SECS")]
        stats_interval: Option<u64>,
        /// Wait up to N seconds for the statistics endpoint before continuing
        #[arg(long, value_name = "SECS")]
        ready_timeout: Option<u64>,
    },

    /// Print the server executable's version
    Version {
        /// Path to the telegram-bot-api executable
        #[arg(long, env = "TELEGRAM_BOT_API_PATH", default_value = "telegram-bot-api")]
        executable: PathBuf,
    },

    /// Fetch and display statistics from a running server
    Stats {
        /// Statistics port of the running server
        #[arg(long, env = "TELEGRAM_STAT_PORT")]
        port: u16,
        /// Output JSON instead of a table
        #[arg(long)]
        json: bool,
        /// Request timeout in seconds
        #[arg(long, default_value_t = 5)]
        timeout: u64,
    },

    /// Parse saved statistics text ("-" reads stdin)
    Parse {
        /// File containing statistics output
        file: PathBuf,
        /// Output JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

/// Options for launching the server.
#[derive(Args, Debug, Clone)]
pub struct ServerArgs {
    /// Application identifier from my.telegram.org
    #[arg(long, env = "TELEGRAM_API_ID")]
    pub api_id: i32,

    /// Application hash from my.telegram.org
    #[arg(long, env = "TELEGRAM_API_HASH", hide_env_values = true)]
    pub api_hash: String,

    /// Path to the telegram-bot-api executable
    #[arg(long, env = "TELEGRAM_BOT_API_PATH", default_value = "telegram-bot-api")]
    pub executable: PathBuf,

    /// Allow local requests (file paths, larger uploads)
    #[arg(long, env = "TELEGRAM_LOCAL")]
    pub local: bool,

    /// Port for Bot API requests
    #[arg(long, env = "TELEGRAM_HTTP_PORT", default_value_t = DEFAULT_HTTP_PORT)]
    pub http_port: u16,

    /// Port for the statistics endpoint
    #[arg(long, env = "TELEGRAM_STAT_PORT")]
    pub http_stat_port: Option<u16>,

    /// Server working directory
    #[arg(long, env = "TELEGRAM_WORK_DIR", default_value = ".")]
    pub dir: PathBuf,

    /// Directory for temporary files
    #[arg(long, env = "TELEGRAM_TEMP_DIR")]
    pub temp_dir: Option<PathBuf>,

    /// Server log file
    #[arg(long)]
    pub log: Option<PathBuf>,

    /// Server log verbosity
    #[arg(long)]
    pub verbosity: Option<u16>,

    /// Maximum number of open file descriptors
    #[arg(long)]
    pub max_connections: Option<u32>,

    /// CPU affinity mask (negative for unrestricted)
    #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
    pub cpu_affinity: i64,

    /// HTTP proxy for outgoing webhook requests
    #[arg(long, env = "TELEGRAM_PROXY")]
    pub proxy: Option<String>,

    /// Maximum log file size in bytes before rotation
    #[arg(long)]
    pub log_max_file_size: Option<u64>,

    /// Seconds to wait after SIGTERM before killing the server
    #[arg(long, default_value_t = 0)]
    pub shutdown_grace: u64,
}

impl ServerArgs {
    /// Convert parsed arguments into server options.
    pub fn into_options(self) -> ServerOptions {
        let mut options = ServerOptions::new(self.api_id, self.api_hash, self.executable)
            .with_local(self.local)
            .with_http_port(self.http_port)
            .with_working_dir(self.dir)
            .with_cpu_affinity(self.cpu_affinity)
            .with_shutdown_grace(Duration::from_secs(self.shutdown_grace));

        options.http_stat_port = self.http_stat_port;
        options.temp_dir = self.temp_dir;
        options.log_path = self.log;
        options.verbosity = self.verbosity;
        options.max_connections = self.max_connections;
        options.proxy = self.proxy;
        options.max_log_file_size = self.log_max_file_size;
        options
    }
}
