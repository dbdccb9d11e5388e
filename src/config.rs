use chrono::{Duration, Utc};
use clap::Parser;
use std::path::PathBuf;

/// Default collection window when `--since` is not given.
pub const DEFAULT_WINDOW_DAYS: i64 = 7;

/// Command line arguments; every flag falls back to an environment variable.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Generate statistics about the blockchain")]
pub struct Args {
    /// Hostname of the node's RPC interface
    #[arg(long, env = "RPC_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// RPC port
    #[arg(long, env = "RPC_PORT", default_value_t = 8332)]
    pub port: u16,

    /// RPC username
    #[arg(long, env = "RPC_USER")]
    pub user: Option<String>,

    /// RPC password
    #[arg(long, env = "RPC_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Unix time to collect blocks from (defaults to the past week)
    #[arg(long, env = "SINCE")]
    pub since: Option<i64>,

    /// Transaction fetches allowed in flight at once
    #[arg(long, env = "CONCURRENCY", default_value_t = 1)]
    pub concurrency: usize,

    /// Per-call RPC timeout in seconds
    #[arg(long = "timeout", env = "RPC_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// Also write the report as CSV files into this directory
    #[arg(long, env = "OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,
}

impl Args {
    pub fn rpc_url(&self) -> String {
        format!("http://{}:{}/", self.host, self.port)
    }

    /// Cutoff time, `now` minus a week unless given explicitly.
    pub fn since_or_default(&self, now: i64) -> i64 {
        self.since
            .unwrap_or_else(|| now - Duration::days(DEFAULT_WINDOW_DAYS).num_seconds())
    }

    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs)
    }
}

/// Current Unix time in seconds.
pub fn now() -> i64 {
    Utc::now().timestamp()
}
