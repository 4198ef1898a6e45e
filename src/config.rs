use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

/// k6 workbench: compiles load-test configs into k6 scripts and reads k6 summaries back.
#[derive(Parser, Debug, Clone)]
#[command(name = "k6-workbench", version)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Serve the HTTP API
    Serve(ServeArgs),

    /// Compile a TestConfig JSON file into a k6 script on stdout
    Compile {
        /// Path to the TestConfig JSON document
        config: PathBuf,
    },

    /// Extract metrics from a k6 end-of-test summary
    Parse {
        /// Console output captured from `k6 run`
        file: PathBuf,
    },

    /// Bucket `k6 run --out json` points into per-second series
    Timeseries {
        /// Newline-delimited JSON points
        file: PathBuf,
    },

    /// Load an exported result (.json) or raw console output (anything else)
    Import {
        file: PathBuf,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Address to bind
    #[arg(long = "bind", default_value = DEFAULT_BIND_ADDR)]
    pub bind: String,

    /// HTTP port
    #[arg(short = 'p', long = "port", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Largest accepted request body (uploads included), in bytes
    #[arg(long = "max-body-bytes", default_value_t = DEFAULT_MAX_BODY_BYTES)]
    pub max_body_bytes: usize,
}

pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    pub max_body_bytes: usize,
}

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 9880;
// Summaries of multi-hour soak runs with many checks stay well under this.
pub const DEFAULT_MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

pub const DEFAULT_LOG_FILTER: &str = "k6_workbench=info,tower_http=info";

impl ServerConfig {
    pub fn from_args(args: ServeArgs) -> Self {
        ServerConfig {
            bind: args.bind,
            port: args.port,
            max_body_bytes: args.max_body_bytes,
        }
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(format!("{}:{}", self.bind, self.port).parse()?)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind: DEFAULT_BIND_ADDR.to_string(),
            port: DEFAULT_PORT,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}
