//! CLI command definitions and dispatch for the `memorb` binary.
//!
//! Uses clap derive macros. `serve` runs the HTTP API; the other commands
//! run one operation against the same wiring and exit.

pub mod memory;
pub mod reflect;
pub mod scrape;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use memorb_observe::tracing_setup::LogFormat;

/// Multi-tenant conversational memory service.
#[derive(Parser)]
#[command(name = "memorb", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Detailed output (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log line format: fmt or json.
    #[arg(long, global = true, default_value = "fmt", env = "MEMORB_LOG_FORMAT")]
    pub log_format: LogFormat,

    /// Export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    /// Config file to load instead of `$MEMORB_HOME/config.toml`.
    #[arg(long, global = true, env = "MEMORB_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the REST API server.
    Serve {
        /// Port to listen on (overrides `server.port`).
        #[arg(long, short)]
        port: Option<u16>,

        /// Host to bind to (overrides `server.host`).
        #[arg(long)]
        host: Option<String>,
    },

    /// Destructively (re)create a tenant's memory namespace.
    Provision {
        /// Tenant whose namespace is recreated.
        #[arg(long)]
        user_id: String,
    },

    /// Extract conversation turns from a public share page.
    Scrape {
        /// Share page URL.
        url: String,

        /// Extraction strategy (rendered or raw-html); defaults to `scraper.strategy`.
        #[arg(long)]
        strategy: Option<String>,
    },

    /// Run the reflection pipeline over a JSON array of messages.
    Reflect {
        /// File holding `[{"role": "...", "content": "..."}, ...]`.
        file: PathBuf,
    },
}

impl Cli {
    /// Default log filter for the verbosity level; `RUST_LOG` overrides it.
    pub fn log_directive(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "info,memorb_core=debug,memorb_infra=debug,memorb_api=debug",
            _ => "trace",
        }
    }
}
