// ABOUTME: CLI argument parsing: global --config/--trace flags plus the serve/config subcommands
// ABOUTME: Global flags apply to every subcommand via clap's `global = true`

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Trace level for logging output. `RUST_LOG` always takes precedence over
/// this flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TraceLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<TraceLevel> for tracing::Level {
    fn from(level: TraceLevel) -> Self {
        match level {
            TraceLevel::Off | TraceLevel::Error => Self::ERROR,
            TraceLevel::Warn => Self::WARN,
            TraceLevel::Info => Self::INFO,
            TraceLevel::Debug => Self::DEBUG,
            TraceLevel::Trace => Self::TRACE,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "meridian")]
#[command(version)]
#[command(about = "Multi-tenant hybrid retrieval orchestrator")]
#[command(propagate_version = true)]
pub struct Cli {
    /// TOML configuration file. Falls back to defaults + environment
    /// overrides when omitted.
    #[arg(short = 'c', long, global = true, env = "MERIDIAN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Logging verbosity; overridden by `RUST_LOG` when set.
    #[arg(long, global = true, value_enum, default_value_t = TraceLevel::Info)]
    pub trace: TraceLevel,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP request API.
    Serve {
        /// Overrides `server.bind_addr` / `$BIND_ADDR` for this run.
        #[arg(long)]
        bind: Option<String>,
    },
    /// Configuration inspection.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration (defaults + file + environment) as JSON.
    Show,
    /// Load and validate the configuration without starting the server.
    Validate,
}
