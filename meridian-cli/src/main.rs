// ABOUTME: Process entry point: parse args, load config, dispatch to serve/config, map failures to exit codes
// ABOUTME: RUST_LOG always overrides --trace; both write structured logs to stderr

use std::io;
use std::path::PathBuf;

use clap::Parser;
use meridian_cli::bootstrap;
use meridian_cli::cli::{Cli, Command, ConfigAction, TraceLevel};
use meridian_cli::error::CliError;
use meridian_config::MeridianConfig;
use meridian_web::WebServer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    setup_tracing(cli.trace);

    let exit_code = match load_config(cli.config.as_deref()) {
        Ok(config) => match cli.command {
            Command::Config { action } => run_config_action(&config, action),
            Command::Serve { bind } => run_serve(config, bind).await,
        },
        Err(err) => {
            tracing::error!(%err, "configuration error");
            err.exit_code()
        }
    };

    std::process::exit(exit_code);
}

fn setup_tracing(trace_level: TraceLevel) {
    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(io::stderr)
            .with_target(false)
            .init();
    } else {
        let level: tracing::Level = trace_level.into();
        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_writer(io::stderr)
            .with_target(false)
            .init();
    }
}

fn load_config(path: Option<&std::path::Path>) -> Result<MeridianConfig, CliError> {
    match path {
        Some(p) => Ok(MeridianConfig::load_from_file(p)?),
        None => Ok(MeridianConfig::from_env()?),
    }
}

fn run_config_action(config: &MeridianConfig, action: ConfigAction) -> i32 {
    match action {
        ConfigAction::Show => {
            match serde_json::to_string_pretty(config) {
                Ok(json) => println!("{json}"),
                Err(err) => {
                    tracing::error!(%err, "failed to render configuration");
                    return 1;
                }
            }
            0
        }
        ConfigAction::Validate => match config.validate() {
            Ok(()) => {
                println!("configuration is valid");
                0
            }
            Err(err) => {
                tracing::error!(%err, "configuration is invalid");
                1
            }
        },
    }
}

async fn run_serve(config: MeridianConfig, bind_override: Option<String>) -> i32 {
    let data_dir = PathBuf::from(
        std::env::var("MERIDIAN_DATA_DIR").unwrap_or_else(|_| "./meridian-data".to_string()),
    );
    let mut state = match bootstrap::build_app_state(&config, data_dir) {
        Ok(state) => state,
        Err(err) => {
            tracing::error!(%err, "initialization failed");
            return err.exit_code();
        }
    };
    if let Some(bind) = bind_override {
        state.config.bind_addr = bind;
    }

    let bind_addr = state.config.bind_addr.clone();
    let listener = match tokio::net::TcpListener::bind(&bind_addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(%err, bind_addr, "failed to bind HTTP listener");
            return CliError::Init(err.to_string()).exit_code();
        }
    };

    tracing::info!(bind_addr, "meridian listening");
    let app = WebServer::build_app(state);

    tokio::select! {
        result = axum::serve(listener, app) => match result {
            Ok(()) => 0,
            Err(err) => {
                tracing::error!(%err, "server exited with an error");
                2
            }
        },
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("received interrupt, shutting down");
            130
        }
    }
}
