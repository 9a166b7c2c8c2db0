//! hookd - Entry Point
//!
//! Receives source-control webhooks and redeploys a single service:
//! pull, refresh the virtual environment, install requirements, restart.

use std::collections::HashMap;
use std::env;
use std::process::ExitCode;

use hookd::app::config::Config;
use hookd::app::run::run;
use hookd::logs::init_logging;
use hookd::utils::version_info;

use tracing::{error, info};

const USAGE: &str = "\
Usage: hookd [--version] [--help]

Configuration is read from the environment (and a .env file if present):
  PORT            listen port (default 3000)
  HOST            bind address (default 0.0.0.0)
  WEBHOOK_SECRET  shared secret for X-Hub-Signature-256 (empty disables checks)
  REPO_PATH       repository to pull (default /home/pi/my-project)
  VENV_PATH       virtual environment (default $REPO_PATH/venv)
  SERVICE_NAME    systemd unit to restart (default my-service)
  LOG_LEVEL       trace|debug|info|warn|error (default info)
  LOG_FORMAT      text|json (default text)";

#[tokio::main]
async fn main() -> ExitCode {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    let mut cli_args: HashMap<String, String> = HashMap::new();

    for arg in args.iter().skip(1) {
        if let Some((key, value)) = arg.split_once('=') {
            let clean_key = key.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), value.to_string());
        } else if arg.starts_with("--") {
            let clean_key = arg.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), "true".to_string());
        }
    }

    if cli_args.contains_key("help") {
        println!("{USAGE}");
        return ExitCode::SUCCESS;
    }

    // Print version and exit
    let version = version_info();
    if cli_args.contains_key("version") {
        match serde_json::to_string_pretty(&version) {
            Ok(json) => println!("{json}"),
            Err(_) => println!("{}", version.version),
        }
        return ExitCode::SUCCESS;
    }

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Initialize logging
    if let Err(e) = init_logging(&config.log) {
        eprintln!("Failed to initialize logging: {e}");
    }

    info!("Running hookd {} ({})", version.version, version.git_hash);
    match run(config, await_shutdown_signal()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("hookd exited with error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn await_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let (mut sigterm, mut sigint) =
            match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
                (Ok(term), Ok(int)) => (term, int),
                _ => {
                    error!("Failed to install signal handlers, falling back to Ctrl+C");
                    let _ = tokio::signal::ctrl_c().await;
                    return;
                }
            };

        tokio::select! {
            _ = sigterm.recv() => {
                info!("SIGTERM received, shutting down...");
            }
            _ = sigint.recv() => {
                info!("SIGINT received, shutting down...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl+C received, shutting down...");
        }
    }
}
