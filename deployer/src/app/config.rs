//! Process configuration, read once from the environment at startup

use std::path::Path;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use crate::errors::HookError;
use crate::logs::{LogFormat, LogLevel, LogOptions};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_REPO_PATH: &str = "/home/pi/my-project";
pub const DEFAULT_SERVICE_NAME: &str = "my-service";

/// Immutable daemon configuration
#[derive(Debug)]
pub struct Config {
    /// Address to bind the HTTP listener to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Shared webhook secret. Empty disables signature verification.
    pub secret: SecretString,

    /// Working copy that gets pulled on every push
    pub repo_path: String,

    /// Python virtual environment used for dependency installs
    pub venv_path: String,

    /// systemd unit restarted at the end of a deployment
    pub service_name: String,

    /// Logging options
    pub log: LogOptions,

    /// Maximum delay for graceful shutdown
    pub max_shutdown_delay: Duration,
}

impl Config {
    /// Load configuration from the process environment, honouring a `.env`
    /// file in the working directory.
    pub fn from_env() -> Result<Self, HookError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, HookError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty values count as unset
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match var("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| {
                HookError::ConfigError(format!("Invalid PORT '{}': {}", raw, e))
            })?,
            None => DEFAULT_PORT,
        };

        let repo_path = var("REPO_PATH").unwrap_or_else(|| DEFAULT_REPO_PATH.to_string());
        let venv_path = var("VENV_PATH").unwrap_or_else(|| {
            Path::new(&repo_path).join("venv").to_string_lossy().into_owned()
        });

        let log_level = match var("LOG_LEVEL") {
            Some(raw) => raw.parse::<LogLevel>().map_err(HookError::ConfigError)?,
            None => LogLevel::default(),
        };
        let log_format = match var("LOG_FORMAT") {
            Some(raw) => raw.parse::<LogFormat>().map_err(HookError::ConfigError)?,
            None => LogFormat::default(),
        };

        Ok(Self {
            host: var("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            secret: SecretString::from(lookup("WEBHOOK_SECRET").unwrap_or_default()),
            repo_path,
            venv_path,
            service_name: var("SERVICE_NAME").unwrap_or_else(|| DEFAULT_SERVICE_NAME.to_string()),
            log: LogOptions {
                log_level,
                format: log_format,
            },
            max_shutdown_delay: Duration::from_secs(30),
        })
    }

    /// Whether a webhook secret is configured
    pub fn has_secret(&self) -> bool {
        !self.secret.expose_secret().is_empty()
    }

    /// `host:port` bind address
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
