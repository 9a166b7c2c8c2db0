//! Error types for the deployment daemon

use thiserror::Error;

/// Main error type for hookd
#[derive(Error, Debug)]
pub enum HookError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Shutdown error: {0}")]
    ShutdownError(String),

    #[error("Failed to start command `{command}`: {source}")]
    SpawnError {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command `{command}` exited with {}: {stderr}", exit_label(.code))]
    CommandFailed {
        command: String,
        /// `None` when the process was terminated by a signal
        code: Option<i32>,
        /// Logged by the runner, kept out of the message
        stdout: String,
        stderr: String,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "no status (killed by signal)".to_string(),
    }
}
