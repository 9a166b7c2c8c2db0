//! Shell command execution

use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{info, warn};

use crate::errors::HookError;

/// Executes shell command strings
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `command` through a shell and return its stdout.
    ///
    /// Fails with [`HookError::SpawnError`] when the shell cannot be started
    /// and [`HookError::CommandFailed`] on a non-zero exit.
    async fn run(&self, command: &str) -> Result<String, HookError>;
}

/// Runs commands with `bash -c`, capturing stdout and stderr
#[derive(Debug, Clone)]
pub struct ShellRunner {
    shell: String,
}

impl ShellRunner {
    pub fn new(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
        }
    }
}

impl Default for ShellRunner {
    fn default() -> Self {
        // `source` is a bash builtin
        Self::new("bash")
    }
}

#[async_trait]
impl CommandRunner for ShellRunner {
    async fn run(&self, command: &str) -> Result<String, HookError> {
        let output = Command::new(&self.shell)
            .args(["-c", command])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| HookError::SpawnError {
                command: command.to_string(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        info!("Command output: {}", stdout.trim_end());

        if !output.status.success() {
            return Err(HookError::CommandFailed {
                command: command.to_string(),
                code: output.status.code(),
                stdout,
                stderr,
            });
        }

        if !stderr.trim().is_empty() {
            warn!("Command stderr: {}", stderr.trim_end());
        }

        Ok(stdout)
    }
}
