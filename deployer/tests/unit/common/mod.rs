//! Shared test fixtures

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use hookd::app::config::Config;
use hookd::deploy::runner::CommandRunner;
use hookd::errors::HookError;

/// Command runner that records every command instead of executing it
#[derive(Default)]
pub struct RecordingRunner {
    commands: Mutex<Vec<String>>,
    /// Zero-based call index that fails
    fail_at: Option<usize>,
    /// Simulated command duration
    delay: Option<Duration>,
    active: AtomicUsize,
    max_active: AtomicUsize,
}

impl RecordingRunner {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing_at(index: usize) -> Arc<Self> {
        Arc::new(Self {
            fail_at: Some(index),
            ..Default::default()
        })
    }

    pub fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay: Some(delay),
            ..Default::default()
        })
    }

    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }

    /// Highest number of commands observed running at the same time
    pub fn max_concurrency(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    async fn run(&self, command: &str) -> Result<String, HookError> {
        let index = {
            let mut commands = self.commands.lock().unwrap();
            commands.push(command.to_string());
            commands.len() - 1
        };

        let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(active, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.active.fetch_sub(1, Ordering::SeqCst);

        if self.fail_at == Some(index) {
            return Err(HookError::CommandFailed {
                command: command.to_string(),
                code: Some(1),
                stdout: String::new(),
                stderr: "simulated failure".to_string(),
            });
        }
        Ok(format!("ran: {command}\n"))
    }
}

/// Command runner that panics on first use
pub struct PanickingRunner;

#[async_trait]
impl CommandRunner for PanickingRunner {
    async fn run(&self, _command: &str) -> Result<String, HookError> {
        panic!("runner exploded");
    }
}

pub fn test_config(secret: &str) -> Config {
    let secret = secret.to_string();
    Config::from_lookup(move |key| match key {
        "WEBHOOK_SECRET" => Some(secret.clone()),
        "REPO_PATH" => Some("/srv/demo".to_string()),
        "SERVICE_NAME" => Some("demo".to_string()),
        _ => None,
    })
    .unwrap()
}
