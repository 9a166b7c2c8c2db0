//! Deployment pipeline
//!
//! A push runs five shell steps strictly in order and stops at the first
//! failure:
//!
//! 1. pull the working copy
//! 2. create the virtual environment if it is missing
//! 3. check the virtual environment activates
//! 4. install `requirements.txt` into the virtual environment
//! 5. restart the systemd service
//!
//! Every step runs in its own shell, so activating the environment in step 3
//! does not carry over into step 4. Step 4 activates it again within the same
//! shell invocation as `pip`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::app::config::Config;
use crate::deploy::runner::CommandRunner;

/// One shell command of the pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployStep {
    pub name: &'static str,
    pub command: String,
}

/// Build the ordered step list for `config`
pub fn deployment_steps(config: &Config) -> Vec<DeployStep> {
    let repo = shell_quote(&config.repo_path);
    let venv = shell_quote(&config.venv_path);
    let activate = shell_quote(&format!("{}/bin/activate", config.venv_path));
    let requirements = shell_quote(&format!("{}/requirements.txt", config.repo_path));

    vec![
        DeployStep {
            name: "pull",
            command: format!("cd {repo} && git pull"),
        },
        DeployStep {
            name: "create-venv",
            command: format!("if [ ! -d {venv} ]; then python3 -m venv {venv}; fi"),
        },
        DeployStep {
            name: "activate-venv",
            command: format!("source {activate}"),
        },
        DeployStep {
            name: "install-requirements",
            command: format!("source {activate} && pip install -r {requirements}"),
        },
        DeployStep {
            name: "restart-service",
            command: format!("sudo systemctl restart {}", shell_quote(&config.service_name)),
        },
    ]
}

/// Single-quote `value` for POSIX shells
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// Outcome of a single executed step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepResult {
    Succeeded { stdout: String },
    Failed { error: String },
}

#[derive(Debug, Clone)]
pub struct StepRecord {
    pub step: DeployStep,
    pub result: StepResult,
}

/// Record of one pipeline run. Steps after a failure are absent.
#[derive(Debug, Clone)]
pub struct DeploymentReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub steps: Vec<StepRecord>,
}

impl DeploymentReport {
    pub fn succeeded(&self) -> bool {
        self.steps
            .iter()
            .all(|record| matches!(record.result, StepResult::Succeeded { .. }))
    }

    /// The step that aborted the run, if any
    pub fn failed_step(&self) -> Option<&StepRecord> {
        self.steps
            .iter()
            .find(|record| matches!(record.result, StepResult::Failed { .. }))
    }
}

/// Runs the pipeline, one deployment at a time
pub struct Deployer {
    config: Arc<Config>,
    runner: Arc<dyn CommandRunner>,
    in_flight: Mutex<()>,
}

impl Deployer {
    pub fn new(config: Arc<Config>, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            config,
            runner,
            in_flight: Mutex::new(()),
        }
    }

    /// Run every step in order, stopping at the first failure.
    ///
    /// Overlapping calls are serialized: a second delivery waits for the
    /// running deployment to finish and then runs its own pipeline.
    pub async fn deploy(&self) -> DeploymentReport {
        let _guard = match self.in_flight.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                info!("Deployment already in progress, waiting for it to finish...");
                self.in_flight.lock().await
            }
        };

        let started_at = Utc::now();
        let mut records = Vec::new();

        for step in deployment_steps(&self.config) {
            info!("Executing [{}]: {}", step.name, step.command);

            match self.runner.run(&step.command).await {
                Ok(stdout) => records.push(StepRecord {
                    step,
                    result: StepResult::Succeeded { stdout },
                }),
                Err(e) => {
                    error!("Step [{}] failed: {}", step.name, e);
                    records.push(StepRecord {
                        step,
                        result: StepResult::Failed {
                            error: e.to_string(),
                        },
                    });
                    break;
                }
            }
        }

        let report = DeploymentReport {
            started_at,
            finished_at: Utc::now(),
            steps: records,
        };

        let elapsed = report.finished_at - report.started_at;
        if report.succeeded() {
            info!(
                "Deployment completed successfully in {} ms",
                elapsed.num_milliseconds()
            );
        } else {
            error!("Deployment aborted after {} ms", elapsed.num_milliseconds());
        }

        report
    }
}
