//! Main application run loop

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::app::config::Config;
use crate::deploy::runner::{CommandRunner, ShellRunner};
use crate::errors::HookError;
use crate::server::serve::serve;
use crate::server::state::ServerState;

/// Run the deployment daemon until `shutdown_signal` resolves
pub async fn run(
    config: Config,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<(), HookError> {
    info!("Initializing webhook deployer...");
    log_config(&config);

    let config = Arc::new(config);

    // Create shutdown channel
    let (shutdown_tx, _shutdown_rx): (broadcast::Sender<()>, _) = broadcast::channel(1);
    let mut shutdown_manager = ShutdownManager::new(shutdown_tx.clone(), config.max_shutdown_delay);

    let runner: Arc<dyn CommandRunner> = Arc::new(ShellRunner::default());
    let server = init_socket_server(&config, runner, &mut shutdown_manager, shutdown_tx.subscribe());
    if let Err(e) = server.await {
        error!("Failed to start webhook server: {}", e);
        shutdown_manager.shutdown().await?;
        return Err(e);
    }

    shutdown_signal.await;
    info!("Shutdown signal received, shutting down...");

    drop(shutdown_tx);
    shutdown_manager.shutdown().await
}

fn log_config(config: &Config) {
    info!("Listen address: {}", config.bind_addr());
    info!("Repository path: {}", config.repo_path);
    info!("Virtual env path: {}", config.venv_path);
    info!("Service name: {}", config.service_name);
    info!("Webhook secret configured: {}", config.has_secret());
    if !config.has_secret() {
        warn!("WEBHOOK_SECRET is empty, every request will be accepted without signature verification");
    }
}

async fn init_socket_server(
    config: &Arc<Config>,
    runner: Arc<dyn CommandRunner>,
    shutdown_manager: &mut ShutdownManager,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), HookError> {
    info!("Initializing HTTP server...");

    let server_state = ServerState::new(config.clone(), runner);

    let server_handle = serve(&config.bind_addr(), Arc::new(server_state), async move {
        let _ = shutdown_rx.recv().await;
    })
    .await?;

    shutdown_manager.with_socket_server_handle(server_handle)
}

// ================================= SHUTDOWN ===================================== //

struct ShutdownManager {
    shutdown_tx: broadcast::Sender<()>,
    max_shutdown_delay: Duration,
    socket_server_handle: Option<JoinHandle<Result<(), HookError>>>,
}

impl ShutdownManager {
    fn new(shutdown_tx: broadcast::Sender<()>, max_shutdown_delay: Duration) -> Self {
        Self {
            shutdown_tx,
            max_shutdown_delay,
            socket_server_handle: None,
        }
    }

    fn with_socket_server_handle(
        &mut self,
        handle: JoinHandle<Result<(), HookError>>,
    ) -> Result<(), HookError> {
        if self.socket_server_handle.is_some() {
            return Err(HookError::ShutdownError("server_handle already set".to_string()));
        }
        self.socket_server_handle = Some(handle);
        Ok(())
    }

    async fn shutdown(&mut self) -> Result<(), HookError> {
        let _ = self.shutdown_tx.send(());

        match tokio::time::timeout(self.max_shutdown_delay, self.shutdown_impl()).await {
            Ok(result) => result,
            Err(_) => Err(HookError::ShutdownError(format!(
                "Shutdown timed out after {:?}",
                self.max_shutdown_delay
            ))),
        }
    }

    async fn shutdown_impl(&mut self) -> Result<(), HookError> {
        info!("Shutting down webhook deployer...");

        // In-flight deployments finish before the server task returns
        if let Some(handle) = self.socket_server_handle.take() {
            handle
                .await
                .map_err(|e| HookError::ShutdownError(e.to_string()))??;
        }

        info!("Shutdown complete");
        Ok(())
    }
}
