//! Server state

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};

use crate::app::config::Config;
use crate::authn::signature::SignatureVerifier;
use crate::deploy::pipeline::Deployer;
use crate::deploy::runner::CommandRunner;

/// Server state shared across handlers
pub struct ServerState {
    pub config: Arc<Config>,
    pub verifier: SignatureVerifier,
    pub deployer: Arc<Deployer>,
}

impl ServerState {
    pub fn new(config: Arc<Config>, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            verifier: SignatureVerifier::new(SecretString::from(
                config.secret.expose_secret().to_string(),
            )),
            deployer: Arc::new(Deployer::new(config.clone(), runner)),
            config,
        }
    }
}
