//! Deployment module

pub mod pipeline;
pub mod runner;
