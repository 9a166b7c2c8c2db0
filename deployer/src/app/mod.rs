//! Application configuration and lifecycle

pub mod config;
pub mod run;
