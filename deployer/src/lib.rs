//! hookd library
//!
//! Core modules for the webhook deployment daemon.

pub mod app;
pub mod authn;
pub mod deploy;
pub mod errors;
pub mod logs;
pub mod server;
pub mod utils;
