//! Utility functions

use serde::{Deserialize, Serialize};

/// Version information for the daemon
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionInfo {
    pub version: String,
    pub git_hash: String,
    pub build_time: String,
}

/// Get version information
pub fn version_info() -> VersionInfo {
    VersionInfo {
        version: env!("CARGO_PKG_VERSION").to_string(),
        git_hash: stamp_or_unknown(option_env!("GIT_HASH")),
        build_time: stamp_or_unknown(option_env!("BUILD_TIME")),
    }
}

/// Build stamps may be missing or blank outside a git checkout
fn stamp_or_unknown(stamp: Option<&str>) -> String {
    match stamp.map(str::trim) {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => "unknown".to_string(),
    }
}
