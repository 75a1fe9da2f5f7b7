use std::fmt;

use serde::Serialize;

/// Build metadata baked in by `build.rs`.
#[derive(Debug, Clone, Serialize)]
pub struct BuildInfo {
    pub build_profile: &'static str,
    pub build_timestamp: &'static str,
    pub version: &'static str,
    pub repo_version: &'static str,
}

pub fn build_info() -> BuildInfo {
    BuildInfo {
        build_profile: env!("BUILD_PROFILE"),
        build_timestamp: env!("BUILD_TIMESTAMP"),
        version: env!("CARGO_PKG_VERSION"),
        repo_version: env!("REPO_VERSION"),
    }
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "awm {} ({}, {} build, {})",
            self.version, self.repo_version, self.build_profile, self.build_timestamp
        )
    }
}
