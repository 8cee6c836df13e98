//! Build tool strategies: everything wrapper-specific for one tool.
//!
//! A strategy is a capability interface, not a hierarchy: any type that
//! can extract the current version, look up the latest, regenerate the
//! wrapper, and name its files is a valid strategy, so new build tools
//! plug in without touching the orchestrator.
use async_trait::async_trait;
use std::path::Path;

use crate::{config::BuildTool, result::Result};

#[cfg(test)]
use mockall::automock;

pub mod gradle;
pub mod maven;

/// Build-tool-agnostic version wrapper. Compared only through
/// [`crate::version::VersionNumber`], never by raw string ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionInfo {
    pub version: String,
}

/// Per-build-tool operations consumed by the upgrade orchestrator.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait BuildToolStrategy: Send + Sync {
    fn build_tool_name(&self) -> String;

    /// Version currently pinned by the wrapper files in the project.
    fn extract_current_version(
        &self,
        root_project_dir: &Path,
    ) -> Result<VersionInfo>;

    /// Latest released version, optionally including pre-releases.
    async fn lookup_latest_version(
        &self,
        allow_pre_release: bool,
    ) -> Result<VersionInfo>;

    /// Regenerate the wrapper files for the given version. Must converge
    /// when applied twice.
    fn run_wrapper(
        &self,
        root_project_dir: &Path,
        version: &VersionInfo,
    ) -> Result<()>;

    /// Files the wrapper regeneration touches, relative to the project
    /// directory. Exactly these are staged for commit.
    fn wrapper_files(&self, root_project_dir: &Path) -> Vec<String>;

    fn release_notes_link(&self, version: &str) -> String;
}

/// Strategy for a configured build tool.
pub fn for_build_tool(tool: &BuildTool) -> Box<dyn BuildToolStrategy> {
    match tool {
        BuildTool::Gradle => Box::new(gradle::GradleStrategy::new()),
        BuildTool::Maven => Box::new(maven::MavenStrategy::new()),
    }
}
