//! Configuration loading and parsing for `wrapperbot.toml` files.
//!
//! Each `[[upgrade]]` table defines one upgrade target: a repository,
//! base branch, project directory, and the build tool whose wrapper is
//! managed. Targets are processed independently.
use color_eyre::eyre::{WrapErr, eyre};
use serde::Deserialize;
use std::{collections::HashSet, fs, path::Path};

use crate::result::Result;

/// Build tools with a supported wrapper strategy.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildTool {
    Gradle,
    Maven,
}

/// Optional per-target knobs. All default to off / empty.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpgradeOptions {
    /// Consider pre-release versions when looking up the latest version.
    pub allow_pre_release: bool,
    /// Recreate a pull request that an operator previously closed for the
    /// same target version.
    pub recreate_closed_pr: bool,
    /// Extra arguments appended to `git commit` (e.g. GPG signing flags).
    pub git_commit_extra_args: Vec<String>,
    /// Labels applied to the created pull request (best effort).
    pub labels: Vec<String>,
    /// Reviewers requested on the created pull request (best effort).
    pub reviewers: Vec<String>,
    /// Assignees added to the created pull request (best effort).
    pub assignees: Vec<String>,
}

/// One logical upgrade unit: a repository, branch, and project directory
/// whose wrapper files this tool manages.
#[derive(Debug, Clone, Deserialize)]
pub struct UpgradeTarget {
    /// Unique target name. Also keys the checkout directory and the PR
    /// branch prefix.
    pub name: String,
    /// Repository URL or `owner/name` shorthand.
    pub repo: String,
    /// Branch upgrades are proposed against.
    #[serde(default = "default_base_branch")]
    pub base_branch: String,
    /// Project directory relative to the repository root.
    #[serde(default = "default_dir")]
    pub dir: String,
    /// Build tool whose wrapper is managed in this target.
    pub build_tool: BuildTool,
    #[serde(default)]
    pub options: UpgradeOptions,
}

fn default_base_branch() -> String {
    "main".to_string()
}

fn default_dir() -> String {
    ".".to_string()
}

/// Root configuration structure for `wrapperbot.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(rename = "upgrade")]
    pub upgrades: Vec<UpgradeTarget>,
}

impl Config {
    /// Load and validate configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).wrap_err_with(|| {
            format!("failed to read config file {}", path.display())
        })?;

        let config: Config = toml::from_str(&content).wrap_err_with(|| {
            format!("failed to parse config file {}", path.display())
        })?;

        // target names key checkout directories and branch prefixes, so
        // duplicates would contend for the same state
        let mut seen = HashSet::new();
        for target in config.upgrades.iter() {
            if !seen.insert(target.name.as_str()) {
                return Err(eyre!(
                    "duplicate upgrade target name '{}'",
                    target.name
                ));
            }
        }

        Ok(config)
    }
}
