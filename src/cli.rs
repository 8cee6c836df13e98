//! CLI argument parsing and per-run settings.
use clap::Parser;
use secrecy::SecretString;
use std::{env, path::PathBuf};

use crate::orchestrator::RunSettings;

/// Environment variable holding the host access token.
pub const GIT_TOKEN_ENV_VAR: &str = "WRAPPER_UPGRADE_GIT_TOKEN";

/// Global CLI arguments controlling one run across all configured targets.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[arg(long, default_value = "wrapperbot.toml")]
    /// Path to the upgrade target configuration file.
    pub config: PathBuf,

    #[arg(long, default_value = "")]
    /// GitHub access token. Falls back to WRAPPER_UPGRADE_GIT_TOKEN, then
    /// GITHUB_TOKEN env vars. Absent token means unauthenticated mode.
    pub github_token: String,

    #[arg(long, default_value = "build/git-clones")]
    /// Base directory for per-target git checkouts.
    pub working_dir: PathBuf,

    #[arg(long, default_value_t = false)]
    /// Skip all host mutations (push, PR creation, PR closure). Local
    /// clone and commit still run for inspection.
    pub dry_run: bool,

    #[arg(long, default_value_t = false)]
    /// Disable commit signing in the cloned repository. Needed in CI
    /// environments without a signing key.
    pub unsigned_commits: bool,

    #[arg(long, default_value_t = false)]
    /// Enable debug logging.
    pub debug: bool,
}

impl Args {
    /// Resolve the access token from the CLI flag or environment.
    pub fn github_token(&self) -> Option<SecretString> {
        if !self.github_token.is_empty() {
            return Some(SecretString::from(self.github_token.clone()));
        }

        for var in [GIT_TOKEN_ENV_VAR, "GITHUB_TOKEN"] {
            if let Ok(token) = env::var(var)
                && !token.is_empty()
            {
                return Some(SecretString::from(token));
            }
        }

        None
    }

    /// Build the explicit per-run settings threaded through the upgrade
    /// pipeline.
    pub fn run_settings(&self) -> RunSettings {
        RunSettings {
            dry_run: self.dry_run,
            unsigned_commits: self.unsigned_commits,
            working_dir: self.working_dir.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_defaults() {
        let args = Args::parse_from(["wrapperbot"]);
        assert_eq!(args.config, PathBuf::from("wrapperbot.toml"));
        assert_eq!(args.working_dir, PathBuf::from("build/git-clones"));
        assert!(!args.dry_run);
        assert!(!args.unsigned_commits);
        assert!(!args.debug);
    }

    #[test]
    fn flag_token_wins_over_environment() {
        let args = Args::parse_from([
            "wrapperbot",
            "--github-token",
            "from-flag",
            "--dry-run",
        ]);

        let settings = args.run_settings();
        assert!(settings.dry_run);
        assert!(args.github_token().is_some());
    }
}
