//! Git workspace operations for one upgrade target.
//!
//! Each target owns an isolated checkout directory keyed by its name, so
//! concurrent targets never contend for the same filesystem path. The
//! checkout is recreated on every run; only the path is deterministic.
use log::*;
use std::{fs, path::Path};
use url::Url;

use crate::{
    exec::{CommandRunner, ExecError, ProcessRunner},
    result::Result,
};

#[cfg(test)]
use mockall::automock;

/// Git operations the upgrade pipeline needs. Implemented by
/// [`GitWorkspace`]; mocked in orchestrator tests.
#[cfg_attr(test, automock)]
pub trait Workspace: Send + Sync {
    /// Shallow-clone `base_branch` of `repo` into `checkout_dir`,
    /// replacing any checkout left behind by a previous run.
    fn clone_repository(
        &self,
        repo: &str,
        base_branch: &str,
        checkout_dir: &Path,
    ) -> Result<()>;

    /// Whether any tracked file differs from the cloned base branch.
    fn has_changes(&self, checkout_dir: &Path) -> Result<bool>;

    /// Stage exactly `files`, commit them on a new branch, and push the
    /// branch to origin. The push is skipped in dry-run mode; staging and
    /// commit still happen locally for inspection.
    fn commit_and_push(
        &self,
        checkout_dir: &Path,
        files: &[String],
        branch: &str,
        message: &str,
        extra_commit_args: &[String],
    ) -> Result<()>;
}

/// `Workspace` implementation shelling out to the git CLI.
pub struct GitWorkspace {
    runner: Box<dyn CommandRunner>,
    dry_run: bool,
    unsigned_commits: bool,
}

impl GitWorkspace {
    pub fn new(dry_run: bool, unsigned_commits: bool) -> Self {
        Self {
            runner: Box::new(ProcessRunner),
            dry_run,
            unsigned_commits,
        }
    }

    #[cfg(test)]
    fn with_runner(
        runner: Box<dyn CommandRunner>,
        dry_run: bool,
        unsigned_commits: bool,
    ) -> Self {
        Self {
            runner,
            dry_run,
            unsigned_commits,
        }
    }

    fn git(
        &self,
        dir: &Path,
        args: &[&str],
    ) -> std::result::Result<String, ExecError> {
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        self.runner.run(dir, "git", &args)
    }

    /// Expand an `owner/name` shorthand against the default GitHub clone
    /// URL scheme; well-formed URLs pass through untouched.
    fn clone_url(repo: &str) -> String {
        if Url::parse(repo).is_ok() {
            repo.to_string()
        } else {
            format!("https://github.com/{repo}.git")
        }
    }
}

impl Workspace for GitWorkspace {
    fn clone_repository(
        &self,
        repo: &str,
        base_branch: &str,
        checkout_dir: &Path,
    ) -> Result<()> {
        if checkout_dir.exists() {
            fs::remove_dir_all(checkout_dir)?;
        }

        let parent = checkout_dir.parent().unwrap_or(Path::new("."));
        fs::create_dir_all(parent)?;

        let url = Self::clone_url(repo);
        let dest = checkout_dir.display().to_string();

        info!("cloning {url} at branch '{base_branch}'");
        self.git(
            parent,
            &[
                "clone",
                "--quiet",
                "--depth",
                "1",
                "-b",
                base_branch,
                &url,
                &dest,
            ],
        )?;

        if self.unsigned_commits {
            self.git(
                checkout_dir,
                &["config", "--local", "commit.gpgsign", "false"],
            )?;
        }

        Ok(())
    }

    fn has_changes(&self, checkout_dir: &Path) -> Result<bool> {
        // exit code 0 means no diff, 1 means a diff exists; anything else
        // (e.g. not a repository) is a real failure
        match self.git(checkout_dir, &["diff", "--quiet", "--exit-code"]) {
            Ok(_) => Ok(false),
            Err(ExecError::Failed { status: 1, .. }) => Ok(true),
            Err(err) => Err(err.into()),
        }
    }

    fn commit_and_push(
        &self,
        checkout_dir: &Path,
        files: &[String],
        branch: &str,
        message: &str,
        extra_commit_args: &[String],
    ) -> Result<()> {
        for file in files {
            self.git(checkout_dir, &["add", file])?;
        }

        self.git(checkout_dir, &["checkout", "--quiet", "-b", branch])?;

        let mut commit_args: Vec<String> =
            ["commit", "--quiet", "--signoff", "-m", message]
                .iter()
                .map(|s| s.to_string())
                .collect();
        commit_args.extend(extra_commit_args.iter().cloned());
        self.runner.run(checkout_dir, "git", &commit_args)?;

        if self.dry_run {
            info!("dry run: skipping push of branch '{branch}'");
            return Ok(());
        }

        self.git(
            checkout_dir,
            &["push", "--quiet", "-u", "origin", branch],
        )?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::MockCommandRunner;

    fn workspace_with(
        mock: MockCommandRunner,
        dry_run: bool,
    ) -> GitWorkspace {
        GitWorkspace::with_runner(Box::new(mock), dry_run, false)
    }

    #[test]
    fn expands_shorthand_to_github_clone_url() {
        assert_eq!(
            GitWorkspace::clone_url("acme/my-project"),
            "https://github.com/acme/my-project.git"
        );
        assert_eq!(
            GitWorkspace::clone_url("https://example.com/acme/repo.git"),
            "https://example.com/acme/repo.git"
        );
    }

    #[test]
    fn diff_exit_code_one_means_changes() {
        let mut mock = MockCommandRunner::new();
        mock.expect_run().times(1).returning(|_, _, _| {
            Err(ExecError::Failed {
                command: "git diff --quiet --exit-code".to_string(),
                status: 1,
                output: String::new(),
            })
        });

        let workspace = workspace_with(mock, false);
        assert!(workspace.has_changes(Path::new("checkout")).unwrap());
    }

    #[test]
    fn diff_exit_code_zero_means_no_changes() {
        let mut mock = MockCommandRunner::new();
        mock.expect_run()
            .times(1)
            .returning(|_, _, _| Ok(String::new()));

        let workspace = workspace_with(mock, false);
        assert!(!workspace.has_changes(Path::new("checkout")).unwrap());
    }

    #[test]
    fn diff_other_failures_propagate() {
        let mut mock = MockCommandRunner::new();
        mock.expect_run().times(1).returning(|_, _, _| {
            Err(ExecError::Failed {
                command: "git diff --quiet --exit-code".to_string(),
                status: 128,
                output: "not a git repository".to_string(),
            })
        });

        let workspace = workspace_with(mock, false);
        assert!(workspace.has_changes(Path::new("checkout")).is_err());
    }

    #[test]
    fn commit_and_push_stages_only_given_files() {
        let mut mock = MockCommandRunner::new();

        mock.expect_run()
            .withf(|_, _, args| args.first().map(String::as_str) == Some("add"))
            .times(2)
            .returning(|_, _, _| Ok(String::new()));

        mock.expect_run()
            .withf(|_, _, args| {
                args.first().map(String::as_str) == Some("checkout")
            })
            .times(1)
            .returning(|_, _, _| Ok(String::new()));

        mock.expect_run()
            .withf(|_, _, args| {
                args.first().map(String::as_str) == Some("commit")
                    && args.contains(&"--signoff".to_string())
                    && args.contains(&"-S".to_string())
            })
            .times(1)
            .returning(|_, _, _| Ok(String::new()));

        mock.expect_run()
            .withf(|_, _, args| args.first().map(String::as_str) == Some("push"))
            .times(1)
            .returning(|_, _, _| Ok(String::new()));

        let workspace = workspace_with(mock, false);
        workspace
            .commit_and_push(
                Path::new("checkout"),
                &["gradlew".to_string(), "gradlew.bat".to_string()],
                "my-project-gradle-wrapper-8.5",
                "Bump Gradle Wrapper from 8.4 to 8.5.",
                &["-S".to_string()],
            )
            .unwrap();
    }

    #[test]
    fn dry_run_skips_push_but_still_commits() {
        let mut mock = MockCommandRunner::new();

        mock.expect_run()
            .withf(|_, _, args| args.first().map(String::as_str) == Some("push"))
            .times(0)
            .returning(|_, _, _| Ok(String::new()));

        mock.expect_run()
            .withf(|_, _, args| args.first().map(String::as_str) != Some("push"))
            .times(3)
            .returning(|_, _, _| Ok(String::new()));

        let workspace = workspace_with(mock, true);
        workspace
            .commit_and_push(
                Path::new("checkout"),
                &["gradlew".to_string()],
                "my-project-gradle-wrapper-8.5",
                "Bump Gradle Wrapper from 8.4 to 8.5.",
                &[],
            )
            .unwrap();
    }

    #[test]
    fn clone_runs_shallow_clone_of_base_branch() {
        let dir = tempfile::tempdir().unwrap();
        let checkout_dir = dir.path().join("my-project");
        let parent = dir.path().to_path_buf();
        let dest = checkout_dir.display().to_string();

        let mut mock = MockCommandRunner::new();
        mock.expect_run()
            .withf(move |run_dir, program, args| {
                run_dir == parent
                    && program == "git"
                    && args.len() == 8
                    && args[0] == "clone"
                    && args[1] == "--quiet"
                    && args[2] == "--depth"
                    && args[3] == "1"
                    && args[4] == "-b"
                    && args[5] == "main"
                    && args[6] == "https://github.com/acme/my-project.git"
                    && args[7] == dest
            })
            .times(1)
            .returning(|_, _, _| Ok(String::new()));

        let workspace = workspace_with(mock, false);
        workspace
            .clone_repository("acme/my-project", "main", &checkout_dir)
            .unwrap();
    }

    #[test]
    fn unsigned_commits_disable_gpg_signing_in_the_checkout() {
        let dir = tempfile::tempdir().unwrap();
        let checkout_dir = dir.path().join("my-project");
        let config_dir = checkout_dir.clone();

        let mut mock = MockCommandRunner::new();
        mock.expect_run()
            .withf(|_, _, args| {
                args.first().map(String::as_str) == Some("clone")
            })
            .times(1)
            .returning(|_, _, _| Ok(String::new()));
        mock.expect_run()
            .withf(move |run_dir, _, args| {
                run_dir == config_dir
                    && args
                        == [
                            "config".to_string(),
                            "--local".to_string(),
                            "commit.gpgsign".to_string(),
                            "false".to_string(),
                        ]
            })
            .times(1)
            .returning(|_, _, _| Ok(String::new()));

        let workspace =
            GitWorkspace::with_runner(Box::new(mock), false, true);
        workspace
            .clone_repository("acme/my-project", "main", &checkout_dir)
            .unwrap();
    }

    #[test]
    fn clone_replaces_a_stale_checkout() {
        let dir = tempfile::tempdir().unwrap();
        let checkout_dir = dir.path().join("my-project");
        fs::create_dir_all(&checkout_dir).unwrap();
        fs::write(checkout_dir.join("leftover.txt"), "stale").unwrap();

        let mut mock = MockCommandRunner::new();
        mock.expect_run()
            .times(1)
            .returning(|_, _, _| Ok(String::new()));

        let workspace = workspace_with(mock, false);
        workspace
            .clone_repository("acme/my-project", "main", &checkout_dir)
            .unwrap();

        // the stale directory is gone; the mocked clone creates nothing
        assert!(!checkout_dir.exists());
    }
}
