//! Upgrade orchestration for one target.
//!
//! Sequences workspace, strategy, and forge calls to decide between
//! skipping and publishing a wrapper upgrade. Correctness under repeated
//! or overlapping invocations rests on the deterministic branch name: the
//! host-side existence checks short-circuit duplicate work before any
//! local mutation is pushed.
use log::*;
use std::path::{Path, PathBuf};

use crate::{
    config::UpgradeTarget,
    forge::{
        pr,
        traits::Forge,
        types::{CreatePrRequest, PullRequestRecord},
    },
    result::Result,
    strategy::{BuildToolStrategy, VersionInfo},
    version::VersionNumber,
    workspace::Workspace,
};

/// Explicit per-run settings. Threaded through the call chain instead of
/// read from ambient process state.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub dry_run: bool,
    pub unsigned_commits: bool,
    pub working_dir: PathBuf,
}

/// Terminal state of one orchestrator run. Every variant maps to a
/// distinct human-readable message logged at the point of decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The exact proposal branch already exists on the host.
    BranchExists { branch: String },
    /// An operator closed a PR for this exact version and recreation is
    /// not enabled.
    ClosedPrExists { branch: String },
    /// Regeneration produced no diff against the base branch.
    UpToDate { version: String },
    /// Dry run: local commit produced, host untouched.
    DryRun { branch: String },
    /// Branch pushed and pull request created.
    Published { branch: String, number: u64 },
}

/// State machine that produces at most one upgrade proposal per run.
pub struct Orchestrator {
    target: UpgradeTarget,
    strategy: Box<dyn BuildToolStrategy>,
    workspace: Box<dyn Workspace>,
    forge: Box<dyn Forge>,
    settings: RunSettings,
}

/// Keep the used version when the lookup returns something older or
/// equal; stale lookups must never regress an upgrade.
fn effective_latest(used: &VersionInfo, latest: VersionInfo) -> VersionInfo {
    if VersionNumber::parse(&used.version)
        >= VersionNumber::parse(&latest.version)
    {
        used.clone()
    } else {
        latest
    }
}

impl Orchestrator {
    pub fn new(
        target: UpgradeTarget,
        strategy: Box<dyn BuildToolStrategy>,
        workspace: Box<dyn Workspace>,
        forge: Box<dyn Forge>,
        settings: RunSettings,
    ) -> Self {
        Self {
            target,
            strategy,
            workspace,
            forge,
            settings,
        }
    }

    pub async fn run(&self) -> Result<Outcome> {
        let project = &self.target.name;
        let tool = self.strategy.build_tool_name();

        let checkout_dir = self.settings.working_dir.join(project);
        let root_project_dir = checkout_dir.join(&self.target.dir);

        self.workspace.clone_repository(
            &self.target.repo,
            &self.target.base_branch,
            &checkout_dir,
        )?;

        let used = self.strategy.extract_current_version(&root_project_dir)?;
        let looked_up = self
            .strategy
            .lookup_latest_version(self.target.options.allow_pre_release)
            .await?;
        let latest = effective_latest(&used, looked_up);

        let prefix = pr::branch_prefix(project, &tool);
        let branch = pr::pr_branch(project, &tool, &latest.version);

        if self.forge.branch_exists(&branch).await? {
            info!(
                "branch '{branch}' to upgrade {tool} Wrapper to {} already exists for project '{project}'",
                latest.version
            );
            return Ok(Outcome::BranchExists { branch });
        }

        let records = self.forge.list_pull_requests(&prefix).await?;

        if pr::closed_pr_exists(&records, &branch)
            && !self.target.options.recreate_closed_pr
        {
            info!(
                "a closed pull request from branch '{branch}' to upgrade {tool} Wrapper to {} already exists for project '{project}'. Use the `recreate_closed_pr` option to recreate it",
                latest.version
            );
            return Ok(Outcome::ClosedPrExists { branch });
        }

        let to_close =
            pr::pull_requests_to_close(&records, &prefix, &latest.version);

        // run regeneration twice: some generators only converge on the
        // second pass (e.g. checksum files referencing the wrapper
        // script itself)
        self.strategy.run_wrapper(&root_project_dir, &latest)?;
        self.strategy.run_wrapper(&root_project_dir, &latest)?;

        if !self.workspace.has_changes(&checkout_dir)? {
            info!(
                "no pull request created to upgrade {tool} Wrapper to {} since already on latest version for project '{project}'",
                latest.version
            );
            return Ok(Outcome::UpToDate {
                version: latest.version,
            });
        }

        let title = self.short_description(&used, &latest, &tool);
        let body = self.long_description(&used, &latest, &tool);
        let files = self.staged_files(&root_project_dir);

        self.workspace.commit_and_push(
            &checkout_dir,
            &files,
            &branch,
            &body,
            &self.target.options.git_commit_extra_args,
        )?;

        if self.settings.dry_run {
            info!(
                "dry run: skipping creation of pull request '{branch}' that would upgrade {tool} Wrapper to {} for project '{project}'",
                latest.version
            );
            for record in to_close {
                info!(
                    "dry run: skipping closure of pull request #{} on project '{project}' because its target {tool} Wrapper version is older than {}",
                    record.number, latest.version
                );
            }
            return Ok(Outcome::DryRun { branch });
        }

        let created = self
            .forge
            .create_pull_request(CreatePrRequest {
                head_branch: branch.clone(),
                base_branch: self.target.base_branch.clone(),
                title,
                body,
            })
            .await?;

        info!(
            "pull request #{} created from branch '{branch}' to upgrade {tool} Wrapper to {} for project '{project}'",
            created.number, latest.version
        );

        self.close_superseded(&to_close, &tool, &latest).await;
        self.apply_labels(created.number).await;
        self.request_reviewers(created.number).await;
        self.add_assignees(created.number).await;

        Ok(Outcome::Published {
            branch,
            number: created.number,
        })
    }

    /// Wrapper file paths relative to the checkout root, where git
    /// staging runs.
    fn staged_files(&self, root_project_dir: &Path) -> Vec<String> {
        let dir = self.target.dir.trim_start_matches("./");

        self.strategy
            .wrapper_files(root_project_dir)
            .into_iter()
            .map(|file| {
                if dir == "." || dir.is_empty() {
                    file
                } else {
                    format!("{}/{file}", dir.trim_end_matches('/'))
                }
            })
            .collect()
    }

    fn short_description(
        &self,
        used: &VersionInfo,
        latest: &VersionInfo,
        tool: &str,
    ) -> String {
        let mut title = if latest.version == used.version {
            format!("Update {tool} Wrapper version {} files", latest.version)
        } else {
            format!(
                "Bump {tool} Wrapper from {} to {}",
                used.version, latest.version
            )
        };

        let dir = self.target.dir.trim_start_matches("./");
        if dir != "." && !dir.is_empty() {
            title.push_str(&format!(" in /{dir}"));
        }

        title
    }

    fn long_description(
        &self,
        used: &VersionInfo,
        latest: &VersionInfo,
        tool: &str,
    ) -> String {
        if latest.version == used.version {
            return format!(
                "Update {tool} Wrapper version {} files.",
                latest.version
            );
        }

        format!(
            "Bump {tool} Wrapper from {} to {}.\n\nRelease notes of {tool} {} can be found here:\n{}",
            used.version,
            latest.version,
            latest.version,
            self.strategy.release_notes_link(&latest.version)
        )
    }

    async fn close_superseded(
        &self,
        to_close: &[&PullRequestRecord],
        tool: &str,
        latest: &VersionInfo,
    ) {
        for record in to_close {
            match self.forge.close_pull_request(record.number).await {
                Ok(()) => info!(
                    "pull request #{} on project '{}' has been closed because its target {tool} Wrapper version is older than {}",
                    record.number, self.target.name, latest.version
                ),
                Err(err) => warn!(
                    "error closing pull request #{}: {err:#}",
                    record.number
                ),
            }
        }
    }

    async fn apply_labels(&self, number: u64) {
        let labels = &self.target.options.labels;
        if labels.is_empty() {
            return;
        }

        if let Err(err) = self.forge.add_labels(number, labels).await {
            warn!("error adding labels: {err:#}");
        }
    }

    async fn request_reviewers(&self, number: u64) {
        let reviewers = &self.target.options.reviewers;
        if reviewers.is_empty() {
            return;
        }

        let resolved = self.forge.resolve_users(reviewers).await;
        if resolved.is_empty() {
            return;
        }

        if let Err(err) =
            self.forge.request_reviewers(number, &resolved).await
        {
            warn!("error requesting reviewers: {err:#}");
        }
    }

    async fn add_assignees(&self, number: u64) {
        let assignees = &self.target.options.assignees;
        if assignees.is_empty() {
            return;
        }

        let resolved = self.forge.resolve_users(assignees).await;
        if resolved.is_empty() {
            return;
        }

        if let Err(err) = self.forge.add_assignees(number, &resolved).await {
            warn!("error adding assignees: {err:#}");
        }
    }
}
