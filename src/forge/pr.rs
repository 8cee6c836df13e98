//! Branch naming and pull request reconciliation.
//!
//! The PR branch name is a pure function of `(project, tool, version)`,
//! which is what makes re-runs idempotent: the same inputs always compute
//! the same branch name, so existence checks on the host are reliable.
use crate::{forge::types::{PrState, PullRequestRecord}, version::VersionNumber};

/// Deterministic prefix shared by every proposal for one target/tool
/// pair. Used both to name new branches and to filter prior proposals.
pub fn branch_prefix(project: &str, build_tool_name: &str) -> String {
    format!("{project}-{}-wrapper-", build_tool_name.to_lowercase())
}

/// Full PR branch name for one proposed version.
pub fn pr_branch(
    project: &str,
    build_tool_name: &str,
    version: &str,
) -> String {
    format!("{}{version}", branch_prefix(project, build_tool_name))
}

/// Whether a closed pull request exists for this exact branch name,
/// meaning an operator already rejected this exact version bump.
pub fn closed_pr_exists(
    records: &[PullRequestRecord],
    branch: &str,
) -> bool {
    records
        .iter()
        .any(|r| r.head_ref == branch && r.state == PrState::Closed)
}

/// Open pull requests superseded by a new proposal for `target_version`:
/// those whose branch-encoded version is strictly older. Newer open
/// proposals are left alone.
pub fn pull_requests_to_close<'a>(
    records: &'a [PullRequestRecord],
    branch_prefix: &str,
    target_version: &str,
) -> Vec<&'a PullRequestRecord> {
    let target = VersionNumber::parse(target_version);

    records
        .iter()
        .filter(|r| r.state == PrState::Open)
        .filter(|r| {
            r.head_ref
                .strip_prefix(branch_prefix)
                .map(|encoded| VersionNumber::parse(encoded) < target)
                .unwrap_or(false)
        })
        .collect()
}
