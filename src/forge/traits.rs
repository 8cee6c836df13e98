//! Gateway trait for host pull request operations.
use async_trait::async_trait;

use crate::{
    forge::types::{CreatePrRequest, PullRequestRecord},
    result::Result,
};

#[cfg(test)]
use mockall::automock;

/// Host API surface consumed by the upgrade orchestrator. The gateway
/// performs no dry-run filtering itself; callers decide which mutations
/// to issue.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Forge: Send + Sync {
    /// Whether a branch with this exact name exists on the host.
    /// Not-found is a normal outcome, mapped to `false`.
    async fn branch_exists(&self, branch: &str) -> Result<bool>;

    /// All pull requests (any state) whose head branch starts with the
    /// given prefix: every past proposal for one target/tool pair.
    async fn list_pull_requests(
        &self,
        branch_prefix: &str,
    ) -> Result<Vec<PullRequestRecord>>;

    /// Create a pull request. Failure is fatal for the target; a created
    /// but unlinked change is a correctness hazard.
    async fn create_pull_request(
        &self,
        req: CreatePrRequest,
    ) -> Result<PullRequestRecord>;

    async fn close_pull_request(&self, number: u64) -> Result<()>;

    async fn add_labels(&self, number: u64, labels: &[String])
    -> Result<()>;

    async fn request_reviewers(
        &self,
        number: u64,
        reviewers: &[String],
    ) -> Result<()>;

    async fn add_assignees(
        &self,
        number: u64,
        assignees: &[String],
    ) -> Result<()>;

    /// Look up each name on the host, dropping names that fail to resolve
    /// with a warning. Never fatal for the batch.
    async fn resolve_users(&self, names: &[String]) -> Vec<String>;
}
