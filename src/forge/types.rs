/// Pull request state as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrState {
    Open,
    Closed,
}

/// Host-owned pull request record. Never mutated directly; all changes go
/// through the gateway.
#[derive(Debug, Clone)]
pub struct PullRequestRecord {
    pub number: u64,
    pub head_ref: String,
    pub state: PrState,
}

/// Request to create a new pull request.
#[derive(Debug, Clone)]
pub struct CreatePrRequest {
    pub head_branch: String,
    pub base_branch: String,
    pub title: String,
    pub body: String,
}
