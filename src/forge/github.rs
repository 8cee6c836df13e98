//! Implements the Forge trait for GitHub
use async_trait::async_trait;
use color_eyre::eyre::{WrapErr, eyre};
use log::*;
use octocrab::{Octocrab, models::IssueState, params};
use reqwest::StatusCode;
use serde::Deserialize;

use crate::{
    forge::{
        config::RemoteConfig,
        traits::Forge,
        types::{CreatePrRequest, PrState, PullRequestRecord},
    },
    result::Result,
};

#[derive(Debug, Deserialize)]
struct GithubUser {
    login: String,
}

/// GitHub forge implementation using Octocrab for branch lookups and
/// pull request lifecycle calls.
pub struct Github {
    config: RemoteConfig,
    instance: Octocrab,
}

impl Github {
    /// Create a GitHub client, authenticated when a token is configured.
    pub fn new(config: RemoteConfig) -> Result<Self> {
        let mut builder = Octocrab::builder();

        if let Some(token) = config.token.clone() {
            builder = builder.personal_token(token);
        }

        let instance = builder.build()?;

        Ok(Self { config, instance })
    }
}

#[async_trait]
impl Forge for Github {
    async fn branch_exists(&self, branch: &str) -> Result<bool> {
        let result = self
            .instance
            .repos(&self.config.owner, &self.config.repo)
            .get_ref(&params::repos::Reference::Branch(branch.to_string()))
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(octocrab::Error::GitHub { source, .. })
                if source.status_code == StatusCode::NOT_FOUND =>
            {
                Ok(false)
            }
            Err(err) => Err(eyre!(
                "failed to look up branch '{branch}' on {}/{}: {err}",
                self.config.owner,
                self.config.repo
            )),
        }
    }

    async fn list_pull_requests(
        &self,
        branch_prefix: &str,
    ) -> Result<Vec<PullRequestRecord>> {
        let page = self
            .instance
            .pulls(&self.config.owner, &self.config.repo)
            .list()
            .state(params::State::All)
            .per_page(100)
            .send()
            .await
            .wrap_err_with(|| {
                format!(
                    "failed to list pull requests for {}/{}",
                    self.config.owner, self.config.repo
                )
            })?;

        let prs = self.instance.all_pages(page).await?;

        let records = prs
            .into_iter()
            .filter(|pr| pr.head.ref_field.starts_with(branch_prefix))
            .map(|pr| {
                let state = match pr.state {
                    Some(IssueState::Closed) => PrState::Closed,
                    _ => PrState::Open,
                };

                PullRequestRecord {
                    number: pr.number,
                    head_ref: pr.head.ref_field,
                    state,
                }
            })
            .collect();

        Ok(records)
    }

    async fn create_pull_request(
        &self,
        req: CreatePrRequest,
    ) -> Result<PullRequestRecord> {
        let pr = self
            .instance
            .pulls(&self.config.owner, &self.config.repo)
            .create(&req.title, &req.head_branch, &req.base_branch)
            .body(&req.body)
            .send()
            .await
            .wrap_err_with(|| {
                format!(
                    "failed to create pull request from '{}' on {}/{}",
                    req.head_branch, self.config.owner, self.config.repo
                )
            })?;

        Ok(PullRequestRecord {
            number: pr.number,
            head_ref: req.head_branch,
            state: PrState::Open,
        })
    }

    async fn close_pull_request(&self, number: u64) -> Result<()> {
        self.instance
            .pulls(&self.config.owner, &self.config.repo)
            .update(number)
            .state(params::pulls::State::Closed)
            .send()
            .await
            .wrap_err_with(|| {
                format!("failed to close pull request #{number}")
            })?;

        Ok(())
    }

    async fn add_labels(
        &self,
        number: u64,
        labels: &[String],
    ) -> Result<()> {
        self.instance
            .issues(&self.config.owner, &self.config.repo)
            .add_labels(number, labels)
            .await?;

        Ok(())
    }

    async fn request_reviewers(
        &self,
        number: u64,
        reviewers: &[String],
    ) -> Result<()> {
        self.instance
            .pulls(&self.config.owner, &self.config.repo)
            .request_reviews(number, reviewers.to_vec(), Vec::<String>::new())
            .await?;

        Ok(())
    }

    async fn add_assignees(
        &self,
        number: u64,
        assignees: &[String],
    ) -> Result<()> {
        let assignees: Vec<&str> =
            assignees.iter().map(String::as_str).collect();

        self.instance
            .issues(&self.config.owner, &self.config.repo)
            .add_assignees(number, &assignees)
            .await?;

        Ok(())
    }

    async fn resolve_users(&self, names: &[String]) -> Vec<String> {
        let mut resolved = vec![];

        for name in names {
            let result: std::result::Result<GithubUser, octocrab::Error> =
                self.instance.get(format!("/users/{name}"), None::<&()>).await;

            match result {
                Ok(user) => resolved.push(user.login),
                Err(err) => {
                    warn!("error fetching github user '{name}': {err}")
                }
            }
        }

        resolved
    }
}
