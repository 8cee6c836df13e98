//! Repository connection configuration.
use color_eyre::eyre::eyre;
use git_url_parse::GitUrl;
use secrecy::SecretString;
use url::Url;

use crate::result::Result;

/// Remote repository coordinates plus the optional access token. Absent
/// token means unauthenticated (local-only / read) mode.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    pub owner: String,
    pub repo: String,
    pub token: Option<SecretString>,
}

impl RemoteConfig {
    /// Build connection coordinates from a target's repository
    /// identifier: a full URL or an `owner/name` shorthand.
    pub fn from_repo(
        repo: &str,
        token: Option<SecretString>,
    ) -> Result<Self> {
        if Url::parse(repo).is_ok() {
            let parsed = GitUrl::parse(repo)?;
            let owner = parsed.owner.ok_or(eyre!(
                "unable to parse owner from repository url: {repo}"
            ))?;

            return Ok(Self {
                owner,
                repo: parsed.name,
                token,
            });
        }

        let (owner, name) = repo.split_once('/').ok_or_else(|| {
            eyre!("repository must be a url or owner/name shorthand: {repo}")
        })?;

        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return Err(eyre!("malformed owner/name shorthand: {repo}"));
        }

        Ok(Self {
            owner: owner.to_string(),
            repo: name.to_string(),
            token,
        })
    }
}
