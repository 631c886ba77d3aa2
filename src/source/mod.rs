//! Release metadata sources.
//!
//! The pipeline only needs two read-only operations: "latest release" and
//! "release by tag". Anything answering them with a list of assets (id, name,
//! content type, size, download URL) is a valid source.

mod github;

use anyhow::Result;
use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;

use crate::asset::Asset;

pub use github::{DEFAULT_API_URL, GitHubSource};

/// Tag sentinel resolved to the newest published release.
pub const LATEST_TAG: &str = "latest";

/// Repository identifier (owner/repo format).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Repository {
    pub owner: String,
    pub repo: String,
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

impl FromStr for Repository {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('/').collect();
        if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
            anyhow::bail!("Invalid repository format: {:?}. Expected 'owner/repo'.", s)
        } else {
            Ok(Repository {
                owner: parts[0].to_string(),
                repo: parts[1].to_string(),
            })
        }
    }
}

/// Release coordinates. `tag` may be [`LATEST_TAG`] until resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    pub repository: Repository,
    pub tag: String,
}

impl Release {
    pub fn new(repository: Repository, tag: impl Into<String>) -> Self {
        Self {
            repository,
            tag: tag.into(),
        }
    }

    pub fn is_latest(&self) -> bool {
        self.tag == LATEST_TAG
    }
}

impl fmt::Display for Release {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.repository, self.tag)
    }
}

/// A resolved release (concrete tag) and its assets, in API order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedRelease {
    pub release: Release,
    pub assets: Vec<Asset>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    async fn latest_release(&self, repository: &Repository) -> Result<PublishedRelease>;

    async fn release_by_tag(&self, repository: &Repository, tag: &str)
    -> Result<PublishedRelease>;
}

/// Fetches `release`, resolving the latest sentinel first.
pub async fn fetch_release(
    source: &dyn ReleaseSource,
    release: &Release,
) -> Result<PublishedRelease> {
    if release.is_latest() {
        source.latest_release(&release.repository).await
    } else {
        source
            .release_by_tag(&release.repository, &release.tag)
            .await
    }
}
