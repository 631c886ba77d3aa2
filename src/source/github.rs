//! GitHub releases API.

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;

use crate::asset::Asset;
use crate::http::HttpClient;

use super::{PublishedRelease, Release, ReleaseSource, Repository};

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// GitHub API response types (internal).
mod api {
    use serde::Deserialize;

    #[derive(Deserialize, Debug)]
    pub struct Release {
        pub tag_name: String,
        pub assets: Vec<Asset>,
    }

    #[derive(Deserialize, Debug)]
    pub struct Asset {
        pub id: u64,
        pub name: String,
        #[serde(default)]
        pub content_type: String,
        pub size: u64,
        pub browser_download_url: String,
    }
}

pub struct GitHubSource {
    http_client: HttpClient,
    api_url: String,
}

impl GitHubSource {
    pub fn new(http_client: HttpClient, api_url: &str) -> Self {
        Self {
            http_client,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    async fn fetch(&self, repository: &Repository, path: &str) -> Result<PublishedRelease> {
        let url = format!(
            "{}/repos/{}/{}/releases/{}",
            self.api_url, repository.owner, repository.repo, path
        );
        debug!("Fetching release from {}...", url);

        let release: api::Release = self
            .http_client
            .get_json(&url)
            .await
            .with_context(|| format!("Failed to fetch release {} of {}", path, repository))?;

        Ok(PublishedRelease {
            release: Release::new(repository.clone(), release.tag_name),
            assets: release.assets.into_iter().map(Asset::from).collect(),
        })
    }
}

#[async_trait]
impl ReleaseSource for GitHubSource {
    async fn latest_release(&self, repository: &Repository) -> Result<PublishedRelease> {
        self.fetch(repository, "latest").await
    }

    async fn release_by_tag(&self, repository: &Repository, tag: &str) -> Result<PublishedRelease> {
        self.fetch(repository, &format!("tags/{}", tag)).await
    }
}

impl From<api::Asset> for Asset {
    fn from(a: api::Asset) -> Self {
        Asset {
            id: a.id,
            name: a.name,
            content_type: a.content_type,
            size: a.size,
            url: a.browser_download_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpStatusError;
    use reqwest::Client;

    const RELEASE_JSON: &str = r#"{
        "tag_name": "v1.13.0",
        "name": "v1.13.0",
        "assets": [
            {
                "id": 1001,
                "name": "checksums.txt",
                "content_type": "text/plain",
                "size": 615,
                "browser_download_url": "https://github.com/o/r/releases/download/v1.13.0/checksums.txt"
            },
            {
                "id": 1002,
                "name": "kn-event-darwin-arm64",
                "content_type": "application/octet-stream",
                "size": 58727008,
                "browser_download_url": "https://github.com/o/r/releases/download/v1.13.0/kn-event-darwin-arm64"
            }
        ]
    }"#;

    fn repository() -> Repository {
        "knative-extensions/kn-plugin-event".parse().unwrap()
    }

    #[tokio::test]
    async fn test_latest_release() {
        // --- Setup ---
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock(
                "GET",
                "/repos/knative-extensions/kn-plugin-event/releases/latest",
            )
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(RELEASE_JSON)
            .create_async()
            .await;
        let source = GitHubSource::new(HttpClient::new(Client::new()), &server.url());

        // --- Execute ---
        let published = source.latest_release(&repository()).await.unwrap();

        // --- Verify ---
        mock.assert_async().await;
        assert_eq!(published.release.tag, "v1.13.0");
        assert_eq!(published.release.repository, repository());
        assert_eq!(published.assets.len(), 2);
        assert_eq!(published.assets[1].id, 1002);
        assert_eq!(published.assets[1].size, 58_727_008);
        assert_eq!(
            published.assets[1].content_type,
            "application/octet-stream"
        );
        assert!(published.assets[0].url.ends_with("/checksums.txt"));
    }

    #[tokio::test]
    async fn test_release_by_tag() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock(
                "GET",
                "/repos/knative-extensions/kn-plugin-event/releases/tags/v1.13.0",
            )
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(RELEASE_JSON)
            .create_async()
            .await;
        let source = GitHubSource::new(HttpClient::new(Client::new()), &server.url());

        let published = source
            .release_by_tag(&repository(), "v1.13.0")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(published.release.tag, "v1.13.0");
    }

    #[tokio::test]
    async fn test_missing_release() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock(
                "GET",
                "/repos/knative-extensions/kn-plugin-event/releases/tags/v0.0.0",
            )
            .with_status(404)
            .create_async()
            .await;
        let source = GitHubSource::new(HttpClient::new(Client::new()), &server.url());

        let err = source
            .release_by_tag(&repository(), "v0.0.0")
            .await
            .unwrap_err();

        assert!(err.to_string().contains("Failed to fetch release"));
        assert!(err.downcast_ref::<HttpStatusError>().is_some());
    }

    #[test]
    fn test_api_url_trailing_slash() {
        let source = GitHubSource::new(HttpClient::new(Client::new()), "https://api.example/");
        assert_eq!(source.api_url(), "https://api.example");
    }
}
