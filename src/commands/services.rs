//! Service factory for building application dependencies.
//!
//! Services (HTTP client, release source, UI, cache) are built from
//! configuration values but are not part of the configuration itself.

use std::sync::Arc;

use anyhow::Result;
use log::debug;
use reqwest::{
    Client,
    header::{AUTHORIZATION, HeaderMap, HeaderValue},
};

use crate::cache::DownloadCache;
use crate::http::HttpClient;
use crate::source::{GitHubSource, ReleaseSource};
use crate::ui::{CancelFlag, QuietUi, TerminalUi, Ui};

use super::config::Config;

const USER_AGENT: &str = concat!("ghet/", env!("GHET_VERSION"));

/// Build an HTTP client with optional authentication token
pub fn build_http_client(token: Option<&str>) -> Result<HttpClient> {
    let mut headers = HeaderMap::new();

    if let Some(token) = token {
        let mut auth_value = HeaderValue::from_str(&format!("Bearer {}", token))?;
        auth_value.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_value);
        debug!("HTTP client configured with authentication");
    }

    let client = Client::builder()
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .build()?;

    Ok(HttpClient::new(client))
}

pub struct Services {
    pub http: HttpClient,
    pub source: Arc<dyn ReleaseSource>,
    pub ui: Arc<dyn Ui>,
    pub cache: DownloadCache,
}

impl Services {
    pub fn from_config(config: &Config, interactive: bool, cancel: CancelFlag) -> Result<Self> {
        let http = build_http_client(config.token.as_deref())?;
        let source = Arc::new(GitHubSource::new(http.clone(), &config.api_url));
        let ui: Arc<dyn Ui> = if config.quiet {
            Arc::new(QuietUi::new(cancel))
        } else {
            Arc::new(TerminalUi::new(interactive, cancel))
        };

        Ok(Self {
            http,
            source,
            ui,
            cache: DownloadCache::new(&config.cache_dir),
        })
    }
}
