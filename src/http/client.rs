//! HTTP client for release metadata and asset downloads.

use anyhow::{Context, Result};
use log::debug;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::io::Write;

use super::status::check_status;

#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a new HTTP client wrapping the given reqwest Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Performs a GET request and deserializes the JSON response.
    #[tracing::instrument(skip(self))]
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!("GET JSON from {}...", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send request")?;

        let response = check_status(response)?;

        response
            .json::<T>()
            .await
            .context("Failed to parse JSON response")
    }

    /// Streams the body of `url` into `writer`, returning the byte count.
    ///
    /// A write error (including a cancelled progress sink) aborts the
    /// transfer.
    #[tracing::instrument(skip(self, writer))]
    pub async fn download<W: Write + ?Sized>(&self, url: &str, writer: &mut W) -> Result<u64> {
        debug!("Downloading file from {}...", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to start download request")?;

        let mut response = check_status(response)?;
        let mut downloaded_bytes: u64 = 0;

        while let Some(chunk) = response
            .chunk()
            .await
            .context("Failed to read chunk from download stream")?
        {
            writer
                .write_all(&chunk)
                .context("Failed to write chunk to file")?;
            downloaded_bytes += chunk.len() as u64;
        }
        writer.flush().context("Failed to flush downloaded file")?;

        debug!(
            "Downloaded {:.2} MB",
            downloaded_bytes as f64 / (1024.0 * 1024.0)
        );

        Ok(downloaded_bytes)
    }
}
