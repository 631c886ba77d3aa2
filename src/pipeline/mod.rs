//! The installation pipeline.
//!
//! One strictly sequential pass per installation:
//! plan → download → verify → extract → relocate → clean cache.
//! Every stage aborts the run on failure and nothing is retried. The cache
//! is only purged after a fully successful run, so a failed run leaves its
//! downloads for the next attempt.

mod extract;
mod fetch;
mod plan;
mod relocate;
mod verify;

use anyhow::Result;
use log::{debug, info};
use std::path::PathBuf;
use std::sync::Arc;

use crate::asset::create_index;
use crate::cache::DownloadCache;
use crate::error::{InstallError, install_error};
use crate::http::HttpClient;
use crate::install::{Download, Installation};
use crate::runtime::Runtime;
use crate::source::{ReleaseSource, fetch_release};
use crate::ui::{Ui, with_spinner_async};

pub use plan::{Plan, prioritize};

pub struct Pipeline<R: Runtime> {
    runtime: R,
    source: Arc<dyn ReleaseSource>,
    http: HttpClient,
    ui: Arc<dyn Ui>,
    cache: DownloadCache,
}

impl<R: Runtime> Pipeline<R> {
    pub fn new(
        runtime: R,
        source: Arc<dyn ReleaseSource>,
        http: HttpClient,
        ui: Arc<dyn Ui>,
        cache: DownloadCache,
    ) -> Self {
        Self {
            runtime,
            source,
            http,
            ui,
            cache,
        }
    }

    /// Resolves the release and selects the assets to download.
    #[tracing::instrument(skip(self, installation))]
    pub async fn create_plan(&self, installation: &Installation) -> Result<Plan> {
        let release = &installation.release;
        let published = with_spinner_async(
            self.ui.as_ref(),
            &format!("⛳️ Getting information about {} release", release.tag),
            fetch_release(self.source.as_ref(), release),
        )
        .await?;
        let target = &installation.target;
        debug!(
            "Release {} has {} assets",
            published.release,
            published.assets.len()
        );

        let matched: Vec<_> = published
            .assets
            .into_iter()
            .filter(|asset| target.matches(&asset.name))
            .collect();
        let index = create_index(&matched);
        if index.artifacts().is_empty() {
            return Err(InstallError::NoAssetFound(format!(
                "{} for {}/{} in {}",
                target.file_name, target.platform.os, target.platform.arch, published.release
            ))
            .into());
        }

        let assets = prioritize(index);
        self.ui.println(&format!(
            "🎉 Found {} matching assets for {}",
            assets.len(),
            published.release.tag
        ));
        Ok(Plan {
            release: published.release,
            assets,
        })
    }

    /// Downloads, verifies and installs the plan's assets into the
    /// destination, returning the installed paths.
    #[tracing::instrument(skip(self, download, plan))]
    pub async fn download(&self, download: &Download, plan: &Plan) -> Result<Vec<PathBuf>> {
        let installation = &download.installation;
        let index = create_index(&plan.assets);

        // Decided before any transfer so an ambiguous plan fails early.
        let manifest = match self.select_checksum(&index.checksums) {
            Ok(asset) => Some(asset),
            Err(err) if matches!(install_error(&err), Some(InstallError::NoChecksum)) => None,
            Err(err) => return Err(err),
        };

        let transaction = self.cache.transaction(&plan.assets);
        transaction.prepare(&self.runtime)?;

        let total = plan.assets.len();
        for (i, asset) in plan.assets.iter().enumerate() {
            self.fetch_asset(&transaction, asset, i + 1, total).await?;
        }

        let verifier = manifest
            .as_ref()
            .map(|asset| self.load_manifest(&transaction, asset))
            .transpose()?;

        let to_verify = if installation.verify_in_archive {
            index.binaries.clone()
        } else {
            index.artifacts()
        };
        self.verify_assets(&transaction, to_verify, verifier.as_ref())?;

        self.runtime.create_dir_all(&download.destination)?;

        let in_archive = if installation.verify_in_archive {
            verifier.as_ref()
        } else {
            None
        };
        let mut installed = Vec::new();
        for archive in &index.archives {
            installed.extend(self.extract_archive(&transaction, archive, download, in_archive)?);
        }
        installed.extend(self.relocate_binaries(&transaction, &index.binaries, download)?);

        transaction.clean(&self.runtime)?;
        info!("Installed {} file(s) into {:?}", installed.len(), download.destination);
        Ok(installed)
    }

    /// Plans and downloads in one go.
    pub async fn run(&self, download: &Download) -> Result<Vec<PathBuf>> {
        let plan = self.create_plan(&download.installation).await?;
        self.download(download, &plan).await
    }
}
