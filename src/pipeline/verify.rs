use anyhow::{Context, Result};
use log::debug;

use super::Pipeline;
use crate::asset::Asset;
use crate::cache::Transaction;
use crate::checksum::{ChecksumVerifier, check_digest};
use crate::error::{InstallError, UnexpectedExt, install_error};
use crate::runtime::Runtime;
use crate::ui::with_spinner;

impl<R: Runtime> Pipeline<R> {
    /// Picks the one manifest to verify with. Several manifests need the
    /// user to choose; without a terminal that is a `TooManyChecksums`
    /// failure.
    pub(super) fn select_checksum(&self, checksums: &[Asset]) -> Result<Asset> {
        match checksums {
            [] => Err(InstallError::NoChecksum.into()),
            [only] => Ok(only.clone()),
            many => {
                let names: Vec<String> = many.iter().map(|a| a.name.clone()).collect();
                match self.ui.choose("Multiple checksum files found, pick one:", &names) {
                    Ok(idx) => Ok(many[idx].clone()),
                    Err(err) if matches!(install_error(&err), Some(InstallError::NotInteractive)) => {
                        Err(InstallError::TooManyChecksums { count: many.len() }.into())
                    }
                    Err(err) => Err(err),
                }
            }
        }
    }

    pub(super) fn load_manifest(
        &self,
        transaction: &Transaction,
        manifest: &Asset,
    ) -> Result<ChecksumVerifier> {
        let reader = self
            .runtime
            .open(&transaction.path_for(manifest))
            .unexpected(|| format!("Failed to open checksum file {}", manifest.name))?;
        let verifier = ChecksumVerifier::from_reader(reader)
            .with_context(|| format!("Failed to parse checksum file {}", manifest.name))?;
        debug!(
            "Loaded {} checksum entries from {}",
            verifier.entries().len(),
            manifest.name
        );
        Ok(verifier)
    }

    /// Checks every artifact against the manifest. Without a manifest the
    /// stage is skipped with a warning.
    pub(super) fn verify_assets(
        &self,
        transaction: &Transaction,
        artifacts: Vec<Asset>,
        verifier: Option<&ChecksumVerifier>,
    ) -> Result<()> {
        let Some(verifier) = verifier else {
            self.ui
                .println("⚠️ No checksums found. Skipping verification");
            return Ok(());
        };
        if artifacts.is_empty() {
            return Ok(());
        }

        verifier.verify(artifacts, |entry, asset| {
            let label = format!("🔍 Verifying checksum for {}", asset.name);
            with_spinner(self.ui.as_ref(), &label, || {
                let reader = self
                    .runtime
                    .open(&transaction.path_for(asset))
                    .unexpected(|| format!("Failed to open {}", asset.name))?;
                check_digest(entry, &asset.name, reader)
            })
        })?;

        self.ui
            .println("✅ All checksums match the downloaded assets");
        Ok(())
    }
}
