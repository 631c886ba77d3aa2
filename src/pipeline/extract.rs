use anyhow::{Context, Result};
use log::{debug, warn};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::Pipeline;
use crate::archive::{self, Archive, ArchiveEntry, ArchiveKind, find_candidates};
use crate::asset::Asset;
use crate::cache::Transaction;
use crate::checksum::{ChecksumEntry, ChecksumVerifier, DigestTee};
use crate::error::{InstallError, UnexpectedExt, install_error};
use crate::install::Download;
use crate::runtime::Runtime;
use crate::ui::{Progress, ProgressWriter};

impl<R: Runtime> Pipeline<R> {
    /// Extracts the target binary (or binaries) from a cached archive into
    /// the destination. With `verifier`, every extracted member must carry
    /// a matching manifest entry and is digested while it is written.
    pub(super) fn extract_archive(
        &self,
        transaction: &Transaction,
        asset: &Asset,
        download: &Download,
        verifier: Option<&ChecksumVerifier>,
    ) -> Result<Vec<PathBuf>> {
        self.ui
            .println(&format!("📦 Extracting archive: {}", asset.name));

        let kind = ArchiveKind::from_name(&asset.name)?;
        let mut archive = archive::open(&self.runtime, &transaction.path_for(asset), kind)
            .with_context(|| format!("Failed to open archive {}", asset.name))?;

        let chosen = self.choose_members(archive.as_ref(), asset, download)?;
        let installation = &download.installation;

        let mut installed = Vec::new();
        for entry in chosen {
            let name = if installation.multiple_binaries {
                entry.file_name().to_string()
            } else {
                installation.target.file_name.to_string()
            };
            let dest = download.destination.join(name);
            self.extract_member(archive.as_mut(), &entry, &dest, verifier)?;
            installed.push(dest);
        }
        Ok(installed)
    }

    fn choose_members(
        &self,
        archive: &dyn Archive,
        asset: &Asset,
        download: &Download,
    ) -> Result<Vec<ArchiveEntry>> {
        let basename = download.installation.target.basename();
        let candidates: Vec<ArchiveEntry> = find_candidates(archive.entries(), basename)
            .into_iter()
            .cloned()
            .collect();
        debug!(
            "{} candidate binaries in {}: {:?}",
            candidates.len(),
            asset.name,
            candidates.iter().map(|e| &e.path).collect::<Vec<_>>()
        );

        if candidates.is_empty() {
            return Err(InstallError::NoBinaryInArchive {
                archive: asset.name.clone(),
                basename: basename.to_string(),
            }
            .into());
        }
        if candidates.len() == 1 || download.installation.multiple_binaries {
            return Ok(candidates);
        }

        let paths: Vec<String> = candidates.iter().map(|e| e.path.clone()).collect();
        let prompt = format!("Multiple binaries found in {}, pick one:", asset.name);
        match self.ui.choose(&prompt, &paths) {
            Ok(idx) => Ok(vec![candidates[idx].clone()]),
            Err(err) if matches!(install_error(&err), Some(InstallError::NotInteractive)) => {
                Err(InstallError::TooManyBinaries {
                    archive: asset.name.clone(),
                    candidates: paths,
                }
                .into())
            }
            Err(err) => Err(err),
        }
    }

    fn extract_member(
        &self,
        archive: &mut dyn Archive,
        entry: &ArchiveEntry,
        dest: &Path,
        verifier: Option<&ChecksumVerifier>,
    ) -> Result<()> {
        let checksum = match verifier {
            Some(verifier) => Some(verifier.entry_for_member(&entry.path).cloned().ok_or_else(
                || InstallError::NotVerifiedAssets {
                    assets: vec![entry.path.clone()],
                },
            )?),
            None => None,
        };

        let progress = self.ui.progress(entry.size, &format!("📦 {}", entry.path));
        let result = self.write_member(archive, entry, dest, checksum, progress.as_ref());
        if let Err(err) = result {
            progress.fail();
            if self.runtime.exists(dest) {
                if let Err(cleanup) = self.runtime.remove_file(dest) {
                    warn!("Failed to remove partial file {:?}: {}", dest, cleanup);
                }
            }
            return Err(err);
        }
        progress.finish();

        // Candidates always carry an execute bit.
        self.runtime
            .set_permissions(dest, entry.mode & 0o7777)
            .unexpected(|| format!("Failed to set permissions of {:?}", dest))?;
        if let Some(mtime) = entry.modified {
            self.runtime
                .set_modified(dest, mtime)
                .unexpected(|| format!("Failed to set modification time of {:?}", dest))?;
        }
        debug!("Extracted {} to {:?}", entry.path, dest);
        Ok(())
    }

    fn write_member(
        &self,
        archive: &mut dyn Archive,
        entry: &ArchiveEntry,
        dest: &Path,
        checksum: Option<ChecksumEntry>,
        progress: &dyn Progress,
    ) -> Result<()> {
        let file = self
            .runtime
            .create_file(dest)
            .unexpected(|| format!("Failed to create {:?}", dest))?;
        let writer = ProgressWriter::new(file, progress);

        match checksum {
            Some(checksum) => {
                let mut tee = DigestTee::new(writer, checksum);
                archive.read_member(&entry.path, &mut tee)?;
                tee.finish(&entry.path)?;
            }
            None => {
                let mut writer = writer;
                archive.read_member(&entry.path, &mut writer)?;
                writer
                    .flush()
                    .unexpected(|| format!("Failed to flush {:?}", dest))?;
            }
        }
        Ok(())
    }
}
