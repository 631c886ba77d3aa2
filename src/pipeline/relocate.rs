use anyhow::Result;
use log::debug;
use std::path::PathBuf;

use super::Pipeline;
use crate::asset::Asset;
use crate::cache::Transaction;
use crate::error::UnexpectedExt;
use crate::install::Download;
use crate::runtime::{Runtime, move_file};

const EXECUTABLE_MODE: u32 = 0o750;

impl<R: Runtime> Pipeline<R> {
    /// Moves verified loose binaries from the cache into the destination.
    /// A lone binary takes the target's file name; several keep their
    /// asset names.
    pub(super) fn relocate_binaries(
        &self,
        transaction: &Transaction,
        binaries: &[Asset],
        download: &Download,
    ) -> Result<Vec<PathBuf>> {
        let installation = &download.installation;
        let keep_names = installation.multiple_binaries || binaries.len() > 1;

        let mut installed = Vec::with_capacity(binaries.len());
        for asset in binaries {
            let name = if keep_names {
                asset.name.clone()
            } else {
                installation.target.file_name.to_string()
            };
            let dest = download.destination.join(name);
            move_file(&self.runtime, &transaction.path_for(asset), &dest)
                .unexpected(|| format!("Failed to move {} to {:?}", asset.name, dest))?;

            if asset.content_type.contains("octet-stream") {
                self.runtime
                    .set_permissions(&dest, EXECUTABLE_MODE)
                    .unexpected(|| format!("Failed to make {:?} executable", dest))?;
            }
            debug!("Installed {} as {:?}", asset.name, dest);
            installed.push(dest);
        }
        Ok(installed)
    }
}
