use anyhow::{Result, anyhow};
use log::debug;

use super::Pipeline;
use crate::asset::Asset;
use crate::cache::Transaction;
use crate::error::{InstallError, UnexpectedExt};
use crate::http::HttpStatusError;
use crate::runtime::Runtime;
use crate::ui::ProgressWriter;

impl<R: Runtime> Pipeline<R> {
    /// Downloads `asset` into the cache unless a size-matching copy is
    /// already there. A transfer that ends short of (or past) the reported
    /// size fails; the file stays for the next run's stale-entry check.
    pub(super) async fn fetch_asset(
        &self,
        transaction: &Transaction,
        asset: &Asset,
        n: usize,
        total: usize,
    ) -> Result<()> {
        if transaction.is_cached(&self.runtime, asset)? {
            debug!("Skipping download of {}: cached", asset.name);
            return Ok(());
        }

        let path = transaction.path_for(asset);
        let progress = self
            .ui
            .progress(asset.size, &format!("📥 {}/{} {}", n, total, asset.name));

        let result = async {
            let file = self
                .runtime
                .create_file(&path)
                .unexpected(|| format!("Failed to create {:?}", path))?;
            let mut writer = ProgressWriter::new(file, progress.as_ref());
            self.http.download(&asset.url, &mut writer).await
        }
        .await;

        match result {
            Ok(bytes) if bytes != asset.size => {
                progress.fail();
                Err(InstallError::unexpected(
                    format!("Failed to download {}", asset.name),
                    anyhow!("received {} bytes, expected {}", bytes, asset.size),
                )
                .into())
            }
            Ok(bytes) => {
                progress.finish();
                debug!("Downloaded {} ({} bytes) to {:?}", asset.name, bytes, path);
                Ok(())
            }
            Err(err) => {
                progress.fail();
                if let Some(status) = err.downcast_ref::<HttpStatusError>() {
                    return Err(InstallError::NoAssetFound(format!(
                        "{}: HTTP {}",
                        asset.name,
                        status.status()
                    ))
                    .into());
                }
                Err(
                    InstallError::unexpected(format!("Failed to download {}", asset.name), err)
                        .into(),
                )
            }
        }
    }
}
