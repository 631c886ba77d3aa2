//! Download cache: `<root>/<transaction>/<asset-id>`.
//!
//! A transaction is identified by a CRC32 over the full asset list of a plan,
//! so two runs share cache entries only when they resolved the exact same
//! asset set.

use anyhow::Result;
use flate2::Crc;
use log::debug;
use std::path::{Path, PathBuf};

use crate::asset::Asset;
use crate::error::UnexpectedExt;
use crate::runtime::Runtime;

/// Fingerprint of an asset list. Stable as long as the assets' field values
/// and their order are.
pub fn transaction_id(assets: &[Asset]) -> String {
    let mut crc = Crc::new();
    for asset in assets {
        crc.update(format!("{:?}", asset).as_bytes());
    }
    crc.sum().to_string()
}

#[derive(Debug, Clone)]
pub struct DownloadCache {
    root: PathBuf,
}

impl DownloadCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The cache subtree for one plan's asset set.
    pub fn transaction(&self, assets: &[Asset]) -> Transaction {
        Transaction {
            dir: self.root.join(transaction_id(assets)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    dir: PathBuf,
}

impl Transaction {
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, asset: &Asset) -> PathBuf {
        self.dir.join(asset.id.to_string())
    }

    pub fn prepare<R: Runtime + ?Sized>(&self, runtime: &R) -> Result<()> {
        Ok(runtime
            .create_dir_all(&self.dir)
            .unexpected(|| format!("Failed to create cache directory {:?}", self.dir))?)
    }

    /// A cached file is a hit iff its size equals the asset's reported size.
    /// A file of any other size is deleted so it gets downloaded again.
    pub fn is_cached<R: Runtime + ?Sized>(&self, runtime: &R, asset: &Asset) -> Result<bool> {
        let path = self.path_for(asset);
        if !runtime.exists(&path) {
            return Ok(false);
        }
        let size = runtime
            .file_size(&path)
            .unexpected(|| format!("Failed to stat cache entry {:?}", path))?;
        if size == asset.size {
            debug!("Cache hit for {} at {:?}", asset.name, path);
            return Ok(true);
        }
        debug!(
            "Stale cache entry for {}: {} bytes, expected {}",
            asset.name, size, asset.size
        );
        runtime
            .remove_file(&path)
            .unexpected(|| format!("Failed to remove stale cache entry {:?}", path))?;
        Ok(false)
    }

    /// Removes the whole transaction subtree.
    pub fn clean<R: Runtime + ?Sized>(&self, runtime: &R) -> Result<()> {
        if !runtime.exists(&self.dir) {
            return Ok(());
        }
        debug!("Cleaning cache {:?}", self.dir);
        Ok(runtime
            .remove_dir_all(&self.dir)
            .unexpected(|| format!("Failed to clean cache {:?}", self.dir))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::test_asset;
    use crate::runtime::MockRuntime;
    use mockall::predicate::eq;

    #[test]
    fn test_transaction_id_is_deterministic() {
        let assets = vec![test_asset(1, "a", 10), test_asset(2, "checksums.txt", 5)];
        assert_eq!(transaction_id(&assets), transaction_id(&assets.clone()));
    }

    #[test]
    fn test_transaction_id_differs_by_asset_set() {
        let a = vec![test_asset(1, "a", 10)];
        let b = vec![test_asset(1, "a", 11)];
        let c = vec![test_asset(1, "a", 10), test_asset(2, "b", 10)];
        assert_ne!(transaction_id(&a), transaction_id(&b));
        assert_ne!(transaction_id(&a), transaction_id(&c));
    }

    #[test]
    fn test_path_layout() {
        let cache = DownloadCache::new("/cache/ghet");
        let asset = test_asset(42, "a", 10);
        let tx = cache.transaction(std::slice::from_ref(&asset));

        let expected = Path::new("/cache/ghet")
            .join(transaction_id(std::slice::from_ref(&asset)))
            .join("42");
        assert_eq!(tx.path_for(&asset), expected);
    }

    #[test]
    fn test_is_cached_hit() {
        // --- Setup ---
        let cache = DownloadCache::new("/cache");
        let asset = test_asset(7, "tool", 100);
        let tx = cache.transaction(std::slice::from_ref(&asset));
        let path = tx.path_for(&asset);

        let mut runtime = MockRuntime::new();
        runtime
            .expect_exists()
            .with(eq(path.clone()))
            .returning(|_| true);
        runtime
            .expect_file_size()
            .with(eq(path))
            .returning(|_| Ok(100));
        runtime.expect_remove_file().never();

        // --- Execute & Verify ---
        assert!(tx.is_cached(&runtime, &asset).unwrap());
    }

    #[test]
    fn test_is_cached_size_mismatch_removes_stale_file() {
        // --- Setup ---
        let cache = DownloadCache::new("/cache");
        let asset = test_asset(7, "tool", 100);
        let tx = cache.transaction(std::slice::from_ref(&asset));
        let path = tx.path_for(&asset);

        let mut runtime = MockRuntime::new();
        runtime.expect_exists().returning(|_| true);
        runtime.expect_file_size().returning(|_| Ok(42));
        runtime
            .expect_remove_file()
            .with(eq(path))
            .times(1)
            .returning(|_| Ok(()));

        // --- Execute & Verify ---
        assert!(!tx.is_cached(&runtime, &asset).unwrap());
    }

    #[test]
    fn test_is_cached_missing() {
        let tx = DownloadCache::new("/cache").transaction(&[]);
        let mut runtime = MockRuntime::new();
        runtime.expect_exists().returning(|_| false);

        assert!(!tx.is_cached(&runtime, &test_asset(1, "a", 1)).unwrap());
    }

    #[test]
    fn test_clean_removes_transaction_dir() {
        // --- Setup ---
        let tx = DownloadCache::new("/cache").transaction(&[test_asset(1, "a", 1)]);
        let dir = tx.dir().to_path_buf();

        let mut runtime = MockRuntime::new();
        runtime.expect_exists().returning(|_| true);
        runtime
            .expect_remove_dir_all()
            .with(eq(dir))
            .times(1)
            .returning(|_| Ok(()));

        // --- Execute & Verify ---
        tx.clean(&runtime).unwrap();
    }

    #[test]
    fn test_clean_failure_is_unexpected() {
        use crate::error::{InstallError, install_error};

        // --- Setup ---
        let tx = DownloadCache::new("/cache").transaction(&[test_asset(1, "a", 1)]);
        let mut runtime = MockRuntime::new();
        runtime.expect_exists().returning(|_| true);
        runtime
            .expect_remove_dir_all()
            .returning(|_| Err(anyhow::anyhow!("permission denied")));

        // --- Execute ---
        let err = tx.clean(&runtime).unwrap_err();

        // --- Verify ---
        match install_error(&err) {
            Some(InstallError::Unexpected { message, source }) => {
                assert!(message.starts_with("Failed to clean cache"));
                assert_eq!(source.to_string(), "permission denied");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_real_cache_round_trip() {
        use crate::runtime::RealRuntime;
        use std::io::Write;

        let root = tempfile::tempdir().unwrap();
        let cache = DownloadCache::new(root.path());
        let asset = test_asset(3, "tool", 4);
        let tx = cache.transaction(std::slice::from_ref(&asset));

        tx.prepare(&RealRuntime).unwrap();
        assert!(!tx.is_cached(&RealRuntime, &asset).unwrap());

        let mut file = RealRuntime.create_file(&tx.path_for(&asset)).unwrap();
        file.write_all(b"1234").unwrap();
        drop(file);
        assert!(tx.is_cached(&RealRuntime, &asset).unwrap());

        tx.clean(&RealRuntime).unwrap();
        assert!(!tx.dir().exists());
    }
}
