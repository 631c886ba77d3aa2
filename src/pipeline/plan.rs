use crate::asset::{Asset, IndexedAssets};
use crate::source::Release;

/// The prioritized asset working set for one installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    /// Resolved release; never carries the latest sentinel.
    pub release: Release,
    pub assets: Vec<Asset>,
}

/// Orders classified assets for download. When a release offers both
/// archives and loose binaries the archives win and the binaries are
/// dropped. Checksum manifests always come last.
pub fn prioritize(index: IndexedAssets) -> Vec<Asset> {
    let IndexedAssets {
        archives,
        checksums,
        binaries,
    } = index;

    let mut assets = if !archives.is_empty() && !binaries.is_empty() {
        archives
    } else {
        binaries.into_iter().chain(archives).collect()
    };
    assets.extend(checksums);
    assets
}
