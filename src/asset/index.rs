use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::matcher::{BoxMatcher, any, ends_with, regex};

/// One file attached to a remote release.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Asset {
    pub id: u64,
    pub name: String,
    pub content_type: String,
    pub size: u64,
    pub url: String,
}

/// A release's assets partitioned into archives, checksum manifests and
/// loose binaries. Each asset lands in exactly one bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexedAssets {
    pub archives: Vec<Asset>,
    pub checksums: Vec<Asset>,
    pub binaries: Vec<Asset>,
}

impl IndexedAssets {
    /// Archives followed by binaries: everything a manifest has to vouch for.
    pub fn artifacts(&self) -> Vec<Asset> {
        self.archives
            .iter()
            .chain(self.binaries.iter())
            .cloned()
            .collect()
    }
}

static IS_ARCHIVE: Lazy<BoxMatcher> = Lazy::new(|| {
    any([
        ".tar", ".tar.gz", ".tgz", ".tar.bz2", ".tbz2", ".tbz", ".tar.xz", ".txz", ".zip", ".gz",
        ".bz2", ".xz", ".lz", ".lz4", ".7z", ".rar",
    ]
    .iter()
    .map(|suffix| ends_with(suffix))
    .collect())
});

static IS_CHECKSUM: Lazy<BoxMatcher> = Lazy::new(|| {
    any(vec![
        ends_with(".sha256"),
        ends_with(".sha256sum"),
        ends_with(".sha512"),
        ends_with(".sha512sum"),
        ends_with(".md5"),
        ends_with("sha256sums"),
        ends_with("sha512sums"),
        regex(&[r"(?:checksums?|sha256sums?|sha512sums?)\.(?:txt|out)$"]),
    ])
});

pub fn is_archive(name: &str) -> bool {
    IS_ARCHIVE.matches(&name.to_lowercase())
}

pub fn is_checksum(name: &str) -> bool {
    IS_CHECKSUM.matches(&name.to_lowercase())
}

/// Classifies assets: the archive test wins over the checksum test, and
/// anything else is a candidate binary.
pub fn create_index(assets: &[Asset]) -> IndexedAssets {
    let mut index = IndexedAssets::default();
    for asset in assets {
        if is_archive(&asset.name) {
            index.archives.push(asset.clone());
        } else if is_checksum(&asset.name) {
            index.checksums.push(asset.clone());
        } else {
            index.binaries.push(asset.clone());
        }
    }
    index
}

#[cfg(test)]
pub(crate) fn test_asset(id: u64, name: &str, size: u64) -> Asset {
    Asset {
        id,
        name: name.to_string(),
        content_type: "application/octet-stream".to_string(),
        size,
        url: format!("https://example.com/{}", name),
    }
}
