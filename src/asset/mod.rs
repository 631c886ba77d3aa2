//! Release assets: the value type, classification into archives, checksum
//! manifests and binaries, and matching against an installation target.

mod file_name;
mod index;
mod target;

pub use file_name::FileName;
pub use index::{Asset, IndexedAssets, create_index, is_archive, is_checksum};
pub use target::{Target, default_checksums};

#[cfg(test)]
pub(crate) use index::test_asset;
