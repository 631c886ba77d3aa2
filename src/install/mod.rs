//! What to install and where: the read-only configuration value the pipeline
//! consumes.

mod spec;

use std::path::PathBuf;

use crate::asset::{FileName, Target};
use crate::platform::Platform;
use crate::source::Release;

pub use spec::InstallSpec;

/// Options that come from flags rather than from the spec string.
#[derive(Debug, Clone)]
pub struct InstallOptions {
    pub platform: Platform,
    /// Release host, e.g. the API URL of the source.
    pub site: String,
    pub multiple_binaries: bool,
    pub verify_in_archive: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Installation {
    pub release: Release,
    pub target: Target,
    pub site: String,
    pub multiple_binaries: bool,
    pub verify_in_archive: bool,
}

impl Installation {
    /// Applies defaults: the binary is named after the repository, and on
    /// Windows an extension-less binary gets `exe`.
    pub fn new(spec: InstallSpec, options: InstallOptions) -> Self {
        let binary = spec
            .binary
            .unwrap_or_else(|| spec.release.repository.repo.clone());
        let mut file_name = match binary.split_once('.') {
            Some((base, ext)) => FileName::new(base, ext),
            None => FileName::new(binary, ""),
        };
        if file_name.extension.is_empty() && options.platform.os.is_windows() {
            file_name.extension = "exe".to_string();
        }

        let mut target = Target::new(file_name, options.platform);
        target.archive = spec.archive;

        Self {
            release: spec.release,
            target,
            site: options.site,
            multiple_binaries: options.multiple_binaries,
            verify_in_archive: options.verify_in_archive,
        }
    }
}

/// An installation bound to a destination directory.
#[derive(Debug, Clone)]
pub struct Download {
    pub installation: Installation,
    pub destination: PathBuf,
}
