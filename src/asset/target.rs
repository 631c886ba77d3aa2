use log::debug;

use super::FileName;
use crate::platform::{Platform, no_arch_matches, no_os_matches};

/// Manifest names looked for when the installation does not name one.
pub fn default_checksums() -> Vec<FileName> {
    vec![
        FileName::new("checksums", ".txt"),
        FileName::new("checksums", ".out"),
        FileName::new("sha256sum", ".txt"),
        FileName::new("sha256sum", ".out"),
        FileName::new("sha512sum", ".txt"),
        FileName::new("sha512sum", ".out"),
        FileName::new("", ".sha256"),
        FileName::new("", ".sha256sum"),
        FileName::new("", ".sha512"),
        FileName::new("", ".sha512sum"),
    ]
}

const SIGNATURE_SUFFIXES: [&str; 3] = [".sig", ".asc", ".pem"];

/// The artifact an installation is after: its final file name, the platform
/// it must run on, and how its checksum manifest and archive are named.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub file_name: FileName,
    pub platform: Platform,
    pub checksums: Vec<FileName>,
    /// Pins the archive asset by exact name (case-insensitive).
    pub archive: Option<String>,
}

impl Target {
    pub fn new(file_name: FileName, platform: Platform) -> Self {
        Self {
            file_name,
            platform,
            checksums: default_checksums(),
            archive: None,
        }
    }

    pub fn basename(&self) -> &str {
        &self.file_name.base_name
    }

    /// Whether a release asset named `name` belongs to this target, either as
    /// its checksum manifest or as an archive/binary for the platform.
    pub fn matches(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        if SIGNATURE_SUFFIXES.iter().any(|s| name.ends_with(s)) {
            return false;
        }
        if self.matches_checksum(&name) {
            return true;
        }
        if let Some(archive) = &self.archive {
            return name == archive.to_lowercase();
        }
        self.matches_artifact(&name)
    }

    fn matches_artifact(&self, name: &str) -> bool {
        let basename = self.basename().to_lowercase();
        if !name.starts_with(&basename) && !name.ends_with(&basename) {
            return false;
        }
        let coords = name.strip_prefix(basename.as_str()).unwrap_or(name);
        let coords = coords
            .strip_suffix(basename.as_str())
            .unwrap_or(coords)
            .trim_matches(|c| c == '-' || c == '_');

        if self.platform.matches(coords) {
            return true;
        }
        if no_arch_matches(coords) && no_os_matches(coords) {
            debug!(
                "Accepting {:?}: carries no architecture or OS token",
                name
            );
            return true;
        }
        false
    }

    fn matches_checksum(&self, name: &str) -> bool {
        let basename = self.basename().to_lowercase();
        self.checksums.iter().any(|checksum| {
            let checksum = checksum.to_string().to_lowercase();
            if name == checksum {
                return true;
            }
            name.starts_with(&basename)
                && name.ends_with(&checksum)
                && (self.platform.matches(name) || (no_arch_matches(name) && no_os_matches(name)))
        })
    }
}
