//! Release archives opened as a browsable tree of members.
//!
//! The kind is inferred from the file name alone. Listing an archive yields
//! [`ArchiveEntry`] values; individual members are then streamed on demand
//! into any writer, so callers can stack progress reporting and digesting
//! on top of the copy.

mod tarball;
mod zip;

#[cfg(test)]
pub(crate) mod fixtures;

use anyhow::{Result, anyhow};
use std::fmt;
use std::io::Write;
use std::path::Path;

use crate::runtime::Runtime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    Zip,
    Tar,
    TarGz,
    TarBz2,
    TarXz,
}

impl ArchiveKind {
    /// Infers the kind from a file name suffix, case-insensitively.
    pub fn from_name(name: &str) -> Result<Self> {
        let lower = name.to_lowercase();
        let kind = if lower.ends_with(".zip") {
            ArchiveKind::Zip
        } else if lower.ends_with(".tar") {
            ArchiveKind::Tar
        } else if lower.ends_with(".tar.gz") || lower.ends_with(".tgz") {
            ArchiveKind::TarGz
        } else if lower.ends_with(".tar.bz2") || lower.ends_with(".tbz2") || lower.ends_with(".tbz")
        {
            ArchiveKind::TarBz2
        } else if lower.ends_with(".tar.xz") || lower.ends_with(".txz") {
            ArchiveKind::TarXz
        } else {
            return Err(anyhow!("Unsupported archive format: {}", name));
        };
        Ok(kind)
    }
}

impl fmt::Display for ArchiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ArchiveKind::Zip => "zip",
            ArchiveKind::Tar => "tar",
            ArchiveKind::TarGz => "tar.gz",
            ArchiveKind::TarBz2 => "tar.bz2",
            ArchiveKind::TarXz => "tar.xz",
        };
        f.write_str(s)
    }
}

/// One member of an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Archive-relative path with `/` separators and no leading `./`.
    pub path: String,
    pub mode: u32,
    pub size: u64,
    /// Seconds since the epoch, when the format records it.
    pub modified: Option<u64>,
    pub is_dir: bool,
}

impl ArchiveEntry {
    /// Last path component.
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    pub fn is_executable(&self) -> bool {
        !self.is_dir && self.mode & 0o111 != 0
    }
}

pub trait Archive {
    fn entries(&self) -> &[ArchiveEntry];

    /// Streams the member at `path` into `out`, returning the bytes copied.
    fn read_member(&mut self, path: &str, out: &mut dyn Write) -> Result<u64>;
}

/// Opens the archive at `path` and lists its members.
#[tracing::instrument(skip(runtime))]
pub fn open<'a>(
    runtime: &'a dyn Runtime,
    path: &Path,
    kind: ArchiveKind,
) -> Result<Box<dyn Archive + 'a>> {
    match kind {
        ArchiveKind::Zip => Ok(Box::new(zip::ZipMembers::open(runtime, path)?)),
        _ => Ok(Box::new(tarball::TarMembers::open(runtime, path, kind)?)),
    }
}

/// Members that look like the wanted binary: regular files with an execute
/// bit whose file name contains `basename` (case-sensitive).
pub fn find_candidates<'e>(entries: &'e [ArchiveEntry], basename: &str) -> Vec<&'e ArchiveEntry> {
    entries
        .iter()
        .filter(|e| e.is_executable() && e.file_name().contains(basename))
        .collect()
}

pub(crate) fn normalize_member_path(path: &str) -> String {
    let path = path.replace('\\', "/");
    path.trim_start_matches("./").trim_end_matches('/').to_string()
}
