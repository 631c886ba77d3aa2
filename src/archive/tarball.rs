use anyhow::{Context, Result, anyhow};
use log::debug;
use std::io::{self, BufReader, Read, Write};
use std::path::{Path, PathBuf};

use super::{Archive, ArchiveEntry, ArchiveKind, normalize_member_path};
use crate::runtime::Runtime;

/// Tar archives, plain or compressed. Tar streams are not seekable, so the
/// file is listed once up front and re-read from the start for each member.
pub struct TarMembers<'a> {
    runtime: &'a dyn Runtime,
    path: PathBuf,
    kind: ArchiveKind,
    entries: Vec<ArchiveEntry>,
}

impl<'a> TarMembers<'a> {
    pub fn open(runtime: &'a dyn Runtime, path: &Path, kind: ArchiveKind) -> Result<Self> {
        let mut members = Self {
            runtime,
            path: path.to_path_buf(),
            kind,
            entries: Vec::new(),
        };
        members.entries = members.list()?;
        debug!(
            "Listed {} entries of {} archive {:?}",
            members.entries.len(),
            kind,
            path
        );
        Ok(members)
    }

    fn stream(&self) -> Result<tar::Archive<Box<dyn Read + Send + 'a>>> {
        let file = self
            .runtime
            .open(&self.path)
            .with_context(|| format!("Failed to open archive at {:?}", self.path))?;
        let reader = BufReader::new(file);
        let decoder: Box<dyn Read + Send + 'a> = match self.kind {
            ArchiveKind::TarGz => Box::new(flate2::read::GzDecoder::new(reader)),
            ArchiveKind::TarBz2 => Box::new(bzip2::read::BzDecoder::new(reader)),
            ArchiveKind::TarXz => Box::new(xz2::read::XzDecoder::new(reader)),
            ArchiveKind::Tar => Box::new(reader),
            ArchiveKind::Zip => return Err(anyhow!("{:?} is not a tar archive", self.path)),
        };
        Ok(tar::Archive::new(decoder))
    }

    fn list(&self) -> Result<Vec<ArchiveEntry>> {
        let mut archive = self.stream()?;
        let mut entries = Vec::new();
        for entry in archive.entries().context("Failed to read tar archive")? {
            let entry = entry.context("Failed to read tar entry")?;
            let header = entry.header();
            let kind = header.entry_type();
            if !kind.is_file() && !kind.is_dir() {
                continue;
            }
            let path = normalize_member_path(&entry.path()?.to_string_lossy());
            if path.is_empty() || path == "." {
                continue;
            }
            entries.push(ArchiveEntry {
                path,
                mode: header.mode().unwrap_or(0o644),
                size: header.size().unwrap_or(0),
                modified: header.mtime().ok(),
                is_dir: kind.is_dir(),
            });
        }
        Ok(entries)
    }
}

impl Archive for TarMembers<'_> {
    fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    fn read_member(&mut self, path: &str, out: &mut dyn Write) -> Result<u64> {
        let mut archive = self.stream()?;
        for entry in archive.entries().context("Failed to read tar archive")? {
            let mut entry = entry.context("Failed to read tar entry")?;
            if normalize_member_path(&entry.path()?.to_string_lossy()) == path {
                return io::copy(&mut entry, out)
                    .with_context(|| format!("Failed to extract {}", path));
            }
        }
        Err(anyhow!("{} not found in archive {:?}", path, self.path))
    }
}
