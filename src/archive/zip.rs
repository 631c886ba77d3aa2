use anyhow::{Context, Result};
use log::debug;
use std::io::{Cursor, Read, Write};
use std::path::Path;
use zip::{DateTime, ZipArchive};

use super::{Archive, ArchiveEntry, normalize_member_path};
use crate::runtime::Runtime;

/// Zip archives without Unix mode bits (typically built on Windows) only
/// count `.exe` members as executable.
const EXE_MODE: u32 = 0o755;
const FILE_MODE: u32 = 0o644;
const DIR_MODE: u32 = 0o755;

pub struct ZipMembers {
    archive: ZipArchive<Cursor<Vec<u8>>>,
    entries: Vec<ArchiveEntry>,
}

impl ZipMembers {
    pub fn open(runtime: &dyn Runtime, path: &Path) -> Result<Self> {
        let mut file = runtime
            .open(path)
            .with_context(|| format!("Failed to open archive at {:?}", path))?;

        // zip needs Read + Seek, Runtime::open only gives Read
        let mut buffer = Vec::new();
        file.read_to_end(&mut buffer)
            .with_context(|| format!("Failed to read archive {:?}", path))?;
        let mut archive =
            ZipArchive::new(Cursor::new(buffer)).context("Failed to parse ZIP archive")?;

        let mut entries = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let entry = archive
                .by_index(i)
                .with_context(|| format!("Failed to read ZIP entry {}", i))?;
            if entry.enclosed_name().is_none() {
                debug!("Skipping entry with invalid path: {}", entry.name());
                continue;
            }
            let path = normalize_member_path(entry.name());
            let is_dir = entry.is_dir();
            let mode = entry
                .unix_mode()
                .unwrap_or_else(|| fallback_mode(&path, is_dir));
            entries.push(ArchiveEntry {
                path,
                mode,
                size: entry.size(),
                modified: entry.last_modified().and_then(|dt| unix_seconds(&dt)),
                is_dir,
            });
        }
        Ok(Self { archive, entries })
    }
}

fn fallback_mode(path: &str, is_dir: bool) -> u32 {
    if is_dir {
        DIR_MODE
    } else if path.to_lowercase().ends_with(".exe") {
        EXE_MODE
    } else {
        FILE_MODE
    }
}

/// Zip timestamps carry no zone; they are read as UTC.
fn unix_seconds(dt: &DateTime) -> Option<u64> {
    let (month, day) = (i64::from(dt.month()), i64::from(dt.day()));
    let year = i64::from(dt.year()) - i64::from(month <= 2);
    let era = year.div_euclid(400);
    let year_of_era = year - era * 400;
    let day_of_year = (153 * ((month + 9) % 12) + 2) / 5 + day - 1;
    let day_of_era = year_of_era * 365 + year_of_era / 4 - year_of_era / 100 + day_of_year;
    let days = era * 146_097 + day_of_era - 719_468;
    let seconds = days * 86_400
        + i64::from(dt.hour()) * 3_600
        + i64::from(dt.minute()) * 60
        + i64::from(dt.second());
    u64::try_from(seconds).ok()
}

impl Archive for ZipMembers {
    fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    fn read_member(&mut self, path: &str, out: &mut dyn Write) -> Result<u64> {
        let index = (0..self.archive.len())
            .find(|&i| {
                self.archive
                    .name_for_index(i)
                    .is_some_and(|name| normalize_member_path(name) == path)
            })
            .with_context(|| format!("{} not found in ZIP archive", path))?;
        let mut entry = self
            .archive
            .by_index(index)
            .with_context(|| format!("Failed to read ZIP entry {}", path))?;
        std::io::copy(&mut entry, out).with_context(|| format!("Failed to extract {}", path))
    }
}
