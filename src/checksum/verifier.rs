use anyhow::{Context, Result};
use log::debug;
use std::io::{self, BufReader, Read, Write};

use super::algorithm::Hasher;
use super::parser::{ChecksumEntry, parse_manifest};
use crate::asset::Asset;
use crate::error::InstallError;

/// Entries of one parsed manifest, checked against downloaded artifacts.
#[derive(Debug, Clone, Default)]
pub struct ChecksumVerifier {
    entries: Vec<ChecksumEntry>,
}

impl ChecksumVerifier {
    pub fn new(entries: Vec<ChecksumEntry>) -> Self {
        Self { entries }
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(Self::new(parse_manifest(BufReader::new(reader))?))
    }

    pub fn entries(&self) -> &[ChecksumEntry] {
        &self.entries
    }

    /// Walks the manifest in order. Each entry consumes the first remaining
    /// asset it matches, and `check` digests that asset. Manifest entries
    /// for assets outside the working set are skipped. Any asset left over
    /// at the end was not vouched for.
    pub fn verify<F>(&self, mut assets: Vec<Asset>, mut check: F) -> Result<()>
    where
        F: FnMut(&ChecksumEntry, &Asset) -> Result<()>,
    {
        for entry in &self.entries {
            let Some(idx) = assets.iter().position(|a| entry.matches(&a.name)) else {
                continue;
            };
            check(entry, &assets[idx])?;
            let verified = assets.remove(idx);
            debug!("Checksum of {} verified with {}", verified.name, entry.algorithm);
        }

        if !assets.is_empty() {
            return Err(InstallError::NotVerifiedAssets {
                assets: assets.into_iter().map(|a| a.name).collect(),
            }
            .into());
        }
        Ok(())
    }

    /// Finds the entry vouching for an archive member.
    pub fn entry_for_member(&self, path: &str) -> Option<&ChecksumEntry> {
        self.entries.iter().find(|e| e.matches_member(path))
    }
}

/// Streams `reader` through the entry's digest and compares the hex
/// (case-sensitively) with the manifest value.
pub fn check_digest<R: Read>(entry: &ChecksumEntry, name: &str, mut reader: R) -> Result<()> {
    let mut hasher = entry.algorithm.hasher();
    io::copy(&mut reader, &mut hasher).with_context(|| format!("Failed to read {}", name))?;
    compare(entry, name, hasher.finalize_hex())
}

fn compare(entry: &ChecksumEntry, name: &str, actual: String) -> Result<()> {
    if actual != entry.hash {
        return Err(InstallError::ChecksumMismatch {
            asset: name.to_string(),
            actual,
            expected: entry.hash.clone(),
        }
        .into());
    }
    Ok(())
}

/// Writer that digests everything passing through it on the way to `inner`.
pub struct DigestTee<W> {
    inner: W,
    hasher: Hasher,
    entry: ChecksumEntry,
}

impl<W: Write> DigestTee<W> {
    pub fn new(inner: W, entry: ChecksumEntry) -> Self {
        Self {
            inner,
            hasher: entry.algorithm.hasher(),
            entry,
        }
    }

    /// Compares the digest of all written bytes. The bytes have already
    /// reached `inner` regardless of the outcome.
    pub fn finish(mut self, name: &str) -> Result<W> {
        self.inner.flush()?;
        compare(&self.entry, name, self.hasher.finalize_hex())?;
        Ok(self.inner)
    }
}

impl<W: Write> Write for DigestTee<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.hasher.update(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
