use anyhow::{Context, Result};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::BufRead;

use super::algorithm::ChecksumAlgorithm;
use crate::error::InstallError;

/// Filename of an entry that applies to any remaining asset.
pub const WILDCARD: &str = "-";

static BSD_STYLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(SHA[0-9]{1,3})\s+\(([^)]+)\)\s+=\s+([a-fA-F0-9]{32,128})$")
        .unwrap_or_else(|e| panic!("invalid BSD checksum regex: {e}"))
});

/// One parsed manifest line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecksumEntry {
    pub algorithm: ChecksumAlgorithm,
    pub hash: String,
    pub filename: String,
}

impl ChecksumEntry {
    pub fn is_wildcard(&self) -> bool {
        self.filename == WILDCARD
    }

    /// Whether this entry vouches for a release asset called `name`.
    pub fn matches(&self, name: &str) -> bool {
        self.is_wildcard() || self.filename == name
    }

    /// Whether this entry vouches for an archive member at `path`. Either
    /// side may carry leading directories the other lacks; the shorter one
    /// must match on whole path components.
    pub fn matches_member(&self, path: &str) -> bool {
        if self.is_wildcard() || self.filename == path {
            return true;
        }
        let filename = self.filename.trim_start_matches("./");
        let path = path.trim_start_matches("./");
        filename == path
            || path.ends_with(&format!("/{}", filename))
            || filename.ends_with(&format!("/{}", path))
    }
}

/// Parses a single manifest line. Blank lines yield `None`.
pub fn parse_line(line: &str) -> Result<Option<ChecksumEntry>, InstallError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    if let Some(caps) = BSD_STYLE.captures(line) {
        return Ok(Some(ChecksumEntry {
            algorithm: ChecksumAlgorithm::from_name(&caps[1])?,
            filename: caps[2].to_string(),
            hash: caps[3].to_string(),
        }));
    }
    parse_regular(line).map(Some)
}

fn parse_regular(line: &str) -> Result<ChecksumEntry, InstallError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let (hash, filename) = match fields.as_slice() {
        [hash] => (*hash, WILDCARD),
        // `*` marks binary mode in sha256sum output
        [hash, filename] => (*hash, filename.strip_prefix('*').unwrap_or(filename)),
        _ => {
            return Err(InstallError::InvalidChecksumLine {
                line: line.to_string(),
            });
        }
    };
    if !hash.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(InstallError::InvalidChecksumLine {
            line: line.to_string(),
        });
    }
    Ok(ChecksumEntry {
        algorithm: ChecksumAlgorithm::for_hash(hash)?,
        hash: hash.to_string(),
        filename: filename.to_string(),
    })
}

/// Parses a whole manifest. The first bad line aborts parsing.
pub fn parse_manifest<R: BufRead>(reader: R) -> Result<Vec<ChecksumEntry>> {
    let mut entries = Vec::new();
    for line in reader.lines() {
        let line = line.context("Failed to read checksum manifest")?;
        if let Some(entry) = parse_line(&line)? {
            entries.push(entry);
        }
    }
    debug!("Parsed {} checksum entries", entries.len());
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::install_error;
    use std::io::Cursor;

    const SHA256_HEX: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";

    #[test]
    fn test_parse_bsd_line() {
        let line = format!("SHA256 (foo.tar.gz) = {}", SHA256_HEX);
        let entry = parse_line(&line).unwrap().unwrap();
        assert_eq!(
            entry,
            ChecksumEntry {
                algorithm: ChecksumAlgorithm::Sha256,
                hash: SHA256_HEX.to_string(),
                filename: "foo.tar.gz".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_bsd_line_unknown_algorithm() {
        let line = format!("SHA3 (foo.tar.gz) = {}", SHA256_HEX);
        let err = parse_line(&line).unwrap_err();
        assert!(matches!(err, InstallError::UnknownChecksumAlgorithm { .. }));
    }

    #[test]
    fn test_parse_regular_with_filename() {
        let line = format!("{}  kn-event-darwin-arm64", SHA256_HEX);
        let entry = parse_line(&line).unwrap().unwrap();
        assert_eq!(entry.algorithm, ChecksumAlgorithm::Sha256);
        assert_eq!(entry.filename, "kn-event-darwin-arm64");
        assert!(!entry.is_wildcard());
    }

    #[test]
    fn test_parse_regular_hash_only_is_wildcard() {
        let entry = parse_line(SHA256_HEX).unwrap().unwrap();
        assert!(entry.is_wildcard());
        assert!(entry.matches("anything"));
    }

    #[test]
    fn test_parse_regular_binary_mode_marker() {
        let line = format!("{} *tool.exe", SHA256_HEX);
        let entry = parse_line(&line).unwrap().unwrap();
        assert_eq!(entry.filename, "tool.exe");
    }

    #[test]
    fn test_parse_regular_sha1_and_sha512() {
        let sha1 = "a9993e364706816aba3e25717850c26c9cd0d89d";
        assert_eq!(
            parse_line(sha1).unwrap().unwrap().algorithm,
            ChecksumAlgorithm::Sha1
        );
        let sha512 = "f".repeat(128);
        assert_eq!(
            parse_line(&sha512).unwrap().unwrap().algorithm,
            ChecksumAlgorithm::Sha512
        );
    }

    #[test]
    fn test_parse_invalid_lines() {
        for line in [
            format!("{} a b", SHA256_HEX),
            "not-a-hash-at-all-but-exactly-sixty-four-characters-long-xxxxxxx file".to_string(),
        ] {
            let err = parse_line(&line).unwrap_err();
            assert!(
                matches!(err, InstallError::InvalidChecksumLine { .. }),
                "{}",
                line
            );
        }
    }

    #[test]
    fn test_parse_blank_line_is_skipped() {
        assert!(parse_line("").unwrap().is_none());
        assert!(parse_line("   \r").unwrap().is_none());
    }

    #[test]
    fn test_parse_manifest_mixed_dialects() {
        let manifest = format!(
            "{hex}  a.tar.gz\n\nSHA1 (b.zip) = a9993e364706816aba3e25717850c26c9cd0d89d\r\n",
            hex = SHA256_HEX
        );
        let entries = parse_manifest(Cursor::new(manifest)).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].filename, "a.tar.gz");
        assert_eq!(entries[1].algorithm, ChecksumAlgorithm::Sha1);
        assert_eq!(entries[1].filename, "b.zip");
    }

    #[test]
    fn test_parse_manifest_fails_fast() {
        let manifest = format!("{}  a\ngarbage line here\n{}  b\n", SHA256_HEX, SHA256_HEX);
        let err = parse_manifest(Cursor::new(manifest)).unwrap_err();
        assert!(matches!(
            install_error(&err),
            Some(InstallError::InvalidChecksumLine { .. })
        ));
    }

    #[test]
    fn test_matches_member() {
        let entry = ChecksumEntry {
            algorithm: ChecksumAlgorithm::Sha256,
            hash: SHA256_HEX.to_string(),
            filename: "tool".to_string(),
        };
        assert!(entry.matches_member("tool"));
        assert!(entry.matches_member("tool-1.0/bin/tool"));
        assert!(!entry.matches_member("tool-1.0/bin/mytool"));

        let nested = ChecksumEntry {
            filename: "./dist/bin/tool".to_string(),
            ..entry
        };
        assert!(nested.matches_member("bin/tool"));
        assert!(!nested.matches_member("ool"));
    }
}
