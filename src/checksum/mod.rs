//! Checksum manifests: parsing both line dialects and verifying artifacts
//! against them, either as whole files or while streaming archive members.

mod algorithm;
mod parser;
mod verifier;

pub use algorithm::{ChecksumAlgorithm, Hasher};
pub use parser::{ChecksumEntry, WILDCARD, parse_line, parse_manifest};
pub use verifier::{ChecksumVerifier, DigestTee, check_digest};
