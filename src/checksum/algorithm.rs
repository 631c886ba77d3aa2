use sha2::digest::DynDigest;
use std::fmt;
use std::io::{self, Write};

use crate::error::InstallError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChecksumAlgorithm {
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
}

impl ChecksumAlgorithm {
    pub const ALL: [ChecksumAlgorithm; 5] = [
        ChecksumAlgorithm::Sha1,
        ChecksumAlgorithm::Sha224,
        ChecksumAlgorithm::Sha256,
        ChecksumAlgorithm::Sha384,
        ChecksumAlgorithm::Sha512,
    ];

    /// Manifest spelling, as used by the BSD dialect.
    pub fn name(&self) -> &'static str {
        match self {
            ChecksumAlgorithm::Sha1 => "SHA1",
            ChecksumAlgorithm::Sha224 => "SHA224",
            ChecksumAlgorithm::Sha256 => "SHA256",
            ChecksumAlgorithm::Sha384 => "SHA384",
            ChecksumAlgorithm::Sha512 => "SHA512",
        }
    }

    /// Digest length in bytes. SHA1 is fixed, the SHA-2 family is `bits / 8`.
    pub fn bytes_len(&self) -> usize {
        match self {
            ChecksumAlgorithm::Sha1 => 20,
            ChecksumAlgorithm::Sha224 => 224 / 8,
            ChecksumAlgorithm::Sha256 => 256 / 8,
            ChecksumAlgorithm::Sha384 => 384 / 8,
            ChecksumAlgorithm::Sha512 => 512 / 8,
        }
    }

    pub fn from_name(name: &str) -> Result<Self, InstallError> {
        Self::ALL
            .into_iter()
            .find(|alg| alg.name() == name)
            .ok_or_else(|| InstallError::UnknownChecksumAlgorithm {
                hash: name.to_string(),
            })
    }

    /// Infers the algorithm from the hex digest length (two characters per byte).
    pub fn for_hash(hash: &str) -> Result<Self, InstallError> {
        Self::ALL
            .into_iter()
            .find(|alg| alg.bytes_len() * 2 == hash.len())
            .ok_or_else(|| InstallError::UnknownChecksumAlgorithm {
                hash: hash.to_string(),
            })
    }

    pub fn hasher(&self) -> Hasher {
        let digest: Box<dyn DynDigest + Send> = match self {
            ChecksumAlgorithm::Sha1 => Box::new(sha1::Sha1::default()),
            ChecksumAlgorithm::Sha224 => Box::new(sha2::Sha224::default()),
            ChecksumAlgorithm::Sha256 => Box::new(sha2::Sha256::default()),
            ChecksumAlgorithm::Sha384 => Box::new(sha2::Sha384::default()),
            ChecksumAlgorithm::Sha512 => Box::new(sha2::Sha512::default()),
        };
        Hasher { digest }
    }
}

impl fmt::Display for ChecksumAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Running digest usable as an `io::Write` sink.
pub struct Hasher {
    digest: Box<dyn DynDigest + Send>,
}

impl Hasher {
    pub fn update(&mut self, data: &[u8]) {
        self.digest.update(data);
    }

    /// Lower-case hex of the digest.
    pub fn finalize_hex(self) -> String {
        hex::encode(self.digest.finalize())
    }
}

impl Write for Hasher {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.digest.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_for_hash_is_injective_over_supported_lengths() {
        let mut seen = HashSet::new();
        for len in [40, 56, 64, 96, 128] {
            let alg = ChecksumAlgorithm::for_hash(&"a".repeat(len)).unwrap();
            assert_eq!(alg.bytes_len() * 2, len);
            assert!(seen.insert(alg), "{} mapped twice", alg);
        }
        assert_eq!(seen.len(), ChecksumAlgorithm::ALL.len());
    }

    #[test]
    fn test_for_hash_unknown_length() {
        // MD5 length is not a supported algorithm
        let err = ChecksumAlgorithm::for_hash(&"0".repeat(32)).unwrap_err();
        assert!(matches!(err, InstallError::UnknownChecksumAlgorithm { .. }));
    }

    #[test]
    fn test_from_name() {
        assert_eq!(
            ChecksumAlgorithm::from_name("SHA384").unwrap(),
            ChecksumAlgorithm::Sha384
        );
        assert!(ChecksumAlgorithm::from_name("SHA3").is_err());
        assert!(ChecksumAlgorithm::from_name("sha256").is_err());
    }

    #[test]
    fn test_hasher_known_digests() {
        let mut hasher = ChecksumAlgorithm::Sha256.hasher();
        hasher.write_all(b"abc").unwrap();
        assert_eq!(
            hasher.finalize_hex(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );

        let mut hasher = ChecksumAlgorithm::Sha1.hasher();
        hasher.update(b"abc");
        assert_eq!(
            hasher.finalize_hex(),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
    }

    #[test]
    fn test_hasher_output_length_matches_bytes_len() {
        for alg in ChecksumAlgorithm::ALL {
            let hex = alg.hasher().finalize_hex();
            assert_eq!(hex.len(), alg.bytes_len() * 2, "{}", alg);
        }
    }
}
