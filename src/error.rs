//! Failure kinds surfaced by the installation pipeline.
//!
//! Functions return `anyhow::Result`; the variants below are the domain
//! failures callers may want to tell apart, via
//! `err.downcast_ref::<InstallError>()`.

use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum InstallError {
    /// No release asset matched the requested target, or the plan is empty.
    #[error("no matching asset found: {0}")]
    NoAssetFound(String),

    #[error("too many checksums: {count} checksum files found, expected just one")]
    TooManyChecksums { count: usize },

    /// Not fatal; verification is skipped.
    #[error("no checksum")]
    NoChecksum,

    #[error("unknown checksum algorithm: {hash}")]
    UnknownChecksumAlgorithm { hash: String },

    #[error("invalid checksum line: {line}")]
    InvalidChecksumLine { line: String },

    #[error("checksum mismatch: {asset}, {actual} != {expected}")]
    ChecksumMismatch {
        asset: String,
        actual: String,
        expected: String,
    },

    #[error("not verified assets: {}", .assets.join(", "))]
    NotVerifiedAssets { assets: Vec<String> },

    #[error("no binary named like {basename:?} found in archive {archive}")]
    NoBinaryInArchive { archive: String, basename: String },

    #[error("too many binaries in archive {archive}: {}", .candidates.join(", "))]
    TooManyBinaries {
        archive: String,
        candidates: Vec<String>,
    },

    #[error("not an interactive session")]
    NotInteractive,

    #[error("unexpected error: {message}")]
    Unexpected {
        message: String,
        #[source]
        source: BoxError,
    },
}

impl InstallError {
    pub fn unexpected<E>(message: impl Into<String>, source: E) -> Self
    where
        E: Into<BoxError>,
    {
        InstallError::Unexpected {
            message: message.into(),
            source: source.into(),
        }
    }
}

/// Wraps lower-level I/O, filesystem and network failures into
/// [`InstallError::Unexpected`]. Accepts `std` errors and `anyhow::Error`.
pub trait UnexpectedExt<T> {
    fn unexpected<F, S>(self, message: F) -> Result<T, InstallError>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T, E> UnexpectedExt<T> for Result<T, E>
where
    E: Into<BoxError>,
{
    fn unexpected<F, S>(self, message: F) -> Result<T, InstallError>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| InstallError::unexpected(message(), e))
    }
}

/// Returns the domain failure carried by `err`, if any.
pub fn install_error(err: &anyhow::Error) -> Option<&InstallError> {
    err.downcast_ref::<InstallError>()
}
