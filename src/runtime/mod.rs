//! Runtime abstraction for system operations.
//!
//! Every filesystem and environment access of the pipeline goes through
//! [`Runtime`], so tests can swap in a `MockRuntime`.
//!
//! # Structure
//!
//! - `env` - Environment variables and platform directories
//! - `fs` - File system operations (stream, move, remove, permissions)

mod env;
mod fs;

use anyhow::Result;
use std::env as std_env;
use std::path::{Path, PathBuf};

#[cfg_attr(test, mockall::automock)]
pub trait Runtime: Send + Sync {
    // Environment
    fn env_var(&self, key: &str) -> Result<String, std_env::VarError>;
    fn current_dir(&self) -> Result<PathBuf>;
    /// Whether stdin and stderr are both attached to a terminal.
    fn is_terminal(&self) -> bool;

    // File System
    fn rename(&self, from: &Path, to: &Path) -> Result<()>;
    fn copy(&self, from: &Path, to: &Path) -> Result<u64>;
    fn create_dir_all(&self, path: &Path) -> Result<()>;
    fn remove_file(&self, path: &Path) -> Result<()>;
    fn remove_dir_all(&self, path: &Path) -> Result<()>;
    fn exists(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;
    fn file_size(&self, path: &Path) -> Result<u64>;
    fn create_file(&self, path: &Path) -> Result<Box<dyn std::io::Write + Send>>;
    fn open(&self, path: &Path) -> Result<Box<dyn std::io::Read + Send>>;

    /// Set file permissions (mode) on Unix systems. No-op on Windows.
    fn set_permissions(&self, path: &Path, mode: u32) -> Result<()>;

    /// Set the modification time, in seconds since the epoch.
    fn set_modified(&self, path: &Path, mtime: u64) -> Result<()>;

    // Directories
    fn home_dir(&self) -> Option<PathBuf>;
    fn cache_dir(&self) -> Option<PathBuf>;
    fn executable_dir(&self) -> Option<PathBuf>;
}

pub struct RealRuntime;

impl Runtime for RealRuntime {
    fn env_var(&self, key: &str) -> Result<String, std_env::VarError> {
        self.env_var_impl(key)
    }

    fn current_dir(&self) -> Result<PathBuf> {
        self.current_dir_impl()
    }

    fn is_terminal(&self) -> bool {
        self.is_terminal_impl()
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        self.rename_impl(from, to)
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<u64> {
        self.copy_impl(from, to)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        self.create_dir_all_impl(path)
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        self.remove_file_impl(path)
    }

    fn remove_dir_all(&self, path: &Path) -> Result<()> {
        self.remove_dir_all_impl(path)
    }

    fn exists(&self, path: &Path) -> bool {
        self.exists_impl(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.is_dir_impl(path)
    }

    fn file_size(&self, path: &Path) -> Result<u64> {
        self.file_size_impl(path)
    }

    fn create_file(&self, path: &Path) -> Result<Box<dyn std::io::Write + Send>> {
        self.create_file_impl(path)
    }

    fn open(&self, path: &Path) -> Result<Box<dyn std::io::Read + Send>> {
        self.open_impl(path)
    }

    fn set_permissions(&self, path: &Path, mode: u32) -> Result<()> {
        self.set_permissions_impl(path, mode)
    }

    fn set_modified(&self, path: &Path, mtime: u64) -> Result<()> {
        self.set_modified_impl(path, mtime)
    }

    fn home_dir(&self) -> Option<PathBuf> {
        self.home_dir_impl()
    }

    fn cache_dir(&self) -> Option<PathBuf> {
        self.cache_dir_impl()
    }

    fn executable_dir(&self) -> Option<PathBuf> {
        self.executable_dir_impl()
    }
}

/// Moves a file, falling back to copy-and-delete when `rename` fails
/// (typically across filesystems).
pub fn move_file<R: Runtime + ?Sized>(runtime: &R, from: &Path, to: &Path) -> Result<()> {
    if let Err(err) = runtime.rename(from, to) {
        log::debug!(
            "rename {:?} -> {:?} failed ({}), copying instead",
            from,
            to,
            err
        );
        runtime.copy(from, to)?;
        runtime.remove_file(from)?;
    }
    Ok(())
}
