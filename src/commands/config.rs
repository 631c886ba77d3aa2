use anyhow::{Context, Result};
use log::debug;
use std::path::PathBuf;

use crate::platform::{Architecture, OperatingSystem, Platform};
use crate::runtime::Runtime;
use crate::source::DEFAULT_API_URL;

/// Which command is being run; decides the default destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Into the current directory.
    Download,
    /// Into a bin directory.
    Install,
}

/// Values given on the command line. Unset fields fall back to the
/// environment and then to platform defaults.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub arch: Option<Architecture>,
    pub os: Option<OperatingSystem>,
    pub destination: Option<PathBuf>,
    pub cache_dir: Option<PathBuf>,
    pub api_url: Option<String>,
    pub multiple_binaries: bool,
    pub verify_in_archive: bool,
    pub quiet: bool,
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// GitHub token for API authentication
    pub token: Option<String>,
    pub api_url: String,
    pub cache_dir: PathBuf,
    pub destination: PathBuf,
    pub platform: Platform,
    pub multiple_binaries: bool,
    pub verify_in_archive: bool,
    pub quiet: bool,
}

impl Config {
    #[tracing::instrument(skip(runtime, overrides))]
    pub fn load<R: Runtime>(runtime: &R, mode: Mode, overrides: Overrides) -> Result<Self> {
        let token = runtime
            .env_var("GITHUB_TOKEN")
            .or_else(|_| runtime.env_var("GH_TOKEN"))
            .ok()
            .filter(|t| !t.is_empty());
        if token.is_some() {
            debug!("Using token from the environment for authentication");
        }

        let cache_dir = match overrides.cache_dir {
            Some(dir) => dir,
            None => default_cache_dir(runtime)?,
        };
        let destination = match overrides.destination {
            Some(dir) => dir,
            None => default_destination(runtime, mode)?,
        };

        let detected = Platform::detect();
        let platform = Platform {
            arch: overrides.arch.unwrap_or(detected.arch),
            os: overrides.os.unwrap_or(detected.os),
        };

        Ok(Self {
            token,
            api_url: overrides
                .api_url
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            cache_dir,
            destination,
            platform,
            multiple_binaries: overrides.multiple_binaries,
            verify_in_archive: overrides.verify_in_archive,
            quiet: overrides.quiet,
        })
    }
}

fn default_cache_dir<R: Runtime>(runtime: &R) -> Result<PathBuf> {
    if let Ok(dir) = runtime.env_var("GHET_CACHE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    let cache = runtime
        .cache_dir()
        .context("Could not find a cache directory; set GHET_CACHE_DIR")?;
    Ok(cache.join("ghet"))
}

fn default_destination<R: Runtime>(runtime: &R, mode: Mode) -> Result<PathBuf> {
    match mode {
        Mode::Download => runtime.current_dir(),
        Mode::Install => {
            if let Ok(dir) = runtime.env_var("GHET_BIN_DIR") {
                return Ok(PathBuf::from(dir));
            }
            if let Some(dir) = runtime.executable_dir() {
                return Ok(dir);
            }
            let home = runtime
                .home_dir()
                .context("Could not find home directory")?;
            Ok(home.join(".local").join("bin"))
        }
    }
}
