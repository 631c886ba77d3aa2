//! Installation spec parsing: `owner/repo[@tag][::archive][!!binary[.ext]]`.

use anyhow::{Result, anyhow};
use std::fmt;
use std::str::FromStr;

use crate::source::{LATEST_TAG, Release, Repository};

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct InstallSpec {
    pub release: Release,
    /// Exact name of the archive asset to use.
    pub archive: Option<String>,
    /// Binary name, possibly with an extension.
    pub binary: Option<String>,
}

impl fmt::Display for InstallSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.release)?;
        if let Some(archive) = &self.archive {
            write!(f, "::{}", archive)?;
        }
        if let Some(binary) = &self.binary {
            write!(f, "!!{}", binary)?;
        }
        Ok(())
    }
}

fn split_off<'a>(s: &'a str, sep: &str, what: &str) -> Result<(&'a str, Option<String>)> {
    match s.split_once(sep) {
        Some((_, "")) => Err(anyhow!(
            "Invalid format: {} after {:?} cannot be empty.",
            what,
            sep
        )),
        Some((head, tail)) => Ok((head, Some(tail.to_string()))),
        None => Ok((s, None)),
    }
}

impl FromStr for InstallSpec {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (rest, binary) = split_off(s.trim(), "!!", "binary name")?;
        let (rest, archive) = split_off(rest, "::", "archive name")?;
        let (repo_part, tag) = split_off(rest, "@", "tag")?;

        let repository = repo_part.parse::<Repository>()?;
        let tag = tag.unwrap_or_else(|| LATEST_TAG.to_string());
        Ok(InstallSpec {
            release: Release::new(repository, tag),
            archive,
            binary,
        })
    }
}
