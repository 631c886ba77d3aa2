use anyhow::anyhow;
use once_cell::sync::Lazy;
use std::fmt;
use std::str::FromStr;

use crate::matcher::{self, BoxMatcher, Matcher, any, ends_with, every, negate, substr};

/// Operating system (and libc flavor on Linux) an asset is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatingSystem {
    Darwin,
    LinuxGnu,
    LinuxMusl,
    Windows,
}

// Package-manager formats never count as an OS match.
fn not_package_manager(matcher: BoxMatcher) -> BoxMatcher {
    every(vec![
        matcher,
        negate(ends_with(".deb")),
        negate(ends_with(".rpm")),
    ])
}

static DARWIN: Lazy<BoxMatcher> = Lazy::new(|| {
    not_package_manager(any(vec![
        substr(&["darwin"]),
        substr(&["mac"]),
        substr(&["osx"]),
    ]))
});
static LINUX_GNU: Lazy<BoxMatcher> = Lazy::new(|| {
    not_package_manager(any(vec![
        substr(&["linux", "glibc"]),
        substr(&["linux", "gnu"]),
        every(vec![substr(&["linux"]), negate(substr(&["musl"]))]),
    ]))
});
static LINUX_MUSL: Lazy<BoxMatcher> =
    Lazy::new(|| not_package_manager(substr(&["linux", "musl"])));
// "darwin" contains "win", so it is excluded explicitly.
static WINDOWS: Lazy<BoxMatcher> = Lazy::new(|| {
    not_package_manager(every(vec![substr(&["win"]), negate(substr(&["darwin"]))]))
});

impl OperatingSystem {
    pub const ALL: [OperatingSystem; 4] = [
        OperatingSystem::Darwin,
        OperatingSystem::LinuxGnu,
        OperatingSystem::LinuxMusl,
        OperatingSystem::Windows,
    ];

    /// Detect the operating system this process runs on.
    pub fn current() -> Self {
        #[cfg(target_os = "macos")]
        {
            OperatingSystem::Darwin
        }
        #[cfg(target_os = "windows")]
        {
            OperatingSystem::Windows
        }
        #[cfg(not(any(target_os = "macos", target_os = "windows")))]
        {
            linux_flavor()
        }
    }

    fn matcher(&self) -> &'static dyn Matcher {
        match self {
            OperatingSystem::Darwin => &**DARWIN,
            OperatingSystem::LinuxGnu => &**LINUX_GNU,
            OperatingSystem::LinuxMusl => &**LINUX_MUSL,
            OperatingSystem::Windows => &**WINDOWS,
        }
    }

    /// Whether `name` carries this OS's token (case-insensitive).
    pub fn matches(&self, name: &str) -> bool {
        matcher::matches_lowercase(self.matcher(), name)
    }

    pub fn is_windows(&self) -> bool {
        *self == OperatingSystem::Windows
    }
}

/// True when `name` carries no operating system token at all.
pub fn no_os_matches(name: &str) -> bool {
    !OperatingSystem::ALL.iter().any(|os| os.matches(name))
}

/// A musl system ships its dynamic loader as `/lib/ld-musl-<arch>.so.1`.
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn linux_flavor() -> OperatingSystem {
    let musl = glob::glob("/lib/ld-musl-*")
        .map(|mut paths| paths.any(|p| p.is_ok()))
        .unwrap_or(false);
    log::debug!("Detected Linux flavor: {}", if musl { "musl" } else { "gnu" });
    if musl {
        OperatingSystem::LinuxMusl
    } else {
        OperatingSystem::LinuxGnu
    }
}

impl fmt::Display for OperatingSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OperatingSystem::Darwin => "darwin",
            OperatingSystem::LinuxGnu => "linux-gnu",
            OperatingSystem::LinuxMusl => "linux-musl",
            OperatingSystem::Windows => "windows",
        };
        f.write_str(s)
    }
}

impl FromStr for OperatingSystem {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "darwin" | "macos" | "mac" | "osx" => Ok(OperatingSystem::Darwin),
            "linux" | "linux-gnu" | "gnu" => Ok(OperatingSystem::LinuxGnu),
            "linux-musl" | "musl" => Ok(OperatingSystem::LinuxMusl),
            "windows" | "win" => Ok(OperatingSystem::Windows),
            _ => Err(anyhow!(
                "Unknown operating system: {}. Expected one of darwin, linux-gnu, linux-musl, windows.",
                s
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    #[test]
    fn test_current_uses_linux_flavor() {
        let flavor = linux_flavor();
        assert!(matches!(
            flavor,
            OperatingSystem::LinuxGnu | OperatingSystem::LinuxMusl
        ));
        assert_eq!(OperatingSystem::current(), flavor);
    }

    #[test]
    fn test_linux_gnu_match() {
        let os = OperatingSystem::LinuxGnu;
        assert!(!os.matches("pastel-v0.9.0-x86_64-pc-windows-gnu.zip"));
        assert!(os.matches("pastel-v0.9.0-x86_64-unknown-linux-gnu.tar.gz"));
        assert!(os.matches("kn-event-linux-amd64"));
        assert!(!os.matches("lsd-0.23.1-x86_64-unknown-linux-musl.tar.gz"));
    }

    #[test]
    fn test_linux_musl_match() {
        let os = OperatingSystem::LinuxMusl;
        assert!(os.matches("lsd-0.23.1-x86_64-unknown-linux-musl.tar.gz"));
        assert!(!os.matches("lsd-0.23.1-x86_64-unknown-linux-gnu.tar.gz"));
    }

    #[test]
    fn test_package_managers_excluded() {
        assert!(!OperatingSystem::LinuxGnu.matches("app-linux-amd64.deb"));
        assert!(!OperatingSystem::LinuxGnu.matches("app-linux-amd64.rpm"));
        assert!(!OperatingSystem::LinuxMusl.matches("app-linux-musl.deb"));
    }

    #[test]
    fn test_darwin_aliases() {
        let os = OperatingSystem::Darwin;
        assert!(os.matches("k9s_Darwin_arm64.tar.gz"));
        assert!(os.matches("app-macos-arm64.zip"));
        assert!(os.matches("app-osx.tar.gz"));
        assert!(!os.matches("app-linux-arm64.tar.gz"));
    }

    #[test]
    fn test_windows_does_not_match_darwin() {
        assert!(OperatingSystem::Windows.matches("app-windows-amd64.zip"));
        assert!(OperatingSystem::Windows.matches("app-win64.zip"));
        assert!(!OperatingSystem::Windows.matches("app-darwin-amd64.tar.gz"));
    }

    #[test]
    fn test_no_os_matches() {
        assert!(no_os_matches("app"));
        assert!(no_os_matches("app-amd64"));
        assert!(!no_os_matches("app-linux"));
    }

    #[test]
    fn test_parse_and_display() {
        for os in OperatingSystem::ALL {
            assert_eq!(os.to_string().parse::<OperatingSystem>().unwrap(), os);
        }
        assert_eq!(
            "macos".parse::<OperatingSystem>().unwrap(),
            OperatingSystem::Darwin
        );
        assert!("plan9".parse::<OperatingSystem>().is_err());
    }

    #[test]
    fn test_current_is_known() {
        let os = OperatingSystem::current();
        assert!(OperatingSystem::ALL.contains(&os));

        #[cfg(target_os = "macos")]
        assert_eq!(os, OperatingSystem::Darwin);

        #[cfg(target_os = "linux")]
        assert!(matches!(
            os,
            OperatingSystem::LinuxGnu | OperatingSystem::LinuxMusl
        ));
    }
}
