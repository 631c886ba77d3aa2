//! Target platform model: architecture and operating system, each with the
//! name heuristics used to recognize it in release asset names.

mod arch;
mod os;

pub use arch::{Architecture, no_arch_matches};
pub use os::{OperatingSystem, no_os_matches};

/// Platform information for asset selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    pub arch: Architecture,
    pub os: OperatingSystem,
}

impl Platform {
    /// Detect the current platform
    pub fn detect() -> Self {
        Self {
            arch: Architecture::current(),
            os: OperatingSystem::current(),
        }
    }

    /// Whether `name` carries both this platform's architecture and OS tokens.
    pub fn matches(&self, name: &str) -> bool {
        self.arch.matches(name) && self.os.matches(name)
    }
}
