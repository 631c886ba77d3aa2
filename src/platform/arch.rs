use anyhow::anyhow;
use once_cell::sync::Lazy;
use std::fmt;
use std::str::FromStr;

use crate::matcher::{self, BoxMatcher, Matcher, any, every, negate, regex, substr};

/// CPU architecture an asset is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Architecture {
    X86,
    Amd64,
    Arm,
    Arm64,
    Ppc64le,
    S390x,
}

static X86: Lazy<BoxMatcher> = Lazy::new(|| {
    any(vec![
        every(vec![substr(&["x86"]), negate(substr(&["x86_64"]))]),
        regex(&["i?[3-6]86"]),
    ])
});
static AMD64: Lazy<BoxMatcher> = Lazy::new(|| any(vec![substr(&["amd64"]), substr(&["x86_64"])]));
static ARM: Lazy<BoxMatcher> = Lazy::new(|| {
    any(vec![
        substr(&["arm32"]),
        every(vec![substr(&["arm"]), negate(substr(&["arm64"]))]),
    ])
});
static ARM64: Lazy<BoxMatcher> = Lazy::new(|| any(vec![substr(&["arm64"])]));
static PPC64LE: Lazy<BoxMatcher> = Lazy::new(|| any(vec![regex(&["ppc-?64-?(?:le)?"])]));
static S390X: Lazy<BoxMatcher> = Lazy::new(|| any(vec![substr(&["s390x"])]));

impl Architecture {
    pub const ALL: [Architecture; 6] = [
        Architecture::X86,
        Architecture::Amd64,
        Architecture::Arm,
        Architecture::Arm64,
        Architecture::Ppc64le,
        Architecture::S390x,
    ];

    /// Detect the architecture this binary was compiled for.
    pub fn current() -> Self {
        #[cfg(target_arch = "x86_64")]
        {
            Architecture::Amd64
        }
        #[cfg(target_arch = "aarch64")]
        {
            Architecture::Arm64
        }
        #[cfg(target_arch = "x86")]
        {
            Architecture::X86
        }
        #[cfg(target_arch = "arm")]
        {
            Architecture::Arm
        }
        #[cfg(target_arch = "powerpc64")]
        {
            Architecture::Ppc64le
        }
        #[cfg(target_arch = "s390x")]
        {
            Architecture::S390x
        }
        #[cfg(not(any(
            target_arch = "x86_64",
            target_arch = "aarch64",
            target_arch = "x86",
            target_arch = "arm",
            target_arch = "powerpc64",
            target_arch = "s390x"
        )))]
        {
            Architecture::Amd64
        }
    }

    fn matcher(&self) -> &'static dyn Matcher {
        match self {
            Architecture::X86 => &**X86,
            Architecture::Amd64 => &**AMD64,
            Architecture::Arm => &**ARM,
            Architecture::Arm64 => &**ARM64,
            Architecture::Ppc64le => &**PPC64LE,
            Architecture::S390x => &**S390X,
        }
    }

    /// Whether `name` carries this architecture's token (case-insensitive).
    pub fn matches(&self, name: &str) -> bool {
        matcher::matches_lowercase(self.matcher(), name)
    }
}

/// True when `name` carries no architecture token at all.
pub fn no_arch_matches(name: &str) -> bool {
    !Architecture::ALL.iter().any(|a| a.matches(name))
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Architecture::X86 => "x86",
            Architecture::Amd64 => "amd64",
            Architecture::Arm => "arm",
            Architecture::Arm64 => "arm64",
            Architecture::Ppc64le => "ppc64le",
            Architecture::S390x => "s390x",
        };
        f.write_str(s)
    }
}

impl FromStr for Architecture {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "x86" | "386" | "i386" | "i686" => Ok(Architecture::X86),
            "amd64" | "x86_64" | "x64" => Ok(Architecture::Amd64),
            "arm" | "arm32" | "armv7" => Ok(Architecture::Arm),
            "arm64" | "aarch64" => Ok(Architecture::Arm64),
            "ppc64le" => Ok(Architecture::Ppc64le),
            "s390x" => Ok(Architecture::S390x),
            _ => Err(anyhow!(
                "Unknown architecture: {}. Expected one of x86, amd64, arm, arm64, ppc64le, s390x.",
                s
            )),
        }
    }
}
