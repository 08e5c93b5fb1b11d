//! Release retention policy

/// How many releases survive pruning.
///
/// Configured as a plain integer; zero or negative means keep everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeepReleases {
    /// Never prune
    All,
    /// Keep this many releases, counting the one being deployed
    Newest(u32),
}

impl KeepReleases {
    /// Releases kept when nothing is configured
    pub const DEFAULT: KeepReleases = KeepReleases::Newest(5);

    /// Coerce a configured value; `n <= 0` keeps all releases.
    pub fn from_configured(n: i64) -> Self {
        if n <= 0 {
            KeepReleases::All
        } else {
            KeepReleases::Newest(u32::try_from(n).unwrap_or(u32::MAX))
        }
    }
}

impl Default for KeepReleases {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl std::fmt::Display for KeepReleases {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeepReleases::All => write!(f, "all"),
            KeepReleases::Newest(n) => write!(f, "{}", n),
        }
    }
}
