//! Publish version names (`v0001`, `v0002`, ...)

use anyhow::{Context, Result};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Number of digits in a formatted version
pub const PADDING: usize = 4;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("'{0}' is not a version (expected v0001)")]
pub struct InvalidVersion(String);

/// A publish version number
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version(u32);

impl Version {
    pub const FIRST: Self = Self(1);

    pub fn new(number: u32) -> Self {
        Self(number)
    }

    pub fn number(self) -> u32 {
        self.0
    }

    /// Version after this one
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl FromStr for Version {
    type Err = InvalidVersion;

    /// Parse `v` followed by digits; more than four digits is allowed
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix('v')
            .filter(|d| d.len() >= PADDING && d.bytes().all(|b| b.is_ascii_digit()))
            .ok_or_else(|| InvalidVersion(s.to_string()))?;
        digits
            .parse()
            .map(Self)
            .map_err(|_| InvalidVersion(s.to_string()))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{:0width$}", self.0, width = PADDING)
    }
}

/// Highest version-named subdirectory of `dir`
///
/// A missing directory has no versions. Entries that are not versions are ignored.
pub fn latest_in(dir: &Path) -> Result<Option<Version>> {
    if !dir.exists() {
        return Ok(None);
    }

    let entries =
        fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))?;

    let mut latest = None;
    for entry in entries {
        let entry = entry.with_context(|| format!("Failed to read {}", dir.display()))?;
        if !entry.path().is_dir() {
            continue;
        }
        if let Some(version) = entry
            .file_name()
            .to_str()
            .and_then(|name| name.parse::<Version>().ok())
        {
            latest = latest.max(Some(version));
        }
    }
    Ok(latest)
}

/// Version that the next publish into `dir` should use
pub fn next_in(dir: &Path) -> Result<Version> {
    Ok(latest_in(dir)?.map_or(Version::FIRST, Version::next))
}
