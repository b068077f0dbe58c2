//! NuGet package versions
//!
//! NuGet versions have up to four release components (`major.minor.patch.revision`)
//! followed by an optional SemVer 2.0 prerelease label and build metadata.
//! Missing components are zero, so `1.0`, `1.0.0` and `1.0.0.0` are equal.
//! Prerelease labels compare case-insensitively and build metadata is ignored
//! by ordering and equality.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use semver::{BuildMetadata, Prerelease};
use serde::{Serialize, Serializer};

use crate::version::error::ParseError;

/// A parsed NuGet version
#[derive(Debug, Clone)]
pub struct Version {
    release: [u64; 4],
    /// Lowercased label, used for precedence
    pre: Prerelease,
    /// Label as written
    label: Option<String>,
}

impl Version {
    /// Creates a release version `major.minor.patch`
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            release: [major, minor, patch, 0],
            pre: Prerelease::EMPTY,
            label: None,
        }
    }

    pub fn parse(version: &str) -> Result<Self, ParseError> {
        version.parse()
    }

    /// Builds a version from release components and an optional prerelease label
    pub(crate) fn from_parts(release: [u64; 4], label: Option<&str>) -> Result<Self, ParseError> {
        let pre = match label {
            Some(label) => parse_label(label)?,
            None => Prerelease::EMPTY,
        };

        Ok(Self {
            release,
            pre,
            label: label.map(str::to_string),
        })
    }

    pub fn major(&self) -> u64 {
        self.release[0]
    }

    pub fn minor(&self) -> u64 {
        self.release[1]
    }

    pub fn patch(&self) -> u64 {
        self.release[2]
    }

    pub fn revision(&self) -> u64 {
        self.release[3]
    }

    /// Release components, with missing components reported as zero
    pub fn release(&self) -> [u64; 4] {
        self.release
    }

    pub fn is_prerelease(&self) -> bool {
        !self.pre.is_empty()
    }

    /// Prerelease label as written (e.g. `beta.1`)
    pub fn release_label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Whether both versions have the same release components, ignoring prerelease labels
    pub fn same_base(&self, other: &Version) -> bool {
        self.release == other.release
    }
}

fn parse_label(label: &str) -> Result<Prerelease, ParseError> {
    if label.is_empty() {
        return Err(ParseError::InvalidVersion("empty prerelease label".to_string()));
    }
    Prerelease::new(&label.to_ascii_lowercase())
        .map_err(|e| ParseError::InvalidVersion(format!("prerelease '{}': {}", label, e)))
}

/// Parses `1`, `1.2`, `1.2.3` or `1.2.3.4`, padding missing components with zero
pub(crate) fn parse_release(numbers: &str) -> Option<[u64; 4]> {
    let parts: Vec<&str> = numbers.split('.').collect();
    if parts.is_empty() || parts.len() > 4 {
        return None;
    }

    let mut release = [0u64; 4];
    for (slot, part) in release.iter_mut().zip(&parts) {
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        *slot = part.parse().ok()?;
    }
    Some(release)
}

impl FromStr for Version {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParseError::Empty);
        }
        let invalid = || ParseError::InvalidVersion(s.to_string());

        let rest = match s.split_once('+') {
            Some((rest, metadata)) => {
                if metadata.is_empty() || BuildMetadata::new(metadata).is_err() {
                    return Err(invalid());
                }
                rest
            }
            None => s,
        };

        let (numbers, label) = match rest.split_once('-') {
            Some((numbers, label)) => (numbers, Some(label)),
            None => (rest, None),
        };

        let release = parse_release(numbers).ok_or_else(invalid)?;
        Self::from_parts(release, label).map_err(|_| invalid())
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [major, minor, patch, revision] = self.release;
        write!(f, "{}.{}.{}", major, minor, patch)?;
        if revision > 0 {
            write!(f, ".{}", revision)?;
        }
        if let Some(label) = &self.label {
            write!(f, "-{}", label)?;
        }
        Ok(())
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.release
            .cmp(&other.release)
            .then_with(|| self.pre.cmp(&other.pre))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.release.hash(state);
        self.pre.hash(state);
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
