//! Version requirements used by ignore rules and security advisories
//!
//! Supports the requirement strings emitted by dependency update tooling:
//! - `1.2.3`, `= 1.2.3` - exact match
//! - `!= 1.2.3` - anything but
//! - `> 1.2.3`, `>= 1.2.3`, `< 1.2.3`, `<= 1.2.3` - comparison operators
//! - `~> 1.2.3` - pessimistic: >= 1.2.3, < 1.3.0
//! - `>= 1.0, < 2.0` - comma-separated, all must be satisfied

use std::fmt;
use std::str::FromStr;

use crate::version::error::ParseError;
use crate::version::nuget::Version;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Comparator {
    Exact(Version),
    NotEqual(Version),
    Gt(Version),
    Gte(Version),
    Lt(Version),
    Lte(Version),
    /// `~>`: lower bound inclusive, upper bound exclusive
    Pessimistic { lower: Version, upper: Version },
}

impl Comparator {
    fn parse(spec: &str) -> Result<Self, ParseError> {
        let spec = spec.trim();
        let invalid = || ParseError::InvalidRequirement(spec.to_string());
        let version = |rest: &str| Version::parse(rest.trim()).map_err(|_| invalid());

        if let Some(rest) = spec.strip_prefix(">=") {
            version(rest).map(Comparator::Gte)
        } else if let Some(rest) = spec.strip_prefix("<=") {
            version(rest).map(Comparator::Lte)
        } else if let Some(rest) = spec.strip_prefix("!=") {
            version(rest).map(Comparator::NotEqual)
        } else if let Some(rest) = spec.strip_prefix("~>") {
            let lower = version(rest)?;
            let upper = pessimistic_upper(rest.trim(), &lower).ok_or_else(invalid)?;
            Ok(Comparator::Pessimistic { lower, upper })
        } else if let Some(rest) = spec.strip_prefix('>') {
            version(rest).map(Comparator::Gt)
        } else if let Some(rest) = spec.strip_prefix('<') {
            version(rest).map(Comparator::Lt)
        } else if let Some(rest) = spec.strip_prefix("==") {
            version(rest).map(Comparator::Exact)
        } else if let Some(rest) = spec.strip_prefix('=') {
            version(rest).map(Comparator::Exact)
        } else {
            version(spec).map(Comparator::Exact)
        }
    }

    fn matches(&self, version: &Version) -> bool {
        match self {
            Comparator::Exact(v) => version == v,
            Comparator::NotEqual(v) => version != v,
            Comparator::Gt(v) => version > v,
            Comparator::Gte(v) => version >= v,
            Comparator::Lt(v) => version < v,
            Comparator::Lte(v) => version <= v,
            Comparator::Pessimistic { lower, upper } => version >= lower && version < upper,
        }
    }
}

/// Upper bound for `~>`: bump the second-to-last written component
/// (`~> 1.2.3` -> `1.3.0`, `~> 1.2` -> `2.0.0`, `~> 1` -> `2.0.0`)
fn pessimistic_upper(text: &str, lower: &Version) -> Option<Version> {
    let numbers = text.split(['-', '+']).next()?;
    let written = numbers.split('.').count();
    let bump = written.max(2) - 2;

    let mut release = [0u64; 4];
    let lower_release = lower.release();
    release[..bump].copy_from_slice(&lower_release[..bump]);
    release[bump] = lower_release[bump].checked_add(1)?;

    Version::from_parts(release, None).ok()
}

/// A set of comparators that must all hold for a version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    comparators: Vec<Comparator>,
    original: String,
}

impl Requirement {
    pub fn parse(spec: &str) -> Result<Self, ParseError> {
        spec.parse()
    }

    /// Whether the version satisfies every comparator
    pub fn is_satisfied_by(&self, version: &Version) -> bool {
        self.comparators.iter().all(|c| c.matches(version))
    }
}

impl FromStr for Requirement {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParseError::InvalidRequirement(s.to_string()));
        }

        let comparators = s
            .split(',')
            .map(Comparator::parse)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            comparators,
            original: s.to_string(),
        })
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}
