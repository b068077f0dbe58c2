//! NuGet version ranges
//!
//! Supports the constraint forms NuGet accepts in project files:
//! - `1.2.3` - minimum version, inclusive (`[1.2.3, )`)
//! - `[1.0, 2.0)`, `(1.0, )`, `(, 2.0]` - interval notation
//! - `[1.2.3]` - exact version
//! - `1.*`, `1.2.*`, `1.2.3-beta*`, `*-*` - floating versions
//!
//! A range without an explicit lower bound reports `0.0.0` as its minimum.

use std::cmp::Ordering;
use std::fmt;

use crate::version::error::ParseError;
use crate::version::nuget::{Version, parse_release};

/// How a floating constraint tracks newer versions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FloatBehavior {
    /// Not floating
    None,
    /// `1.2.3-beta*`
    Prerelease,
    /// `1.2.3.*`
    Revision,
    /// `1.2.*`
    Patch,
    /// `1.*`
    Minor,
    /// `*`
    Major,
    /// `*-*`: newest version available, prerelease or not
    AbsoluteLatest,
    /// `1.2.3.*-*`
    PrereleaseRevision,
    /// `1.2.*-*`
    PrereleasePatch,
    /// `1.*-*`
    PrereleaseMinor,
    /// `*-rc*`
    PrereleaseMajor,
}

/// A parsed floating version such as `1.*` or `2.0.0-preview*`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FloatRange {
    behavior: FloatBehavior,
    min_version: Version,
    original: String,
}

impl FloatRange {
    pub fn parse(spec: &str) -> Result<Self, ParseError> {
        let spec = spec.trim();
        let invalid = || ParseError::InvalidFloat(spec.to_string());

        if spec.is_empty() {
            return Err(ParseError::Empty);
        }
        if spec == "*-*" {
            return Ok(Self {
                behavior: FloatBehavior::AbsoluteLatest,
                min_version: Version::from_parts([0; 4], Some("0"))?,
                original: spec.to_string(),
            });
        }

        let (release_part, prerelease_part) = match spec.split_once('-') {
            Some((release, prerelease)) => (release, Some(prerelease)),
            None => (spec, None),
        };

        let (behavior, release, release_prefix) = match prerelease_part {
            Some(prerelease) => {
                let prefix = prerelease.strip_suffix('*').ok_or_else(invalid)?;
                if prefix.contains('*') {
                    return Err(invalid());
                }
                let (fixed, release) = parse_floating_release(release_part).ok_or_else(invalid)?;
                let behavior = match fixed {
                    Some(0) => FloatBehavior::PrereleaseMajor,
                    Some(1) => FloatBehavior::PrereleaseMinor,
                    Some(2) => FloatBehavior::PrereleasePatch,
                    Some(3) => FloatBehavior::PrereleaseRevision,
                    Some(_) => return Err(invalid()),
                    None => FloatBehavior::Prerelease,
                };
                (behavior, release, Some(prefix.to_string()))
            }
            None => {
                let (fixed, release) = parse_floating_release(release_part).ok_or_else(invalid)?;
                let behavior = match fixed {
                    Some(0) => FloatBehavior::Major,
                    Some(1) => FloatBehavior::Minor,
                    Some(2) => FloatBehavior::Patch,
                    Some(3) => FloatBehavior::Revision,
                    // no `*` at all
                    _ => return Err(invalid()),
                };
                (behavior, release, None)
            }
        };

        let label = release_prefix.as_deref().map(|prefix| {
            if prefix.is_empty() || prefix.ends_with('.') {
                format!("{}0", prefix)
            } else {
                prefix.to_string()
            }
        });
        let min_version = Version::from_parts(release, label.as_deref()).map_err(|_| invalid())?;

        Ok(Self {
            behavior,
            min_version,
            original: spec.to_string(),
        })
    }

    pub fn behavior(&self) -> FloatBehavior {
        self.behavior
    }

    /// Lowest version the float can resolve to
    pub fn min_version(&self) -> &Version {
        &self.min_version
    }
}

impl fmt::Display for FloatRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

/// Parses the release part of a float.
///
/// Returns the number of fixed components before a trailing `*` (or `None`
/// when the release part does not float) together with the zero-padded release.
fn parse_floating_release(release: &str) -> Option<(Option<usize>, [u64; 4])> {
    if release == "*" {
        return Some((Some(0), [0; 4]));
    }
    match release.strip_suffix(".*") {
        Some(fixed) => {
            if fixed.contains('*') {
                return None;
            }
            let count = fixed.split('.').count();
            if count > 3 {
                return None;
            }
            parse_release(fixed).map(|r| (Some(count), r))
        }
        None => {
            if release.contains('*') {
                return None;
            }
            parse_release(release).map(|r| (None, r))
        }
    }
}

/// One end of a version interval
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bound {
    pub version: Version,
    pub inclusive: bool,
}

/// A parsed version constraint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRange {
    min: Option<Bound>,
    max: Option<Bound>,
    float: Option<FloatRange>,
}

impl VersionRange {
    /// Parse a version constraint string
    pub fn parse(constraint: &str) -> Result<Self, ParseError> {
        let s = constraint.trim();
        if s.is_empty() {
            return Err(ParseError::Empty);
        }

        if s.starts_with('[') || s.starts_with('(') {
            return Self::parse_interval(s);
        }

        if s.contains('*') {
            let float = FloatRange::parse(s)?;
            return Ok(Self {
                min: Some(Bound {
                    version: float.min_version().clone(),
                    inclusive: true,
                }),
                max: None,
                float: Some(float),
            });
        }

        Ok(Self {
            min: Some(Bound {
                version: Version::parse(s)?,
                inclusive: true,
            }),
            max: None,
            float: None,
        })
    }

    fn parse_interval(s: &str) -> Result<Self, ParseError> {
        let invalid = || ParseError::InvalidRange(s.to_string());

        let open_inclusive = s.starts_with('[');
        let close_inclusive = match s.chars().last() {
            Some(']') => true,
            Some(')') => false,
            _ => return Err(invalid()),
        };
        if s.len() < 2 {
            return Err(invalid());
        }
        let inner = s[1..s.len() - 1].trim();

        let Some((lower, upper)) = inner.split_once(',') else {
            // [1.0] means exactly 1.0
            if !open_inclusive || !close_inclusive || inner.is_empty() || inner.contains('*') {
                return Err(invalid());
            }
            let version = Version::parse(inner)?;
            return Ok(Self {
                min: Some(Bound {
                    version: version.clone(),
                    inclusive: true,
                }),
                max: Some(Bound {
                    version,
                    inclusive: true,
                }),
                float: None,
            });
        };

        let lower = lower.trim();
        let upper = upper.trim();
        if upper.contains(',') || (lower.is_empty() && upper.is_empty()) {
            return Err(invalid());
        }

        let mut float = None;
        let min = if lower.is_empty() {
            None
        } else if lower.contains('*') {
            let parsed = FloatRange::parse(lower)?;
            let version = parsed.min_version().clone();
            float = Some(parsed);
            Some(Bound {
                version,
                inclusive: open_inclusive,
            })
        } else {
            Some(Bound {
                version: Version::parse(lower)?,
                inclusive: open_inclusive,
            })
        };

        let max = if upper.is_empty() {
            None
        } else if upper.contains('*') {
            return Err(invalid());
        } else {
            Some(Bound {
                version: Version::parse(upper)?,
                inclusive: close_inclusive,
            })
        };

        if let (Some(min), Some(max)) = (&min, &max) {
            match min.version.cmp(&max.version) {
                Ordering::Greater => return Err(invalid()),
                Ordering::Equal if !(min.inclusive && max.inclusive) => return Err(invalid()),
                _ => {}
            }
        }

        Ok(Self { min, max, float })
    }

    pub fn min(&self) -> Option<&Bound> {
        self.min.as_ref()
    }

    pub fn max(&self) -> Option<&Bound> {
        self.max.as_ref()
    }

    /// Lower bound of the range, `0.0.0` when the constraint has none
    pub fn min_version(&self) -> Version {
        self.min
            .as_ref()
            .map(|bound| bound.version.clone())
            .unwrap_or_else(|| Version::new(0, 0, 0))
    }

    pub fn float(&self) -> Option<&FloatRange> {
        self.float.as_ref()
    }

    pub fn float_behavior(&self) -> FloatBehavior {
        self.float
            .as_ref()
            .map_or(FloatBehavior::None, FloatRange::behavior)
    }

    /// Check if a version falls inside the interval
    pub fn satisfies(&self, version: &Version) -> bool {
        if let Some(min) = &self.min {
            match version.cmp(&min.version) {
                Ordering::Less => return false,
                Ordering::Equal if !min.inclusive => return false,
                _ => {}
            }
        }
        if let Some(max) = &self.max {
            match version.cmp(&max.version) {
                Ordering::Greater => return false,
                Ordering::Equal if !max.inclusive => return false,
                _ => {}
            }
        }
        true
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let (Some(float), None) = (&self.float, &self.max) {
            return write!(f, "{}", float);
        }
        if let (Some(min), Some(max)) = (&self.min, &self.max)
            && min.inclusive
            && max.inclusive
            && min.version == max.version
        {
            return write!(f, "[{}]", min.version);
        }

        match &self.min {
            Some(min) if min.inclusive => write!(f, "[{}, ", min.version)?,
            Some(min) => write!(f, "({}, ", min.version)?,
            None => f.write_str("(, ")?,
        }
        match &self.max {
            Some(max) if max.inclusive => write!(f, "{}]", max.version),
            Some(max) => write!(f, "{})", max.version),
            None => f.write_str(")"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[rstest]
    #[case("1.0.0", "1.0.0", FloatBehavior::None)]
    #[case("[1.0.0, )", "1.0.0", FloatBehavior::None)]
    #[case("[1.0, 2.0)", "1.0.0", FloatBehavior::None)]
    #[case("(, 2.0]", "0.0.0", FloatBehavior::None)]
    #[case("[1.5]", "1.5.0", FloatBehavior::None)]
    #[case("1.2.3-beta", "1.2.3-beta", FloatBehavior::None)]
    #[case("*", "0.0.0", FloatBehavior::Major)]
    #[case("1.*", "1.0.0", FloatBehavior::Minor)]
    #[case("1.2.*", "1.2.0", FloatBehavior::Patch)]
    #[case("1.2.3.*", "1.2.3", FloatBehavior::Revision)]
    #[case("1.2.3-*", "1.2.3-0", FloatBehavior::Prerelease)]
    #[case("1.2.3-beta*", "1.2.3-beta", FloatBehavior::Prerelease)]
    #[case("1.2.3-beta.*", "1.2.3-beta.0", FloatBehavior::Prerelease)]
    #[case("*-*", "0.0.0-0", FloatBehavior::AbsoluteLatest)]
    #[case("*-rc*", "0.0.0-rc", FloatBehavior::PrereleaseMajor)]
    #[case("1.*-*", "1.0.0-0", FloatBehavior::PrereleaseMinor)]
    #[case("1.2.*-*", "1.2.0-0", FloatBehavior::PrereleasePatch)]
    #[case("1.2.3.*-*", "1.2.3-0", FloatBehavior::PrereleaseRevision)]
    #[case("[1.*, 2.0)", "1.0.0", FloatBehavior::Minor)]
    fn parse_reports_min_version_and_float_behavior(
        #[case] constraint: &str,
        #[case] min_version: &str,
        #[case] behavior: FloatBehavior,
    ) {
        let range = VersionRange::parse(constraint).unwrap();
        assert_eq!(range.min_version(), v(min_version));
        assert_eq!(range.min_version().to_string(), min_version);
        assert_eq!(range.float_behavior(), behavior);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("[1.0.0")]
    #[case("1.0.0]")]
    #[case("(,)")]
    #[case("(1.0)")]
    #[case("[1.0, 2.0, 3.0]")]
    #[case("[2.0, 1.0]")]
    #[case("[1.0, 1.0)")]
    #[case("[1.0, 2.*]")]
    #[case("1.*.3")]
    #[case("1.2.3-be*ta")]
    #[case("1.*-beta")]
    #[case("1.2.3.4.*")]
    #[case("not-a-version")]
    fn parse_rejects_malformed_constraints(#[case] constraint: &str) {
        assert!(VersionRange::parse(constraint).is_err());
    }

    #[test]
    fn parse_empty_constraint_reports_empty() {
        assert_eq!(VersionRange::parse(""), Err(ParseError::Empty));
    }

    #[test]
    fn float_keeps_prerelease_prefix_in_min_version() {
        let range = VersionRange::parse("2.0.0-preview*").unwrap();
        assert_eq!(
            range.float().unwrap().min_version().release_label(),
            Some("preview")
        );
    }

    #[rstest]
    #[case("[1.0, 2.0]", "1.0", true)]
    #[case("[1.0, 2.0]", "2.0", true)]
    #[case("[1.0, 2.0]", "2.0.1", false)]
    #[case("(1.0, 2.0)", "1.0", false)]
    #[case("(1.0, 2.0)", "2.0", false)]
    #[case("(1.0, 2.0)", "1.9.9", true)]
    #[case("(1.0, 2.0)", "2.0.0-beta", true)]
    #[case("(, 2.0]", "0.0.1", true)]
    #[case("1.0.0", "1.0.0", true)]
    #[case("1.0.0", "0.9.0", false)]
    #[case("1.0.0", "99.0.0", true)]
    #[case("1.0.0", "1.0.0-beta", false)]
    #[case("[1.5]", "1.5.0.0", true)]
    #[case("[1.5]", "1.5.1", false)]
    #[case("1.*", "1.0.0", true)]
    #[case("1.*", "2.0.0", true)]
    #[case("1.*", "0.9.0", false)]
    #[case("1.2.3-beta*", "1.2.3-beta.2", true)]
    #[case("1.2.3-beta*", "1.2.3-alpha", false)]
    #[case("*-*", "0.0.1-alpha", true)]
    fn satisfies_checks_interval_containment(
        #[case] constraint: &str,
        #[case] version: &str,
        #[case] expected: bool,
    ) {
        let range = VersionRange::parse(constraint).unwrap();
        assert_eq!(range.satisfies(&v(version)), expected);
    }

    #[rstest]
    #[case("1.0", "[1.0.0, )")]
    #[case("[1.0,2.0)", "[1.0.0, 2.0.0)")]
    #[case("(,2.0]", "(, 2.0.0]")]
    #[case("[1.5]", "[1.5.0]")]
    #[case("1.*", "1.*")]
    #[case("[1.*, 2.0)", "[1.0.0, 2.0.0)")]
    fn display_prints_normalized_range(#[case] constraint: &str, #[case] expected: &str) {
        assert_eq!(VersionRange::parse(constraint).unwrap().to_string(), expected);
    }
}
