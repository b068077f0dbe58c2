//! Upgrade eligibility filter
//!
//! A candidate version is eligible when it:
//! - lies inside the dependency's version range,
//! - passes the pinned-prerelease rule,
//! - matches none of the ignore rules,
//! - is not reported by any security advisory.
//!
//! The pinned-prerelease rule: when the dependency currently resolves to a
//! prerelease, candidate prereleases must share its release components
//! (`1.2.3-beta` admits `1.2.3-rc` but not `1.3.0-beta`). Floating to the
//! absolute latest version (`*-*`) turns the rule off.

use crate::version::nuget::Version;
use crate::version::range::{FloatBehavior, VersionRange};
use crate::version::types::DependencyInfo;

/// Pure predicate deciding which versions are legal upgrade targets
#[derive(Debug, Clone)]
pub struct VersionFilter<'a> {
    dependency: &'a DependencyInfo,
    range: &'a VersionRange,
    pinned: Option<Version>,
}

impl<'a> VersionFilter<'a> {
    pub fn new(dependency: &'a DependencyInfo, range: &'a VersionRange) -> Self {
        let pinned = if range.float_behavior() != FloatBehavior::AbsoluteLatest {
            Some(range.min_version())
        } else {
            None
        };

        Self {
            dependency,
            range,
            pinned,
        }
    }

    pub fn is_eligible(&self, version: &Version) -> bool {
        self.range.satisfies(version)
            && self.passes_prerelease_pin(version)
            && !self.is_ignored(version)
            && !self.is_vulnerable(version)
    }

    fn passes_prerelease_pin(&self, version: &Version) -> bool {
        match &self.pinned {
            None => true,
            Some(pinned) => {
                !pinned.is_prerelease() || !version.is_prerelease() || version.same_base(pinned)
            }
        }
    }

    fn is_ignored(&self, version: &Version) -> bool {
        self.dependency
            .ignored_versions
            .iter()
            .any(|r| r.is_satisfied_by(version))
    }

    fn is_vulnerable(&self, version: &Version) -> bool {
        self.dependency
            .vulnerabilities
            .iter()
            .any(|v| v.is_vulnerable(version))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::requirement::Requirement;
    use crate::version::vulnerability::SecurityVulnerability;
    use rstest::rstest;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    fn requirements(specs: &[&str]) -> Vec<Requirement> {
        specs.iter().map(|s| s.parse().unwrap()).collect()
    }

    #[rstest]
    // range containment
    #[case("[1.0.0, 2.0.0)", "1.5.0", true)]
    #[case("[1.0.0, 2.0.0)", "2.0.0", false)]
    #[case("[1.0.0, 2.0.0)", "0.9.0", false)]
    // pinned to a release: prereleases inside the range are allowed
    #[case("[1.0.0, )", "2.0.0-beta", true)]
    // pinned to a prerelease: only prereleases with the same base
    #[case("1.2.3-beta", "1.2.3-rc", true)]
    #[case("1.2.3-beta", "1.3.0-beta", false)]
    #[case("1.2.3-beta", "1.3.0", true)]
    #[case("1.2.3-beta", "1.2.3", true)]
    #[case("1.2.3-*", "1.2.3-alpha", true)]
    #[case("1.2.3-*", "1.2.4-alpha", false)]
    // absolute latest turns the pin rule off
    #[case("*-*", "1.3.0-beta", true)]
    #[case("*-*", "0.0.1-alpha", true)]
    fn is_eligible_applies_range_and_prerelease_pin(
        #[case] constraint: &str,
        #[case] candidate: &str,
        #[case] expected: bool,
    ) {
        let dependency = DependencyInfo::new("Foo", constraint);
        let range = VersionRange::parse(constraint).unwrap();
        let filter = VersionFilter::new(&dependency, &range);

        assert_eq!(filter.is_eligible(&v(candidate)), expected);
    }

    #[test]
    fn is_eligible_rejects_ignored_versions() {
        let dependency = DependencyInfo::new("Foo", "[1.0.0, )")
            .with_ignored_versions(requirements(&["= 1.1.0", ">= 3.0"]));
        let range = VersionRange::parse(&dependency.version).unwrap();
        let filter = VersionFilter::new(&dependency, &range);

        assert!(filter.is_eligible(&v("1.0.0")));
        assert!(!filter.is_eligible(&v("1.1.0")));
        assert!(filter.is_eligible(&v("2.0.0")));
        assert!(!filter.is_eligible(&v("3.1.0")));
    }

    #[test]
    fn is_eligible_rejects_vulnerable_versions() {
        let dependency =
            DependencyInfo::new("Foo", "[1.0.0, )").with_vulnerabilities(vec![
                SecurityVulnerability {
                    dependency_name: "Foo".to_string(),
                    vulnerable_versions: requirements(&["< 1.2.0"]),
                    safe_versions: requirements(&["= 1.0.5"]),
                },
            ]);
        let range = VersionRange::parse(&dependency.version).unwrap();
        let filter = VersionFilter::new(&dependency, &range);

        assert!(!filter.is_eligible(&v("1.1.0")));
        assert!(filter.is_eligible(&v("1.0.5")));
        assert!(filter.is_eligible(&v("1.2.0")));
    }

    #[test]
    fn absolute_latest_still_applies_ignore_and_vulnerability_rules() {
        let dependency = DependencyInfo::new("Foo", "*-*")
            .with_ignored_versions(requirements(&["= 2.0.0-beta"]))
            .with_vulnerabilities(vec![SecurityVulnerability {
                dependency_name: "Foo".to_string(),
                vulnerable_versions: requirements(&["= 2.0.0-rc"]),
                safe_versions: vec![],
            }]);
        let range = VersionRange::parse(&dependency.version).unwrap();
        let filter = VersionFilter::new(&dependency, &range);

        assert!(!filter.is_eligible(&v("2.0.0-beta")));
        assert!(!filter.is_eligible(&v("2.0.0-rc")));
        assert!(filter.is_eligible(&v("2.0.0-rc.2")));
    }

    #[test]
    fn filter_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>(_: &T) {}

        let dependency = DependencyInfo::new("Foo", "1.0.0");
        let range = VersionRange::parse(&dependency.version).unwrap();
        let filter = VersionFilter::new(&dependency, &range);

        assert_send_sync(&filter);
    }
}
