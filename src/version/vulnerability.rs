//! Known security advisories for a dependency

use crate::version::nuget::Version;
use crate::version::requirement::Requirement;

/// A security advisory affecting a range of package versions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityVulnerability {
    pub dependency_name: String,
    pub vulnerable_versions: Vec<Requirement>,
    pub safe_versions: Vec<Requirement>,
}

impl SecurityVulnerability {
    /// A version is vulnerable when it matches a vulnerable requirement
    /// and no safe requirement
    pub fn is_vulnerable(&self, version: &Version) -> bool {
        if self.safe_versions.iter().any(|r| r.is_satisfied_by(version)) {
            return false;
        }
        self.vulnerable_versions
            .iter()
            .any(|r| r.is_satisfied_by(version))
    }
}
