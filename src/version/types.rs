//! Common types for version resolution

use crate::version::requirement::Requirement;
use crate::version::vulnerability::SecurityVulnerability;

/// A dependency whose upgrade candidates are being looked up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyInfo {
    /// Package id (e.g. "Newtonsoft.Json")
    pub name: String,
    /// Current version constraint as written in the project (e.g. "[1.0.0, )")
    pub version: String,
    /// Versions the user asked to never upgrade to
    pub ignored_versions: Vec<Requirement>,
    /// Known advisories for this package
    pub vulnerabilities: Vec<SecurityVulnerability>,
}

impl DependencyInfo {
    /// Creates a dependency with no ignore rules or advisories
    pub fn new(name: &str, version: &str) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
            ignored_versions: Vec::new(),
            vulnerabilities: Vec::new(),
        }
    }

    pub fn with_ignored_versions(mut self, ignored_versions: Vec<Requirement>) -> Self {
        self.ignored_versions = ignored_versions;
        self
    }

    pub fn with_vulnerabilities(mut self, vulnerabilities: Vec<SecurityVulnerability>) -> Self {
        self.vulnerabilities = vulnerabilities;
        self
    }
}
