//! Per-feed aggregate of eligible versions

use std::collections::BTreeSet;

use indexmap::{IndexMap, IndexSet};
use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};

use crate::feed::source::PackageSource;
use crate::version::nuget::Version;

/// Eligible versions found for one dependency, grouped by the feed that lists them
///
/// Versions are deduplicated within a feed but not across feeds: each feed's
/// set is authoritative for that feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionResult {
    current_version: Version,
    #[serde(serialize_with = "serialize_versions_by_source")]
    versions_by_source: IndexMap<PackageSource, BTreeSet<Version>>,
    current_version_sources: IndexSet<PackageSource>,
}

impl VersionResult {
    pub fn new(current_version: Version) -> Self {
        Self {
            current_version,
            versions_by_source: IndexMap::new(),
            current_version_sources: IndexSet::new(),
        }
    }

    /// Record a feed that lists the current version
    pub fn add_current_version_source(&mut self, source: PackageSource) {
        self.current_version_sources.insert(source);
    }

    /// Record eligible versions found on a feed
    ///
    /// The feed gets an entry even when `versions` is empty.
    pub fn add_range(&mut self, source: PackageSource, versions: impl IntoIterator<Item = Version>) {
        self.versions_by_source
            .entry(source)
            .or_default()
            .extend(versions);
    }

    pub fn current_version(&self) -> &Version {
        &self.current_version
    }

    pub fn versions_by_source(&self) -> &IndexMap<PackageSource, BTreeSet<Version>> {
        &self.versions_by_source
    }

    /// Eligible versions on one feed, `None` if the feed was not queried or was skipped
    pub fn versions_for(&self, source: &PackageSource) -> Option<&BTreeSet<Version>> {
        self.versions_by_source.get(source)
    }

    pub fn current_version_sources(&self) -> &IndexSet<PackageSource> {
        &self.current_version_sources
    }

    /// All eligible versions across feeds, lowest first
    pub fn versions(&self) -> Vec<&Version> {
        self.versions_by_source
            .values()
            .flatten()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Feeds that list `version`
    ///
    /// For the current version this falls back to the feeds that contain it,
    /// since the current version is not always eligible.
    pub fn package_sources(&self, version: &Version) -> Vec<&PackageSource> {
        let sources: Vec<_> = self
            .versions_by_source
            .iter()
            .filter(|(_, versions)| versions.contains(version))
            .map(|(source, _)| source)
            .collect();

        if sources.is_empty() && version == &self.current_version {
            return self.current_version_sources.iter().collect();
        }
        sources
    }
}

#[derive(Serialize)]
struct SourceVersions<'a> {
    source: &'a PackageSource,
    versions: &'a BTreeSet<Version>,
}

fn serialize_versions_by_source<S: Serializer>(
    map: &IndexMap<PackageSource, BTreeSet<Version>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut seq = serializer.serialize_seq(Some(map.len()))?;
    for (source, versions) in map {
        seq.serialize_element(&SourceVersions { source, versions })?;
    }
    seq.end()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    fn versions(specs: &[&str]) -> Vec<Version> {
        specs.iter().map(|s| v(s)).collect()
    }

    fn set(specs: &[&str]) -> BTreeSet<Version> {
        versions(specs).into_iter().collect()
    }

    #[test]
    fn add_range_keeps_sources_independent() {
        let a = PackageSource::new("a", "https://a.example/index.json");
        let b = PackageSource::new("b", "https://b.example/index.json");
        let mut result = VersionResult::new(v("1.0.0"));

        result.add_range(a.clone(), versions(&["1.0.0", "1.1.0"]));
        result.add_range(b.clone(), versions(&["1.1.0", "2.0.0"]));

        assert_eq!(result.versions_for(&a), Some(&set(&["1.0.0", "1.1.0"])));
        assert_eq!(result.versions_for(&b), Some(&set(&["1.1.0", "2.0.0"])));
        assert_eq!(
            result.versions(),
            vec![&v("1.0.0"), &v("1.1.0"), &v("2.0.0")]
        );
    }

    #[test]
    fn add_range_deduplicates_within_a_source() {
        let a = PackageSource::new("a", "https://a.example/index.json");
        let mut result = VersionResult::new(v("1.0.0"));

        result.add_range(a.clone(), versions(&["1.0", "1.0.0", "1.0.0.0"]));

        assert_eq!(result.versions_for(&a).unwrap().len(), 1);
    }

    #[test]
    fn add_range_records_source_with_no_eligible_versions() {
        let a = PackageSource::new("a", "https://a.example/index.json");
        let mut result = VersionResult::new(v("1.0.0"));

        result.add_range(a.clone(), Vec::new());

        assert_eq!(result.versions_for(&a), Some(&BTreeSet::new()));
    }

    #[test]
    fn package_sources_lists_every_source_with_the_version() {
        let a = PackageSource::new("a", "https://a.example/index.json");
        let b = PackageSource::new("b", "https://b.example/index.json");
        let mut result = VersionResult::new(v("1.0.0"));
        result.add_range(a.clone(), versions(&["1.1.0"]));
        result.add_range(b.clone(), versions(&["1.1.0", "2.0.0"]));

        assert_eq!(result.package_sources(&v("1.1.0")), vec![&a, &b]);
        assert_eq!(result.package_sources(&v("2.0.0")), vec![&b]);
        assert!(result.package_sources(&v("3.0.0")).is_empty());
    }

    #[test]
    fn package_sources_falls_back_to_current_version_sources() {
        let a = PackageSource::new("a", "https://a.example/index.json");
        let mut result = VersionResult::new(v("1.0.0"));
        result.add_current_version_source(a.clone());
        result.add_range(a.clone(), versions(&["1.1.0"]));

        assert_eq!(result.package_sources(&v("1.0.0")), vec![&a]);
    }

    #[test]
    fn serializes_sources_in_insertion_order() {
        let a = PackageSource::new("a", "https://a.example/index.json");
        let b = PackageSource::new("b", "https://b.example/index.json");
        let mut result = VersionResult::new(v("1.0.0"));
        result.add_current_version_source(b.clone());
        result.add_range(b, versions(&["1.1.0", "1.0.0"]));
        result.add_range(a, versions(&["1.2.0"]));

        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({
                "currentVersion": "1.0.0",
                "versionsBySource": [
                    {
                        "source": { "name": "b", "uri": "https://b.example/index.json" },
                        "versions": ["1.0.0", "1.1.0"]
                    },
                    {
                        "source": { "name": "a", "uri": "https://a.example/index.json" },
                        "versions": ["1.2.0"]
                    }
                ],
                "currentVersionSources": [
                    { "name": "b", "uri": "https://b.example/index.json" }
                ]
            })
        );
    }
}
