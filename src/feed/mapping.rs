//! Package source mapping
//!
//! Restricts which feeds a package may be restored from. A mapping lists, per
//! source name, package id patterns: either an exact id (`Contoso.Core`) or a
//! prefix ending in `*` (`Contoso.*`, or `*` for everything). Patterns are
//! matched case-insensitively and the most specific matching pattern wins.

use indexmap::IndexMap;
#[cfg(test)]
use mockall::automock;
use serde::Deserialize;

use crate::feed::source::PackageSource;

/// Policy deciding which source names a package may come from
#[cfg_attr(test, automock)]
pub trait SourceMappingPolicy: Send + Sync {
    /// Source names the package is mapped to; empty means no restriction
    fn configured_sources(&self, package_id: &str) -> Vec<String>;
}

/// Policy that never restricts sources
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSourceMapping;

impl SourceMappingPolicy for NoSourceMapping {
    fn configured_sources(&self, _package_id: &str) -> Vec<String> {
        Vec::new()
    }
}

/// Source name -> package id patterns
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct PackageSourceMapping {
    patterns: IndexMap<String, Vec<String>>,
}

impl PackageSourceMapping {
    pub fn new(patterns: IndexMap<String, Vec<String>>) -> Self {
        Self { patterns }
    }

    /// Whether any pattern is configured
    pub fn is_enabled(&self) -> bool {
        self.patterns.values().any(|patterns| !patterns.is_empty())
    }
}

impl SourceMappingPolicy for PackageSourceMapping {
    fn configured_sources(&self, package_id: &str) -> Vec<String> {
        let package_id = package_id.to_ascii_lowercase();
        let mut best_score = None;
        let mut sources: Vec<String> = Vec::new();

        for (source, patterns) in &self.patterns {
            let Some(score) = patterns
                .iter()
                .filter_map(|pattern| match_score(pattern, &package_id))
                .max()
            else {
                continue;
            };

            match best_score {
                Some(best) if score < best => {}
                Some(best) if score == best => {
                    if !sources.contains(source) {
                        sources.push(source.clone());
                    }
                }
                _ => {
                    best_score = Some(score);
                    sources = vec![source.clone()];
                }
            }
        }

        sources
    }
}

/// Specificity of a pattern match: exact ids beat any prefix, longer prefixes beat shorter ones
fn match_score(pattern: &str, package_id: &str) -> Option<usize> {
    let pattern = pattern.trim().to_ascii_lowercase();
    match pattern.strip_suffix('*') {
        Some(prefix) => package_id.starts_with(prefix).then_some(prefix.len()),
        None => (pattern == package_id).then_some(usize::MAX),
    }
}

/// Narrow the configured sources to those a package may be queried from
///
/// An empty mapping result means "use every configured source". A non-empty
/// result that names no configured source yields no sources at all; there is
/// no fallback to the unrestricted list.
pub fn effective_sources(
    package_id: &str,
    configured: &[PackageSource],
    policy: &dyn SourceMappingPolicy,
) -> Vec<PackageSource> {
    let restricted = policy.configured_sources(package_id);
    if restricted.is_empty() {
        return configured.to_vec();
    }

    configured
        .iter()
        .filter(|source| restricted.contains(&source.name))
        .cloned()
        .collect()
}
