//! Finds the versions of a dependency that are eligible upgrade targets
//!
//! Every effective source is queried independently and concurrently:
//! resolve the feed, check the package exists, list its versions, then
//! filter them. A source that cannot be resolved or fails a query is
//! skipped without affecting the others. Per-source outcomes are merged
//! after all queries finish, in configured source order.

use std::future::Future;

use futures::future::try_join_all;
use tracing::{debug, info, warn};

use crate::cancel::CancellationToken;
use crate::feed::client::{FeedClient, FeedQuery};
use crate::feed::error::FeedError;
use crate::feed::mapping::{SourceMappingPolicy, effective_sources};
use crate::feed::source::PackageSource;
use crate::version::error::FinderError;
use crate::version::filter::VersionFilter;
use crate::version::nuget::Version;
use crate::version::range::VersionRange;
use crate::version::result::VersionResult;
use crate::version::types::DependencyInfo;

/// Versions one source reported for the package
struct SourceVersions {
    source: PackageSource,
    has_current_version: bool,
    eligible: Vec<Version>,
}

/// Collect eligible upgrade versions for a dependency from every effective source
///
/// Fails only when the version constraint cannot be parsed or the token is
/// cancelled; feed failures skip the affected source.
pub async fn get_versions(
    dependency: &DependencyInfo,
    sources: &[PackageSource],
    mapping: &dyn SourceMappingPolicy,
    client: &dyn FeedClient,
    cancellation: &CancellationToken,
) -> Result<VersionResult, FinderError> {
    let range =
        VersionRange::parse(&dependency.version).map_err(|source| FinderError::InvalidConstraint {
            constraint: dependency.version.clone(),
            source,
        })?;
    let current_version = range.min_version();
    let query = FeedQuery {
        include_prerelease: current_version.is_prerelease(),
        include_unlisted: false,
    };
    let filter = VersionFilter::new(dependency, &range);

    let sources = effective_sources(&dependency.name, sources, mapping);
    debug!(
        "Resolving {} {} against {} source(s)",
        dependency.name,
        range,
        sources.len()
    );

    if cancellation.is_cancelled() {
        return Err(FinderError::Cancelled);
    }

    let futures = sources.iter().map(|source| {
        let filter = &filter;
        let current_version = &current_version;
        let query = &query;
        async move {
            let Some(versions) =
                fetch_source_versions(source, &dependency.name, query, client, cancellation)
                    .await?
            else {
                return Ok(None);
            };

            let has_current_version = versions.contains(current_version);
            let eligible: Vec<Version> = versions
                .into_iter()
                .filter(|v| filter.is_eligible(v))
                .collect();
            debug!(
                "{} eligible version(s) of {} on {}",
                eligible.len(),
                dependency.name,
                source.name
            );

            Ok::<_, FinderError>(Some(SourceVersions {
                source: source.clone(),
                has_current_version,
                eligible,
            }))
        }
    });
    let outcomes = try_join_all(futures).await?;

    let mut result = VersionResult::new(current_version);
    for outcome in outcomes.into_iter().flatten() {
        if outcome.has_current_version {
            result.add_current_version_source(outcome.source.clone());
        }
        result.add_range(outcome.source, outcome.eligible);
    }

    info!(
        "Found {} eligible version(s) of {} across {} source(s)",
        result.versions().len(),
        dependency.name,
        result.versions_by_source().len()
    );

    Ok(result)
}

/// Check whether any effective source lists exactly `version` of a package
pub async fn version_exists(
    package_id: &str,
    version: &Version,
    sources: &[PackageSource],
    mapping: &dyn SourceMappingPolicy,
    client: &dyn FeedClient,
    cancellation: &CancellationToken,
) -> Result<bool, FinderError> {
    let query = FeedQuery {
        include_prerelease: version.is_prerelease(),
        include_unlisted: false,
    };

    if cancellation.is_cancelled() {
        return Err(FinderError::Cancelled);
    }

    let sources = effective_sources(package_id, sources, mapping);
    let futures = sources.iter().map(|source| {
        let query = &query;
        async move {
            let versions =
                fetch_source_versions(source, package_id, query, client, cancellation).await?;
            Ok::<_, FinderError>(versions.is_some_and(|versions| versions.contains(version)))
        }
    });

    let found = try_join_all(futures).await?;
    Ok(found.into_iter().any(|found| found))
}

/// Resolve a source, check the package exists there and list its versions
///
/// Returns `Ok(None)` when the source has to be skipped.
async fn fetch_source_versions(
    source: &PackageSource,
    package_id: &str,
    query: &FeedQuery,
    client: &dyn FeedClient,
    cancellation: &CancellationToken,
) -> Result<Option<Vec<Version>>, FinderError> {
    let Some(feed) = cancellable(cancellation, client.resolve(source)).await? else {
        warn!("Skipping {}: feed metadata is unavailable", source.name);
        return Ok(None);
    };

    match cancellable(cancellation, feed.exists(package_id, query, cancellation)).await? {
        Ok(true) => {}
        Ok(false) => {
            debug!("Skipping {}: {} not found", source.name, package_id);
            return Ok(None);
        }
        Err(FeedError::Cancelled) => return Err(FinderError::Cancelled),
        Err(e) => {
            warn!(
                "Skipping {}: failed to check {} exists: {}",
                source.name, package_id, e
            );
            return Ok(None);
        }
    }

    match cancellable(cancellation, feed.get_versions(package_id, query, cancellation)).await? {
        Ok(versions) => Ok(Some(versions)),
        Err(FeedError::Cancelled) => Err(FinderError::Cancelled),
        Err(e) => {
            warn!(
                "Skipping {}: failed to fetch versions of {}: {}",
                source.name, package_id, e
            );
            Ok(None)
        }
    }
}

/// Run a feed call, giving up as soon as the token is cancelled
async fn cancellable<F: Future>(
    cancellation: &CancellationToken,
    future: F,
) -> Result<F::Output, FinderError> {
    tokio::select! {
        biased;
        _ = cancellation.cancelled() => Err(FinderError::Cancelled),
        output = future => Ok(output),
    }
}
