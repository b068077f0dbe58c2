//! Feed traits for checking package existence and listing versions

use std::sync::Arc;

#[cfg(test)]
use mockall::automock;

use crate::cancel::CancellationToken;
use crate::feed::error::FeedError;
use crate::feed::source::PackageSource;
use crate::version::nuget::Version;

/// Flags sent with every feed query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeedQuery {
    pub include_prerelease: bool,
    pub include_unlisted: bool,
}

/// A resolved feed that can answer metadata queries for packages
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait FeedHandle: Send + Sync {
    /// Whether the feed has any version of the package visible under `query`
    async fn exists(
        &self,
        package_id: &str,
        query: &FeedQuery,
        cancellation: &CancellationToken,
    ) -> Result<bool, FeedError>;

    /// All versions of the package visible under `query`
    async fn get_versions(
        &self,
        package_id: &str,
        query: &FeedQuery,
        cancellation: &CancellationToken,
    ) -> Result<Vec<Version>, FeedError>;
}

/// Turns a configured source into a queryable feed
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait FeedClient: Send + Sync {
    /// Returns `None` when the feed's metadata resource is unavailable
    async fn resolve(&self, source: &PackageSource) -> Option<Arc<dyn FeedHandle>>;
}
