//! Feed test utilities

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use version_finder::cancel::CancellationToken;
use version_finder::feed::client::{FeedClient, FeedHandle, FeedQuery};
use version_finder::feed::error::FeedError;
use version_finder::feed::source::PackageSource;
use version_finder::version::nuget::Version;

/// Feed serving fixed version lists
#[derive(Default)]
pub struct InMemoryFeed {
    versions: HashMap<String, Vec<Version>>,
}

impl InMemoryFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_versions(mut self, package_id: &str, versions: Vec<&str>) -> Self {
        self.versions.insert(
            package_id.to_lowercase(),
            versions
                .into_iter()
                .map(|v| Version::parse(v).unwrap())
                .collect(),
        );
        self
    }

    fn visible(&self, package_id: &str, query: &FeedQuery) -> Vec<Version> {
        self.versions
            .get(&package_id.to_lowercase())
            .map(|versions| {
                versions
                    .iter()
                    .filter(|v| query.include_prerelease || !v.is_prerelease())
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl FeedHandle for InMemoryFeed {
    async fn exists(
        &self,
        package_id: &str,
        query: &FeedQuery,
        _cancellation: &CancellationToken,
    ) -> Result<bool, FeedError> {
        Ok(!self.visible(package_id, query).is_empty())
    }

    async fn get_versions(
        &self,
        package_id: &str,
        query: &FeedQuery,
        _cancellation: &CancellationToken,
    ) -> Result<Vec<Version>, FeedError> {
        Ok(self.visible(package_id, query))
    }
}

/// Feed answering like `inner` after a fixed delay
pub struct DelayedFeed<F> {
    inner: F,
    delay: Duration,
}

impl<F> DelayedFeed<F> {
    pub fn new(inner: F, delay: Duration) -> Self {
        Self { inner, delay }
    }
}

#[async_trait]
impl<F: FeedHandle> FeedHandle for DelayedFeed<F> {
    async fn exists(
        &self,
        package_id: &str,
        query: &FeedQuery,
        cancellation: &CancellationToken,
    ) -> Result<bool, FeedError> {
        tokio::time::sleep(self.delay).await;
        self.inner.exists(package_id, query, cancellation).await
    }

    async fn get_versions(
        &self,
        package_id: &str,
        query: &FeedQuery,
        cancellation: &CancellationToken,
    ) -> Result<Vec<Version>, FeedError> {
        tokio::time::sleep(self.delay).await;
        self.inner.get_versions(package_id, query, cancellation).await
    }
}

/// Feed whose queries never complete
pub struct PendingFeed;

#[async_trait]
impl FeedHandle for PendingFeed {
    async fn exists(
        &self,
        _package_id: &str,
        _query: &FeedQuery,
        _cancellation: &CancellationToken,
    ) -> Result<bool, FeedError> {
        std::future::pending().await
    }

    async fn get_versions(
        &self,
        _package_id: &str,
        _query: &FeedQuery,
        _cancellation: &CancellationToken,
    ) -> Result<Vec<Version>, FeedError> {
        std::future::pending().await
    }
}

/// Client resolving sources by name; unknown sources are unavailable
#[derive(Default)]
pub struct TestFeedClient {
    feeds: HashMap<String, Arc<dyn FeedHandle>>,
    resolved: AtomicUsize,
}

impl TestFeedClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_feed(mut self, source_name: &str, feed: impl FeedHandle + 'static) -> Self {
        self.feeds.insert(source_name.to_string(), Arc::new(feed));
        self
    }

    /// Number of `resolve` calls made so far
    pub fn resolved(&self) -> usize {
        self.resolved.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FeedClient for TestFeedClient {
    async fn resolve(&self, source: &PackageSource) -> Option<Arc<dyn FeedHandle>> {
        self.resolved.fetch_add(1, Ordering::SeqCst);
        self.feeds.get(&source.name).cloned()
    }
}

/// A source named `name` with a dummy service index URI
pub fn source(name: &str) -> PackageSource {
    PackageSource::new(name, &format!("https://{}.example/v3/index.json", name))
}

pub fn version(s: &str) -> Version {
    Version::parse(s).unwrap()
}

/// Versions as normalized strings, lowest first
pub fn version_strings<'a>(versions: impl IntoIterator<Item = &'a Version>) -> Vec<String> {
    versions.into_iter().map(|v| v.to_string()).collect()
}
