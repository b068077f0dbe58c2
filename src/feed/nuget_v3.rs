//! NuGet v3 feed implementation
//!
//! Resolves a feed through its service index. Versions are listed from the
//! registration index (`RegistrationsBaseUrl`), which carries the listing
//! state of every version. Feeds that only publish a flat container
//! (`PackageBaseAddress/3.0.0`) are listed from it instead; every version
//! there counts as listed.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::cancel::CancellationToken;
use crate::config::HttpConfig;
use crate::feed::client::{FeedClient, FeedHandle, FeedQuery};
use crate::feed::error::FeedError;
use crate::feed::source::PackageSource;
use crate::version::nuget::Version;

/// Service index resource type of the flat container
const PACKAGE_BASE_ADDRESS: &str = "PackageBaseAddress/3.0.0";

/// Registration resource types, most preferred first
const REGISTRATIONS_BASE_URLS: &[&str] = &[
    "RegistrationsBaseUrl/3.6.0",
    "RegistrationsBaseUrl/3.4.0",
    "RegistrationsBaseUrl/3.0.0-rc",
    "RegistrationsBaseUrl/3.0.0-beta",
    "RegistrationsBaseUrl",
];

#[derive(Debug, Deserialize)]
struct ServiceIndex {
    resources: Vec<ServiceResource>,
}

#[derive(Debug, Deserialize)]
struct ServiceResource {
    #[serde(rename = "@id")]
    id: String,
    #[serde(rename = "@type")]
    resource_type: String,
}

/// Response of `{flat}/{id}/index.json`
#[derive(Debug, Deserialize)]
struct FlatContainerIndex {
    versions: Vec<String>,
}

/// Response of `{registration}/{id}/index.json`
#[derive(Debug, Deserialize)]
struct RegistrationIndex {
    #[serde(default)]
    items: Vec<RegistrationPage>,
}

/// A page of the registration index; large packages leave `items` out and
/// have to be fetched from `@id`
#[derive(Debug, Deserialize)]
struct RegistrationPage {
    #[serde(rename = "@id")]
    id: String,
    items: Option<Vec<RegistrationLeaf>>,
}

#[derive(Debug, Deserialize)]
struct RegistrationPageContent {
    #[serde(default)]
    items: Vec<RegistrationLeaf>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegistrationLeaf {
    catalog_entry: CatalogEntry,
}

#[derive(Debug, Deserialize)]
struct CatalogEntry {
    version: String,
    /// Missing means listed
    listed: Option<bool>,
}

/// Where a feed lists package versions from
#[derive(Debug, Clone, PartialEq, Eq)]
enum VersionListing {
    Registration(String),
    FlatContainer(String),
}

impl VersionListing {
    fn from_service_index(index: ServiceIndex) -> Option<Self> {
        let find = |resource_type: &str| -> Option<String> {
            index
                .resources
                .iter()
                .find(|resource| resource.resource_type == resource_type)
                .map(|resource| resource.id.clone())
        };

        REGISTRATIONS_BASE_URLS
            .iter()
            .find_map(|&resource_type| find(resource_type))
            .map(VersionListing::Registration)
            .or_else(|| find(PACKAGE_BASE_ADDRESS).map(VersionListing::FlatContainer))
    }
}

/// One version of a package as the feed reports it
#[derive(Debug, Clone)]
struct PackageEntry {
    version: Version,
    listed: bool,
}

/// Resolves configured sources into NuGet v3 feeds
pub struct NuGetV3FeedClient {
    client: reqwest::Client,
}

impl NuGetV3FeedClient {
    pub fn new(http: &HttpConfig) -> Result<Self, FeedError> {
        let client = reqwest::Client::builder()
            .user_agent(http.user_agent.as_str())
            .timeout(Duration::from_millis(http.timeout_ms))
            .build()?;
        Ok(Self { client })
    }

    async fn fetch_listing(&self, source: &PackageSource) -> Result<VersionListing, FeedError> {
        let index: ServiceIndex = get_json(&self.client, &source.uri)
            .await?
            .ok_or_else(|| FeedError::InvalidResponse("Service index not found".to_string()))?;

        VersionListing::from_service_index(index).ok_or_else(|| {
            FeedError::ResourceNotFound(format!(
                "{} or {}",
                REGISTRATIONS_BASE_URLS[0], PACKAGE_BASE_ADDRESS
            ))
        })
    }
}

#[async_trait::async_trait]
impl FeedClient for NuGetV3FeedClient {
    async fn resolve(&self, source: &PackageSource) -> Option<Arc<dyn FeedHandle>> {
        match self.fetch_listing(source).await {
            Ok(listing) => {
                debug!("Resolved {} to {:?}", source.name, listing);
                Some(Arc::new(NuGetV3Feed::with_listing(
                    self.client.clone(),
                    listing,
                )))
            }
            Err(e) => {
                warn!(
                    "Failed to get version listing resource for {}: {}",
                    source.uri, e
                );
                None
            }
        }
    }
}

/// A NuGet v3 feed
///
/// Package listings are downloaded once per feed and shared by `exists` and
/// `get_versions`, so a resolution fetches each package index a single time.
pub struct NuGetV3Feed {
    client: reqwest::Client,
    listing: VersionListing,
    entries: Mutex<HashMap<String, Arc<Vec<PackageEntry>>>>,
}

impl NuGetV3Feed {
    /// Feed listing versions from a registration base URL
    pub fn registration(client: reqwest::Client, base_url: &str) -> Self {
        Self::with_listing(client, VersionListing::Registration(base_url.to_string()))
    }

    /// Feed listing versions from a flat container base address
    pub fn flat_container(client: reqwest::Client, base_address: &str) -> Self {
        Self::with_listing(
            client,
            VersionListing::FlatContainer(base_address.to_string()),
        )
    }

    fn with_listing(client: reqwest::Client, listing: VersionListing) -> Self {
        let listing = match listing {
            VersionListing::Registration(url) => {
                VersionListing::Registration(url.trim_end_matches('/').to_string())
            }
            VersionListing::FlatContainer(url) => {
                VersionListing::FlatContainer(url.trim_end_matches('/').to_string())
            }
        };
        Self {
            client,
            listing,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Every parseable version of the package, lowest first, racing the token
    async fn entries(
        &self,
        package_id: &str,
        cancellation: &CancellationToken,
    ) -> Result<Arc<Vec<PackageEntry>>, FeedError> {
        let key = package_id.to_lowercase();
        if let Some(entries) = self.entries.lock().await.get(&key) {
            return Ok(entries.clone());
        }

        let entries = tokio::select! {
            biased;
            _ = cancellation.cancelled() => return Err(FeedError::Cancelled),
            result = self.fetch_entries(&key) => Arc::new(result?),
        };

        self.entries.lock().await.insert(key, entries.clone());
        Ok(entries)
    }

    async fn fetch_entries(&self, package_id: &str) -> Result<Vec<PackageEntry>, FeedError> {
        let mut entries = match &self.listing {
            VersionListing::Registration(base) => {
                self.fetch_registration(base, package_id).await?
            }
            VersionListing::FlatContainer(base) => {
                self.fetch_flat_container(base, package_id).await?
            }
        };
        entries.sort_by(|a, b| a.version.cmp(&b.version));
        Ok(entries)
    }

    async fn fetch_flat_container(
        &self,
        base: &str,
        package_id: &str,
    ) -> Result<Vec<PackageEntry>, FeedError> {
        let url = format!("{}/{}/index.json", base, package_id);
        let Some(index) = get_json::<FlatContainerIndex>(&self.client, &url).await? else {
            return Ok(Vec::new());
        };

        Ok(index
            .versions
            .iter()
            .filter_map(|v| Version::parse(v).ok())
            .map(|version| PackageEntry {
                version,
                listed: true,
            })
            .collect())
    }

    async fn fetch_registration(
        &self,
        base: &str,
        package_id: &str,
    ) -> Result<Vec<PackageEntry>, FeedError> {
        let url = format!("{}/{}/index.json", base, package_id);
        let Some(index) = get_json::<RegistrationIndex>(&self.client, &url).await? else {
            return Ok(Vec::new());
        };

        let mut entries = Vec::new();
        for page in index.items {
            let leaves = match page.items {
                Some(leaves) => leaves,
                None => get_json::<RegistrationPageContent>(&self.client, &page.id)
                    .await?
                    .ok_or_else(|| {
                        FeedError::InvalidResponse(format!("Registration page not found: {}", page.id))
                    })?
                    .items,
            };

            entries.extend(leaves.into_iter().filter_map(|leaf| {
                let version = Version::parse(&leaf.catalog_entry.version).ok()?;
                Some(PackageEntry {
                    version,
                    listed: leaf.catalog_entry.listed.unwrap_or(true),
                })
            }));
        }

        Ok(entries)
    }
}

#[async_trait::async_trait]
impl FeedHandle for NuGetV3Feed {
    async fn exists(
        &self,
        package_id: &str,
        query: &FeedQuery,
        cancellation: &CancellationToken,
    ) -> Result<bool, FeedError> {
        let entries = self.entries(package_id, cancellation).await?;
        Ok(entries.iter().any(|entry| is_visible(entry, query)))
    }

    async fn get_versions(
        &self,
        package_id: &str,
        query: &FeedQuery,
        cancellation: &CancellationToken,
    ) -> Result<Vec<Version>, FeedError> {
        let entries = self.entries(package_id, cancellation).await?;
        Ok(entries
            .iter()
            .filter(|entry| is_visible(entry, query))
            .map(|entry| entry.version.clone())
            .collect())
    }
}

fn is_visible(entry: &PackageEntry, query: &FeedQuery) -> bool {
    (query.include_prerelease || !entry.version.is_prerelease())
        && (query.include_unlisted || entry.listed)
}

/// GET a JSON document; `Ok(None)` on 404
async fn get_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
) -> Result<Option<T>, FeedError> {
    let response = client.get(url).send().await?;

    let status = response.status();
    if status == reqwest::StatusCode::NOT_FOUND {
        return Ok(None);
    }
    if !status.is_success() {
        warn!("NuGet feed returned status {}: {}", status, url);
        return Err(FeedError::InvalidResponse(format!(
            "Unexpected status: {}",
            status
        )));
    }

    let body = response.json().await.map_err(|e| {
        warn!("Failed to parse response from {}: {}", url, e);
        FeedError::InvalidResponse(e.to_string())
    })?;

    Ok(Some(body))
}
