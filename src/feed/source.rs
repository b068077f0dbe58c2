//! Configured package feeds

use serde::{Deserialize, Serialize};

/// Default public NuGet feed
pub const NUGET_ORG_NAME: &str = "nuget.org";
pub const NUGET_ORG_URI: &str = "https://api.nuget.org/v3/index.json";

/// A named package feed
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackageSource {
    pub name: String,
    /// Service index URL of the feed
    pub uri: String,
}

impl PackageSource {
    pub fn new(name: &str, uri: &str) -> Self {
        Self {
            name: name.to_string(),
            uri: uri.to_string(),
        }
    }

    pub fn nuget_org() -> Self {
        Self::new(NUGET_ORG_NAME, NUGET_ORG_URI)
    }
}
