//! Package feed access
//!
//! # Modules
//!
//! - [`source`]: Configured package sources
//! - [`mapping`]: Package source mapping and effective source selection
//! - [`client`]: Feed traits used by the finder
//! - [`nuget_v3`]: NuGet v3 HTTP implementation of the feed traits
//! - [`error`]: Feed error type

pub mod client;
pub mod error;
pub mod mapping;
pub mod nuget_v3;
pub mod source;
