//! Version model and upgrade resolution
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │    Range    │────▶│   Filter    │◀────│ Requirement │
//! │  (parse)    │     │ (eligible?) │     │(ignore/vuln)│
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                            │
//!                            ▼
//! ┌─────────────┐     ┌─────────────┐
//! │    Feeds    │────▶│   Finder    │────▶ VersionResult
//! └─────────────┘     └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`nuget`]: NuGet version type and ordering
//! - [`range`]: Version ranges and floating versions
//! - [`requirement`]: Comparison requirements used by ignore and advisory rules
//! - [`vulnerability`]: Security advisories
//! - [`types`]: The dependency being resolved
//! - [`filter`]: Upgrade eligibility filter
//! - [`finder`]: Concurrent per-source resolution
//! - [`result`]: Versions grouped by source
//! - [`error`]: Error types for parsing and resolution

pub mod error;
pub mod filter;
pub mod finder;
pub mod nuget;
pub mod range;
pub mod requirement;
pub mod result;
pub mod types;
pub mod vulnerability;
