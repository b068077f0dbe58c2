pub mod cancel;
pub mod config;
pub mod feed;
pub mod logging;
pub mod version;
