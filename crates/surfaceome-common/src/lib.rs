//! Surfaceome Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared building blocks for the surfaceome workspace.
//!
//! - **Caching**: a bounded, single-flight get-or-compute cache used to
//!   memoize remote protein lookups
//! - **Logging**: `tracing` subscriber setup driven by [`logging::LogConfig`]

pub mod cache;
pub mod logging;

// Re-export commonly used types
pub use cache::{CacheStats, SingleFlightCache};
