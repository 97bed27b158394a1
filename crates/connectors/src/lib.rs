//! Tally - Connectors
//!
//! Pull-based connectors that fetch data from external sources and produce
//! canonical records for the merge engine.
//!
//! # Available Connectors
//!
//! - **GitHub** - repository activity (commits, issues, pull requests) via
//!   the GraphQL API, fetched incrementally above a per-kind watermark
//! - **ADS** - citation counts for publications, one snapshot per run
//!
//! # Design Principles
//!
//! - **Pull-based**: connectors fetch on demand, driven by the pipeline
//! - **Incremental**: activity fetches are constrained to the caller's
//!   watermark; connectors never advance watermarks themselves
//! - **Resilient**: all paging goes through the rate-limited [`Paginator`],
//!   which suspends on quota, retries transient failures with backoff, and
//!   caps runaway sources
//! - **Deterministic in tests**: time is injected through [`Clock`]
//!
//! # Feature Flags
//!
//! Connectors can be selectively compiled:
//!
//! ```toml
//! [dependencies]
//! tally-connectors = { version = "0.1", default-features = false, features = ["github"] }
//! ```

pub mod clock;
pub mod config;
mod error;
mod http;
pub mod pagination;
mod traits;

// Conditionally compiled connectors
#[cfg(feature = "ads")]
mod ads;
#[cfg(feature = "github")]
mod github;

// Re-exports
pub use clock::{Clock, SystemClock};
pub use error::ConnectorError;
pub use pagination::{Cursor, Page, PageFetcher, Paginator, PaginatorConfig, RateLimitInfo};
pub use traits::{ActivitySource, CitationSource};

#[cfg(feature = "ads")]
pub use ads::Ads;
#[cfg(feature = "ads")]
pub use config::AdsConnectorConfig;
#[cfg(feature = "github")]
pub use config::GitHubConnectorConfig;
#[cfg(feature = "github")]
pub use github::GitHub;

/// List of available connector types (compiled in)
pub fn available_connectors() -> &'static [&'static str] {
    &[
        #[cfg(feature = "github")]
        "github",
        #[cfg(feature = "ads")]
        "ads",
    ]
}
