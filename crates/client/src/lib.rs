//! Typed asynchronous client for the AgriWatch backend API.
//!
//! Provides the HTTP request wrapper with uniform error normalization,
//! typed endpoint methods for farms, analysis jobs, advanced analysis,
//! and index queries, an explicit query cache with TTL staleness and
//! mutation-driven invalidation, and the job-status polling engine for
//! long-running analysis jobs.

pub mod advanced;
pub mod analysis;
pub mod cache;
pub mod config;
pub mod error;
pub mod farms;
pub mod http;
pub mod indices;
pub mod poller;

pub use cache::QueryCache;
pub use config::ClientConfig;
pub use error::ApiClientError;
pub use http::ApiClient;
pub use poller::{JobWatcher, PollConfig, PollState};
