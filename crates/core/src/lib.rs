//! Domain types and pure data-shaping logic for the AgriWatch client.
//!
//! Everything in this crate is I/O-free: wire models for the backend
//! API, polygon geometry helpers, vegetation-index categorisation, and
//! the fixed threshold mappings used to turn server-computed scores
//! into display labels. All actual remote-sensing computation happens
//! on the backend; this crate only shapes what comes back.

pub mod advanced;
pub mod analysis;
pub mod error;
pub mod farm;
pub mod geometry;
pub mod indices;
pub mod job;
pub mod timeseries;
pub mod types;
