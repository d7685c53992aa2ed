// agrisense/core/soil/src/lib.rs

//! Location-based soil lookup.
//!
//! Combines SoilGrids texture and pH layers, an optional salinity point
//! service and an optional Bhuvan soil map into a single soil-type estimate
//! with a confidence figure. Lookups never fail on upstream errors; they
//! degrade to regional defaults instead.

pub mod classify;
pub mod config;
pub mod error;
pub mod metrics;
pub mod service;
pub mod types;

pub use config::SoilConfig;
pub use error::SoilError;
pub use service::{SoilDataService, SoilLookup};
pub use types::{LocationInfo, ReportLocation, SoilProperties, SoilReport};
