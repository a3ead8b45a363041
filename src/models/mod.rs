// src/models/mod.rs

//! Domain models for the flight search engine.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod flight;
mod monitor;
mod search;

// Re-export all public types
pub use config::{
    AggregateConfig, Config, HttpConfig, MonitorConfig, PollingConfig, SourcesConfig,
};
pub use flight::{CabinClass, Flight};
pub use monitor::{MonitorEvent, MonitorState, PriceChange};
pub use search::SearchParams;

#[cfg(test)]
pub(crate) use flight::tests::sample_flight;
