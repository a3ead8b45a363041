// src/lib.rs

//! SkySniper flight search library

pub mod error;
pub mod models;
pub mod pipeline;
pub mod sources;
pub mod utils;
