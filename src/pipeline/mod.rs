//! Pipeline entry points.
//!
//! - `aggregate`: concurrent fan-out over the selected sources
//! - `monitor`: repeated search with price-drop and target detection
//! - `search`: command entry points that print results

pub mod aggregate;
pub mod monitor;
pub mod search;

pub use aggregate::{Aggregator, SearchOutcome, SourceReport};
pub use monitor::{Monitor, MonitorReport, PriceTracker};
pub use search::{list_sources, run_monitor, run_search};
