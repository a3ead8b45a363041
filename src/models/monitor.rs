//! Price monitor state and events.

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::models::Flight;

/// Price tracking state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub enum MonitorState {
    /// No price observed yet
    #[default]
    Initial,
    /// Have a running lowest price
    Tracking { lowest: f64 },
    /// Target met; no further ticks
    TargetReached { lowest: f64 },
}

impl MonitorState {
    pub fn lowest(&self) -> Option<f64> {
        match self {
            Self::Initial => None,
            Self::Tracking { lowest } | Self::TargetReached { lowest } => Some(*lowest),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::TargetReached { .. })
    }
}

/// A price movement between two ticks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceChange {
    pub at: DateTime<Local>,
    pub previous: f64,
    pub current: f64,
    /// `previous - current`
    pub delta: f64,
    /// Delta relative to `previous`, in percent
    pub delta_percent: f64,
}

impl PriceChange {
    pub fn new(at: DateTime<Local>, previous: f64, current: f64) -> Self {
        let delta = previous - current;
        let delta_percent = if previous > 0.0 {
            delta / previous * 100.0
        } else {
            0.0
        };
        Self {
            at,
            previous,
            current,
            delta,
            delta_percent,
        }
    }
}

/// Something the monitor observed during one tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum MonitorEvent {
    /// The search returned nothing (or every backend failed)
    NoFlights { at: DateTime<Local> },
    /// First price observed
    FirstPrice {
        at: DateTime<Local>,
        price: f64,
        cheapest: Box<Flight>,
    },
    /// Cheapest price dropped below the running lowest
    PriceDrop(PriceChange),
    /// Cheapest price is equal to or above the running lowest
    NoChange {
        at: DateTime<Local>,
        price: f64,
        lowest: f64,
    },
    /// Cheapest price is at or below the configured target
    TargetReached {
        at: DateTime<Local>,
        price: f64,
        target: f64,
        cheapest: Box<Flight>,
    },
}

impl MonitorEvent {
    pub fn at(&self) -> DateTime<Local> {
        match self {
            Self::NoFlights { at }
            | Self::FirstPrice { at, .. }
            | Self::NoChange { at, .. }
            | Self::TargetReached { at, .. } => *at,
            Self::PriceDrop(change) => change.at,
        }
    }
}
