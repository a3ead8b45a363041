// src/pipeline/monitor.rs

//! Repeated search with price-drop and target detection.
//!
//! ```text
//! Initial ──first price──▶ Tracking { lowest } ──price ≤ target──▶ TargetReached
//!                              │    ▲
//!                              └────┘ lower price updates `lowest`
//! ```

use std::time::Duration;

use chrono::{DateTime, Local};
use tokio::sync::watch;

use crate::models::{Flight, MonitorEvent, MonitorState, PriceChange, SearchParams};
use crate::pipeline::aggregate::Aggregator;

/// Folds successive search results into monitor events.
#[derive(Debug, Clone, Default)]
pub struct PriceTracker {
    state: MonitorState,
    target: Option<f64>,
    best: Option<Flight>,
}

impl PriceTracker {
    pub fn new(target: Option<f64>) -> Self {
        Self {
            target,
            ..Self::default()
        }
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    /// Cheapest offer seen so far.
    pub fn best(&self) -> Option<&Flight> {
        self.best.as_ref()
    }

    /// Record one tick's flights and return what changed.
    pub fn observe(&mut self, flights: &[Flight], at: DateTime<Local>) -> Vec<MonitorEvent> {
        if self.state.is_terminal() {
            return Vec::new();
        }

        let Some(cheapest) = flights.iter().min_by(|a, b| a.price.total_cmp(&b.price)) else {
            return vec![MonitorEvent::NoFlights { at }];
        };
        let price = cheapest.price;

        let mut events = Vec::with_capacity(2);
        match self.state.lowest() {
            None => {
                events.push(MonitorEvent::FirstPrice {
                    at,
                    price,
                    cheapest: Box::new(cheapest.clone()),
                });
                self.track(cheapest);
            }
            Some(lowest) if price < lowest => {
                events.push(MonitorEvent::PriceDrop(PriceChange::new(at, lowest, price)));
                self.track(cheapest);
            }
            Some(lowest) => events.push(MonitorEvent::NoChange { at, price, lowest }),
        }

        if let Some(target) = self.target.filter(|t| price <= *t) {
            events.push(MonitorEvent::TargetReached {
                at,
                price,
                target,
                cheapest: Box::new(cheapest.clone()),
            });
            let lowest = self.state.lowest().unwrap_or(price);
            self.state = MonitorState::TargetReached { lowest };
        }

        events
    }

    fn track(&mut self, cheapest: &Flight) {
        self.state = MonitorState::Tracking {
            lowest: cheapest.price,
        };
        self.best = Some(cheapest.clone());
    }
}

/// How a monitor run ended.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorReport {
    pub ticks: u64,
    pub lowest: Option<f64>,
    pub best: Option<Flight>,
    pub target_reached: bool,
    pub cancelled: bool,
}

/// Periodic search loop.
#[derive(Debug, Clone)]
pub struct Monitor {
    interval: Duration,
    target: Option<f64>,
}

impl Monitor {
    pub fn new(interval: Duration, target: Option<f64>) -> Self {
        Self { interval, target }
    }

    /// Search every `interval` until the target is met or `shutdown` turns true.
    ///
    /// The wait between ticks is interrupted by the shutdown signal; a tick
    /// already in flight runs to completion, and no tick starts afterwards.
    pub async fn run<F>(
        &self,
        aggregator: &Aggregator,
        params: &SearchParams,
        filter: &[String],
        mut shutdown: watch::Receiver<bool>,
        mut on_event: F,
    ) -> MonitorReport
    where
        F: FnMut(&MonitorEvent),
    {
        let mut tracker = PriceTracker::new(self.target);
        let mut ticks = 0;
        let mut cancelled = false;

        loop {
            if *shutdown.borrow() {
                cancelled = true;
                break;
            }

            let flights = aggregator.run(params, filter).await;
            ticks += 1;
            log::debug!("Monitor tick {} saw {} flights", ticks, flights.len());

            for event in tracker.observe(&flights, Local::now()) {
                on_event(&event);
            }
            if tracker.state().is_terminal() {
                break;
            }

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = shutdown_requested(&mut shutdown) => {
                    cancelled = true;
                    break;
                }
            }
        }

        MonitorReport {
            ticks,
            lowest: tracker.state().lowest(),
            best: tracker.best().cloned(),
            target_reached: tracker.state().is_terminal(),
            cancelled,
        }
    }
}

/// Resolves once the flag is set; never resolves if the sender is gone.
async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow_and_update() {
            return;
        }
        if shutdown.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
