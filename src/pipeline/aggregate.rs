// src/pipeline/aggregate.rs

//! Concurrent fan-out over the selected sources.
//!
//! Every selected source runs in its own task with its own HTTP
//! session. A failing or panicking source contributes nothing and the
//! others are unaffected. Results are merged in registry order and
//! sorted by price.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDateTime;
use futures::future::join_all;

use crate::models::{CabinClass, Config, Flight, SearchParams};
use crate::sources::{SourceContext, SourceEntry, SourceRegistry, log_outcome};
use crate::utils::http::{Connector, HttpConnector};

/// What one source contributed to a search.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceReport {
    pub name: String,
    pub count: usize,
    /// Adapter-level failure, if the source contributed nothing because of it
    pub error: Option<String>,
}

/// Merged result of one search.
#[derive(Debug, Default)]
pub struct SearchOutcome {
    /// Sorted ascending by price
    pub flights: Vec<Flight>,
    /// One entry per selected source, in registry order
    pub sources: Vec<SourceReport>,
}

impl SearchOutcome {
    pub fn cheapest(&self) -> Option<&Flight> {
        self.flights.first()
    }

    pub fn failed(&self) -> impl Iterator<Item = &SourceReport> {
        self.sources.iter().filter(|s| s.error.is_some())
    }
}

/// Runs searches across the registered sources.
pub struct Aggregator {
    registry: SourceRegistry,
    connector: Arc<dyn Connector>,
    config: Arc<Config>,
}

impl Aggregator {
    pub fn new(registry: SourceRegistry, connector: Arc<dyn Connector>, config: Arc<Config>) -> Self {
        Self {
            registry,
            connector,
            config,
        }
    }

    /// Built-in sources over real HTTP sessions.
    pub fn from_config(config: Arc<Config>) -> Self {
        let connector = Arc::new(HttpConnector::new(config.http.clone()));
        Self::new(SourceRegistry::builtin(), connector, config)
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    /// Search and return the merged, price-sorted flights.
    pub async fn run(&self, params: &SearchParams, filter: &[String]) -> Vec<Flight> {
        self.search(params, filter).await.flights
    }

    /// Search and report per-source contributions alongside the flights.
    ///
    /// An empty `filter` falls back to `sources.enabled`, then to every source.
    pub async fn search(&self, params: &SearchParams, filter: &[String]) -> SearchOutcome {
        let filter = if filter.is_empty() {
            self.config.sources.enabled.as_slice()
        } else {
            filter
        };
        let entries = self.registry.select(filter);
        if entries.is_empty() {
            log::warn!("No sources selected for {:?}", filter);
            return SearchOutcome::default();
        }

        log::info!(
            "Searching {} → {} on {} across {} sources",
            params.origin,
            params.destination,
            params.date_str(),
            entries.len()
        );

        let tasks = entries.into_iter().map(|entry| {
            let entry = entry.clone();
            let connector = Arc::clone(&self.connector);
            let config = Arc::clone(&self.config);
            let params = params.clone();
            let name = entry.name.clone();
            let handle = tokio::spawn(async move {
                invoke(&entry, connector.as_ref(), config, &params).await
            });
            async move {
                handle.await.unwrap_or_else(|e| {
                    log::error!("[{}] Source task aborted: {}", name, e);
                    (failed(&name, format!("source task aborted: {e}")), Vec::new())
                })
            }
        });
        let results = join_all(tasks).await;

        let mut outcome = SearchOutcome::default();
        for (report, flights) in results {
            outcome.flights.extend(flights);
            outcome.sources.push(report);
        }

        // stable: equal prices keep registry order
        outcome.flights.sort_by(|a, b| a.price.total_cmp(&b.price));

        if self.config.aggregate.dedupe_across_sources {
            let before = outcome.flights.len();
            outcome.flights = dedupe(outcome.flights);
            log::debug!(
                "Collapsed {} cross-source duplicates",
                before - outcome.flights.len()
            );
        }

        outcome
    }
}

/// One source invocation, owning its session until it returns.
async fn invoke(
    entry: &SourceEntry,
    connector: &dyn Connector,
    config: Arc<Config>,
    params: &SearchParams,
) -> (SourceReport, Vec<Flight>) {
    let session = match connector.connect() {
        Ok(session) => session,
        Err(e) => {
            log::warn!("[{}] Could not open session: {}", entry.name, e);
            return (failed(&entry.name, e.to_string()), Vec::new());
        }
    };

    let source = entry.build(SourceContext { session, config });

    let result = source.fetch(params).await;
    log_outcome(&entry.name, &result);
    match result {
        Ok(flights) => {
            let report = SourceReport {
                name: entry.name.clone(),
                count: flights.len(),
                error: None,
            };
            (report, flights)
        }
        Err(e) => (failed(&entry.name, e.to_string()), Vec::new()),
    }
}

fn failed(name: &str, error: String) -> SourceReport {
    SourceReport {
        name: name.to_string(),
        count: 0,
        error: Some(error),
    }
}

type OfferKey = (String, String, NaiveDateTime, String, CabinClass, u64);

fn offer_key(flight: &Flight) -> OfferKey {
    (
        flight.origin.clone(),
        flight.destination.clone(),
        flight.departure_time,
        flight.flight_number.clone(),
        flight.cabin_class,
        flight.price.to_bits(),
    )
}

/// Keep the first offer for each physical offer key.
fn dedupe(flights: Vec<Flight>) -> Vec<Flight> {
    let mut seen = HashSet::new();
    flights
        .into_iter()
        .filter(|f| seen.insert(offer_key(f)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::testing::{BrokenSource, PanickingSource, SlowSource, StaticSource};
    use crate::utils::http::testing::StubConnector;
    use std::time::Duration;
    use tokio::time::Instant;

    fn registry() -> SourceRegistry {
        let mut registry = SourceRegistry::new();
        registry.register("first", "https://first.example", |_| {
            Box::new(StaticSource {
                name: "first".into(),
                prices: vec![300.0, 100.0],
            })
        });
        registry.register("broken", "https://broken.example", |_| {
            Box::new(BrokenSource)
        });
        registry.register("second", "https://second.example", |_| {
            Box::new(StaticSource {
                name: "second".into(),
                prices: vec![200.0, 100.0],
            })
        });
        registry
    }

    fn aggregator(config: Config) -> Aggregator {
        Aggregator::new(
            registry(),
            Arc::new(StubConnector { refuse: false }),
            Arc::new(config),
        )
    }

    fn params() -> SearchParams {
        SearchParams::parse("THR", "IST", "2025-01-15").unwrap()
    }

    #[tokio::test]
    async fn test_merges_sorted_by_price() {
        let flights = aggregator(Config::default()).run(&params(), &[]).await;

        let prices: Vec<f64> = flights.iter().map(|f| f.price).collect();
        assert_eq!(prices, vec![100.0, 100.0, 200.0, 300.0]);

        // ties keep registry order
        assert_eq!(flights[0].source, "first");
        assert_eq!(flights[1].source, "second");
    }

    #[tokio::test]
    async fn test_failing_source_is_isolated() {
        let outcome = aggregator(Config::default()).search(&params(), &[]).await;

        assert_eq!(outcome.flights.len(), 4);
        assert_eq!(outcome.sources.len(), 3);
        let failed: Vec<&str> = outcome.failed().map(|s| s.name.as_str()).collect();
        assert_eq!(failed, vec!["broken"]);
        assert_eq!(outcome.cheapest().map(|f| f.price), Some(100.0));
    }

    #[tokio::test]
    async fn test_filter_selects_sources() {
        let aggregator = aggregator(Config::default());
        let flights = aggregator.run(&params(), &["SECOND".to_string()]).await;
        assert_eq!(flights.len(), 2);
        assert!(flights.iter().all(|f| f.source == "second"));

        assert!(aggregator.run(&params(), &["nope".to_string()]).await.is_empty());
    }

    #[tokio::test]
    async fn test_enabled_sources_used_when_no_filter() {
        let mut config = Config::default();
        config.sources.enabled = vec!["first".to_string()];
        let flights = aggregator(config).run(&params(), &[]).await;
        assert_eq!(flights.len(), 2);
        assert!(flights.iter().all(|f| f.source == "first"));
    }

    #[tokio::test]
    async fn test_all_sources_failing_is_empty() {
        let aggregator = Aggregator::new(
            registry(),
            Arc::new(StubConnector { refuse: true }),
            Arc::new(Config::default()),
        );
        let outcome = aggregator.search(&params(), &[]).await;
        assert!(outcome.flights.is_empty());
        assert_eq!(outcome.failed().count(), 3);
    }

    #[tokio::test]
    async fn test_panicking_source_is_isolated() {
        let mut registry = registry();
        registry.register("panicking", "https://panicking.example", |_| {
            Box::new(PanickingSource)
        });
        let aggregator = Aggregator::new(
            registry,
            Arc::new(StubConnector { refuse: false }),
            Arc::new(Config::default()),
        );

        let outcome = aggregator.search(&params(), &[]).await;
        assert_eq!(outcome.flights.len(), 4);

        let names: Vec<&str> = outcome.sources.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["first", "broken", "second", "panicking"]);
        let failed: Vec<&str> = outcome.failed().map(|s| s.name.as_str()).collect();
        assert_eq!(failed, vec!["broken", "panicking"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sources_run_concurrently() {
        let mut registry = SourceRegistry::new();
        for (name, millis, price) in [("slow", 300, 10.0), ("fast", 100, 20.0), ("mid", 200, 30.0)] {
            registry.register(name, "https://slow.example", move |_| {
                Box::new(SlowSource {
                    name: name.to_string(),
                    delay: Duration::from_millis(millis),
                    price,
                })
            });
        }
        let aggregator = Aggregator::new(
            registry,
            Arc::new(StubConnector { refuse: false }),
            Arc::new(Config::default()),
        );

        let started = Instant::now();
        let flights = aggregator.run(&params(), &[]).await;
        let elapsed = started.elapsed();

        assert_eq!(flights.len(), 3);
        assert_eq!(flights[0].source, "slow");
        assert!(
            elapsed >= Duration::from_millis(300) && elapsed < Duration::from_millis(400),
            "took {elapsed:?}"
        );
    }

    #[tokio::test]
    async fn test_cross_source_duplicates_kept_by_default() {
        let flights = aggregator(Config::default()).run(&params(), &[]).await;
        assert_eq!(flights.iter().filter(|f| f.price == 100.0).count(), 2);
    }

    #[test]
    fn test_dedupe_keeps_first_offer() {
        use crate::models::sample_flight;

        let flights = vec![
            sample_flight("first", 100.0),
            sample_flight("second", 100.0),
            sample_flight("second", 200.0),
        ];
        let deduped = dedupe(flights);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].source, "first");
        assert_eq!(deduped[1].price, 200.0);
    }

    #[tokio::test]
    async fn test_dedupe_knob() {
        let mut config = Config::default();
        config.aggregate.dedupe_across_sources = true;
        let flights = aggregator(config).run(&params(), &[]).await;
        let prices: Vec<f64> = flights.iter().map(|f| f.price).collect();
        assert_eq!(prices, vec![100.0, 200.0, 300.0]);
        assert_eq!(flights[0].source, "first");
    }
}
