// src/pipeline/search.rs

//! Command entry points: search, monitor and source listing.

use tokio::sync::watch;

use crate::error::Result;
use crate::models::{Flight, MonitorEvent, SearchParams};
use crate::pipeline::aggregate::{Aggregator, SearchOutcome};
use crate::pipeline::monitor::{Monitor, MonitorReport};
use crate::sources::{IRR, SourceRegistry};
use crate::utils::format::{flights_table, format_price};
use crate::utils::log;
use crate::utils::url::get_domain;

/// Run one search and print the results.
///
/// With `json`, only the flight list is printed, as a JSON array.
pub async fn run_search(
    aggregator: &Aggregator,
    params: &SearchParams,
    filter: &[String],
    json: bool,
) -> Result<SearchOutcome> {
    log::header(&format!(
        "Searching {} → {} on {} for {} passenger(s)",
        params.origin,
        params.destination,
        params.date_str(),
        params.passenger_count()
    ));

    let outcome = aggregator.search(params, filter).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome.flights)?);
        return Ok(outcome);
    }

    for report in &outcome.sources {
        match &report.error {
            Some(error) => log::warn(&format!("{}: failed ({})", report.name, error)),
            None => log::sub_item(&format!("{}: {} flights", report.name, report.count)),
        }
    }

    let Some(cheapest) = outcome.cheapest() else {
        log::warn("No flights found");
        return Ok(outcome);
    };

    log::separator();
    log::line(flights_table(&outcome.flights, params).trim_end());
    log::separator();
    log::summary(
        "Cheapest",
        &[
            ("Flight", cheapest.to_string()),
            (
                "Price",
                format_price(cheapest.price, &cheapest.currency),
            ),
            ("Source", cheapest.source.clone()),
            ("Book", cheapest.deep_link.clone()),
        ],
    );
    log::success(&format!("Found {} flights", outcome.flights.len()));

    Ok(outcome)
}

/// Monitor prices until the target is reached or `shutdown` fires.
pub async fn run_monitor(
    aggregator: &Aggregator,
    monitor: &Monitor,
    params: &SearchParams,
    filter: &[String],
    shutdown: watch::Receiver<bool>,
) -> MonitorReport {
    log::header(&format!(
        "Monitoring {} → {} on {}",
        params.origin,
        params.destination,
        params.date_str()
    ));
    log::line("Press Ctrl+C to stop");

    let report = monitor
        .run(aggregator, params, filter, shutdown, |event| {
            log::event(event.at(), &describe(event));
        })
        .await;

    let mut items = vec![("Checks", report.ticks.to_string())];
    if let Some(best) = &report.best {
        items.push(("Lowest", format_price(best.price, &best.currency)));
        items.push(("Flight", best.to_string()));
        items.push(("Book", best.deep_link.clone()));
    }
    log::summary("Monitor", &items);
    if report.cancelled {
        log::line("Monitor stopped");
    }

    report
}

/// Print every registered source.
pub fn list_sources(registry: &SourceRegistry) {
    log::header("Available sources");
    for entry in registry.entries() {
        let domain = get_domain(&entry.website).unwrap_or_else(|| entry.website.clone());
        log::sub_item(&format!("{:<10} {:<16} {}", entry.name, domain, entry.website));
    }
}

/// One-line description of a monitor event.
pub fn describe(event: &MonitorEvent) -> String {
    match event {
        MonitorEvent::NoFlights { .. } => "No flights found".to_string(),
        MonitorEvent::FirstPrice { price, cheapest, .. } => {
            format!("Initial price: {} ({})", money(*price, cheapest), cheapest)
        }
        MonitorEvent::PriceDrop(change) => format!(
            "Price dropped: {} → {} (-{:.1}%)",
            format_price(change.previous, IRR),
            format_price(change.current, IRR),
            change.delta_percent
        ),
        MonitorEvent::NoChange { price, lowest, .. } => format!(
            "No drop: {} (lowest {})",
            format_price(*price, IRR),
            format_price(*lowest, IRR)
        ),
        MonitorEvent::TargetReached {
            price,
            target,
            cheapest,
            ..
        } => format!(
            "Target reached: {} ≤ {} | {}",
            money(*price, cheapest),
            money(*target, cheapest),
            cheapest.deep_link
        ),
    }
}

fn money(price: f64, flight: &Flight) -> String {
    format_price(price, &flight.currency)
}
