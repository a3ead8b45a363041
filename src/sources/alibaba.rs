// src/sources/alibaba.rs

//! Alibaba (alibaba.ir) adapter.
//!
//! International search is a two-phase poll: a POST creates a proposal
//! request, then the status endpoint is polled until the server reports
//! completion. Domestic search is a single POST.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Local, NaiveDateTime};
use serde::Deserialize;
use serde_json::{Value, json};

use super::decode::{self, opt_bool, opt_count, opt_f64, opt_string};
use super::{FlightSource, IRR, SourceContext};
use crate::error::{AppError, Result};
use crate::models::{CabinClass, Config, Flight, PollingConfig, SearchParams};
use crate::utils::http::{HttpRequest, HttpTransport, fetch_json};
use crate::utils::url::with_query;
use crate::utils::{city_code, parse_timestamp};

pub(super) const NAME: &str = "alibaba";
pub(super) const WEBSITE: &str = "https://www.alibaba.ir";

const API_BASE: &str = "https://ws.alibaba.ir/api/v1/flights";
const AB_CHANNEL: &str =
    "WEB-NEW,PRODUCTION,CSR,www.alibaba.ir,desktop,Chrome,120.0.0.0,N,N,Mac OS,10.15.7,3.221.4";

/// Every response is wrapped in `{"result": ...}`.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProposalRequest {
    #[serde(default, deserialize_with = "opt_string")]
    request_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PollResult {
    #[serde(default)]
    proposals: Option<Vec<Value>>,
    #[serde(default, deserialize_with = "opt_bool")]
    is_completed: Option<bool>,
    /// Server-suggested wait before the next poll, in milliseconds
    #[serde(default, deserialize_with = "opt_f64")]
    next_request_threshold: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct DomesticResult {
    #[serde(default)]
    departing: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Proposal {
    #[serde(default, deserialize_with = "opt_f64")]
    total: Option<f64>,
    #[serde(default, deserialize_with = "opt_count")]
    seat: Option<u32>,
    #[serde(default, deserialize_with = "opt_bool")]
    is_refundable: Option<bool>,
    #[serde(default)]
    leaving_flight_group: Option<FlightGroup>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FlightGroup {
    #[serde(default, deserialize_with = "opt_string")]
    origin: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    destination: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    departure_date_time: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    arrival_date_time: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    airline_name: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    cabin_type_name: Option<String>,
    #[serde(default, deserialize_with = "opt_count")]
    number_of_stop: Option<u32>,
    #[serde(default, deserialize_with = "opt_count")]
    duration_min: Option<u32>,
    #[serde(default)]
    flight_details: Option<Vec<Segment>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Segment {
    #[serde(default, deserialize_with = "opt_string")]
    marketing_carrier: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    flight_number: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DomesticFlight {
    #[serde(default, deserialize_with = "opt_string")]
    origin: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    destination: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    departure_date_time: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    arrival_date_time: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    airline_name: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    flight_number: Option<String>,
    #[serde(default, deserialize_with = "opt_f64")]
    adult_price: Option<f64>,
    #[serde(default, deserialize_with = "opt_f64")]
    price: Option<f64>,
    #[serde(default, deserialize_with = "opt_string")]
    cabin_type: Option<String>,
    #[serde(default, deserialize_with = "opt_count")]
    flight_duration: Option<u32>,
}

/// Adapter for alibaba.ir.
pub struct AlibabaSource {
    session: Box<dyn HttpTransport>,
    config: Arc<Config>,
    api_base: String,
}

impl AlibabaSource {
    pub fn new(ctx: SourceContext) -> Self {
        let api_base = ctx.config.sources.endpoint(NAME, API_BASE);
        Self {
            session: ctx.session,
            config: ctx.config,
            api_base,
        }
    }

    fn proposals_url(&self) -> String {
        format!("{}/international/proposal-requests", self.api_base)
    }

    fn headers(&self) -> [(&'static str, String); 5] {
        [
            ("Accept", "application/json, text/plain, */*".to_string()),
            ("Content-Type", "application/json".to_string()),
            ("Origin", WEBSITE.to_string()),
            ("Referer", format!("{WEBSITE}/")),
            ("ab-channel", AB_CHANNEL.to_string()),
        ]
    }

    async fn search_international(&self, params: &SearchParams) -> Result<Vec<Flight>> {
        let payload = json!({
            "origin": city_code(&params.origin),
            "destination": city_code(&params.destination),
            "departureDate": params.date_str(),
            "adult": params.adults,
            "child": params.children,
            "infant": params.infants,
            "flightClass": params.cabin_class.as_str(),
            "userVariant": null,
            "isReIssueRequest": false,
        });

        let request = HttpRequest::post_json(self.proposals_url(), payload).headers(self.headers());
        let created: Envelope<ProposalRequest> = fetch_json(self.session.as_ref(), request).await?;

        let request_id = created
            .result
            .and_then(|r| r.request_id)
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| AppError::protocol(NAME, "No requestId in response"))?;

        log::debug!("[{}] Proposal request {}", NAME, request_id);
        self.poll(&request_id, params).await
    }

    /// Poll the proposal request until it completes or attempts run out.
    async fn poll(&self, request_id: &str, params: &SearchParams) -> Result<Vec<Flight>> {
        let url = format!("{}/{}", self.proposals_url(), request_id);
        let deep_link = deep_link(params)?;
        let now = Local::now().naive_local();
        let polling = &self.config.polling;

        let mut flights: Vec<Flight> = Vec::new();
        for attempt in 1..=polling.max_attempts {
            let request = HttpRequest::get(&url).headers(self.headers());
            let envelope: Envelope<PollResult> = fetch_json(self.session.as_ref(), request).await?;
            let result = envelope.result.unwrap_or_default();

            let proposals = result.proposals.unwrap_or_default();
            let parsed = decode::each(NAME, "proposal", &proposals, |p| {
                parse_proposal(p, params, &deep_link, now)
            });
            for flight in parsed {
                if !flights.contains(&flight) {
                    flights.push(flight);
                }
            }

            if result.is_completed.unwrap_or(false) {
                log::debug!("[{}] Completed after {} polls", NAME, attempt);
                break;
            }
            if attempt == polling.max_attempts {
                log::warn!(
                    "[{}] Request {} still incomplete after {} polls",
                    NAME,
                    request_id,
                    attempt
                );
                break;
            }

            tokio::time::sleep(poll_wait(result.next_request_threshold, polling)).await;
        }

        Ok(flights)
    }

    async fn search_domestic(&self, params: &SearchParams) -> Result<Vec<Flight>> {
        let payload = json!({
            "origin": params.origin,
            "destination": params.destination,
            "departureDate": params.date_str(),
            "adult": params.adults,
            "child": params.children,
            "infant": params.infants,
        });

        let url = format!("{}/domestic/available", self.api_base);
        let request = HttpRequest::post_json(url, payload).headers(self.headers());
        let envelope: Envelope<DomesticResult> = fetch_json(self.session.as_ref(), request).await?;

        let departing = envelope
            .result
            .and_then(|r| r.departing)
            .unwrap_or_default();
        let deep_link = deep_link(params)?;
        let now = Local::now().naive_local();

        Ok(decode::each(NAME, "domestic flight", &departing, |item| {
            parse_domestic(item, params, &deep_link, now)
        }))
    }
}

#[async_trait]
impl FlightSource for AlibabaSource {
    fn name(&self) -> &str {
        NAME
    }

    async fn fetch(&self, params: &SearchParams) -> Result<Vec<Flight>> {
        if params.domestic {
            self.search_domestic(params).await
        } else {
            self.search_international(params).await
        }
    }
}

/// Server-suggested wait, capped at `max_interval_ms`.
fn poll_wait(threshold_ms: Option<f64>, polling: &PollingConfig) -> Duration {
    let wait_ms = threshold_ms
        .filter(|ms| ms.is_finite() && *ms >= 0.0)
        .map(|ms| ms.min(polling.max_interval_ms as f64) as u64)
        .unwrap_or(polling.default_interval_ms);
    Duration::from_millis(wait_ms.min(polling.max_interval_ms))
}

fn deep_link(params: &SearchParams) -> Result<String> {
    with_query(
        WEBSITE,
        &format!("/flights/{}-{}", params.origin, params.destination),
        &[
            ("departing", params.date_str()),
            ("adult", params.adults.to_string()),
            ("child", params.children.to_string()),
            ("infant", params.infants.to_string()),
        ],
    )
}

/// Marketing carrier + first segment number, with `(+N)` for extra segments.
fn flight_number(segments: &[Segment]) -> String {
    let numbers: Vec<&str> = segments
        .iter()
        .filter_map(|s| s.flight_number.as_deref())
        .filter(|n| !n.is_empty())
        .collect();
    let carrier = segments
        .first()
        .and_then(|s| s.marketing_carrier.as_deref())
        .unwrap_or_default();

    match numbers.first() {
        Some(first) if !carrier.is_empty() => {
            let mut number = format!("{carrier}{first}");
            if numbers.len() > 1 {
                number.push_str(&format!(" (+{})", numbers.len() - 1));
            }
            number
        }
        _ => numbers.join("/"),
    }
}

fn parse_proposal(
    value: &Value,
    params: &SearchParams,
    deep_link: &str,
    now: NaiveDateTime,
) -> Result<Flight> {
    let proposal: Proposal = decode::record("proposal", value)?;
    let group = proposal
        .leaving_flight_group
        .ok_or_else(|| AppError::record("proposal", "missing leavingFlightGroup"))?;
    let segments = group.flight_details.unwrap_or_default();

    Ok(Flight {
        origin: group.origin.unwrap_or_else(|| params.origin.clone()),
        destination: group
            .destination
            .unwrap_or_else(|| params.destination.clone()),
        departure_time: parse_timestamp(group.departure_date_time.as_deref(), now)?,
        arrival_time: parse_timestamp(group.arrival_date_time.as_deref(), now)?,
        airline: group.airline_name.unwrap_or_else(|| "Unknown".to_string()),
        flight_number: flight_number(&segments),
        price: decode::price("proposal", proposal.total)?,
        currency: IRR.to_string(),
        cabin_class: group
            .cabin_type_name
            .as_deref()
            .map(CabinClass::from_label)
            .unwrap_or_default(),
        stops: group.number_of_stop.unwrap_or(0),
        duration_minutes: group.duration_min.unwrap_or(0),
        source: NAME.to_string(),
        deep_link: deep_link.to_string(),
        seats_available: proposal.seat.unwrap_or(0),
        is_refundable: proposal.is_refundable.unwrap_or(false),
        raw_data: value.clone(),
    })
}

fn parse_domestic(
    value: &Value,
    params: &SearchParams,
    deep_link: &str,
    now: NaiveDateTime,
) -> Result<Flight> {
    let item: DomesticFlight = decode::record("domestic flight", value)?;

    Ok(Flight {
        origin: item.origin.unwrap_or_else(|| params.origin.clone()),
        destination: item
            .destination
            .unwrap_or_else(|| params.destination.clone()),
        departure_time: parse_timestamp(item.departure_date_time.as_deref(), now)?,
        arrival_time: parse_timestamp(item.arrival_date_time.as_deref(), now)?,
        airline: item.airline_name.unwrap_or_else(|| "Unknown".to_string()),
        flight_number: item.flight_number.unwrap_or_default(),
        price: decode::price("domestic flight", item.adult_price.or(item.price))?,
        currency: IRR.to_string(),
        cabin_class: item
            .cabin_type
            .as_deref()
            .map(CabinClass::from_label)
            .unwrap_or_default(),
        // domestic routes are sold as non-stop
        stops: 0,
        duration_minutes: item.flight_duration.unwrap_or(0),
        source: NAME.to_string(),
        deep_link: deep_link.to_string(),
        seats_available: 0,
        is_refundable: false,
        raw_data: value.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::http::testing::{Reply, ScriptedTransport};
    use reqwest::Method;
    use tokio::time::Instant;

    fn alibaba(replies: Vec<Reply>, config: Config) -> (AlibabaSource, ScriptedTransport) {
        let transport = ScriptedTransport::new(replies);
        let source = AlibabaSource::new(SourceContext {
            session: Box::new(transport.clone()),
            config: Arc::new(config),
        });
        (source, transport)
    }

    fn params() -> SearchParams {
        SearchParams::parse("THR", "IST", "2025-01-15").unwrap()
    }

    fn proposal(number: &str, total: f64) -> Value {
        json!({
            "total": total,
            "seat": 5,
            "isRefundable": true,
            "leavingFlightGroup": {
                "origin": "IKA",
                "destination": "IST",
                "departureDateTime": "2025-01-15T08:30:00",
                "arrivalDateTime": "2025-01-15T13:45:00",
                "airlineName": "Turkish Airlines",
                "cabinTypeName": "Economy",
                "numberOfStop": 1,
                "durationMin": 315,
                "flightDetails": [
                    {"marketingCarrier": "TK", "flightNumber": number},
                    {"marketingCarrier": "TK", "flightNumber": "1"}
                ]
            }
        })
    }

    fn created(id: &str) -> Reply {
        Reply::Json(200, json!({"result": {"requestId": id}}))
    }

    fn poll(proposals: Vec<Value>, completed: bool) -> Reply {
        Reply::Json(
            200,
            json!({"result": {
                "proposals": proposals,
                "isCompleted": completed,
                "nextRequestThreshold": 500
            }}),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_polls_until_completed() {
        let (source, transport) = alibaba(
            vec![
                created("abc"),
                poll(vec![proposal("879", 450_000_000.0)], false),
                poll(
                    vec![
                        proposal("879", 450_000_000.0),
                        proposal("1879", 390_000_000.0),
                    ],
                    true,
                ),
            ],
            Config::default(),
        );

        let flights = source.fetch(&params()).await.unwrap();
        assert_eq!(flights.len(), 2);

        let sent = transport.sent();
        assert_eq!(sent.len(), 3);
        assert_eq!(sent[0].method, Method::POST);
        assert_eq!(
            sent[0].url,
            "https://ws.alibaba.ir/api/v1/flights/international/proposal-requests"
        );
        assert_eq!(sent[1].method, Method::GET);
        assert!(sent[2].url.ends_with("/international/proposal-requests/abc"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_completed_on_first_poll_sends_one_get() {
        let (source, transport) = alibaba(
            vec![created("abc"), poll(vec![proposal("879", 1.0)], true)],
            Config::default(),
        );
        assert_eq!(source.fetch(&params()).await.unwrap().len(), 1);
        assert_eq!(transport.sent().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_at_max_attempts() {
        let mut config = Config::default();
        config.polling.max_attempts = 3;
        let (source, transport) = alibaba(
            vec![
                created("abc"),
                poll(vec![proposal("879", 1.0)], false),
                poll(vec![], false),
                poll(vec![proposal("880", 2.0)], false),
            ],
            config,
        );

        let flights = source.fetch(&params()).await.unwrap();
        assert_eq!(flights.len(), 2);
        assert_eq!(transport.sent().len(), 4);
    }

    fn poll_with(threshold: Value, completed: bool) -> Reply {
        Reply::Json(
            200,
            json!({"result": {
                "proposals": [],
                "isCompleted": completed,
                "nextRequestThreshold": threshold
            }}),
        )
    }

    fn assert_elapsed(started: Instant, millis: u64) {
        let elapsed = started.elapsed();
        assert!(
            elapsed >= Duration::from_millis(millis) && elapsed < Duration::from_millis(millis + 5),
            "waited {elapsed:?}, expected {millis}ms"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_server_threshold_between_polls() {
        let (source, _) = alibaba(
            vec![created("abc"), poll_with(json!(500), false), poll_with(json!(500), true)],
            Config::default(),
        );

        let started = Instant::now();
        source.fetch(&params()).await.unwrap();
        assert_elapsed(started, 500);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_default_interval_without_threshold() {
        let (source, _) = alibaba(
            vec![
                created("abc"),
                Reply::Json(200, json!({"result": {"isCompleted": false}})),
                poll_with(json!(null), true),
            ],
            Config::default(),
        );

        let started = Instant::now();
        source.fetch(&params()).await.unwrap();
        assert_elapsed(started, 2000);
    }

    #[tokio::test(start_paused = true)]
    async fn test_huge_threshold_is_capped() {
        let mut config = Config::default();
        config.polling.max_interval_ms = 5000;
        let (source, transport) = alibaba(
            vec![created("abc"), poll_with(json!(1.0e12), false), poll_with(json!(0), true)],
            config,
        );

        let started = Instant::now();
        source.fetch(&params()).await.unwrap();
        assert_elapsed(started, 5000);
        assert_eq!(transport.sent().len(), 3);
    }

    #[test]
    fn test_poll_wait() {
        let polling = PollingConfig::default();
        assert_eq!(poll_wait(Some(750.0), &polling), Duration::from_millis(750));
        assert_eq!(poll_wait(None, &polling), Duration::from_millis(2000));
        assert_eq!(poll_wait(Some(-1.0), &polling), Duration::from_millis(2000));
        assert_eq!(poll_wait(Some(f64::INFINITY), &polling), Duration::from_millis(2000));
        assert_eq!(
            poll_wait(Some(1.0e12), &polling),
            Duration::from_millis(polling.max_interval_ms)
        );
    }

    #[tokio::test]
    async fn test_payload_uses_city_codes() {
        let (source, transport) = alibaba(
            vec![created("abc"), poll(vec![], true)],
            Config::default(),
        );
        source.fetch(&params()).await.unwrap();

        let sent = transport.sent();
        let body = sent[0].body.as_ref().unwrap();
        assert_eq!(body["origin"], "THRALL");
        assert_eq!(body["destination"], "ISTALL");
        assert_eq!(body["departureDate"], "2025-01-15");
        assert_eq!(body["adult"], 1);
        assert_eq!(body["flightClass"], "economy");
        assert_eq!(body["isReIssueRequest"], false);
        assert!(body["userVariant"].is_null());
        assert_eq!(sent[0].header_value("Origin"), Some(WEBSITE));
        assert!(sent[0].header_value("ab-channel").is_some());
    }

    #[tokio::test]
    async fn test_missing_request_id_is_protocol_error() {
        let (source, transport) = alibaba(
            vec![Reply::Json(200, json!({"result": {}}))],
            Config::default(),
        );
        let result = source.fetch(&params()).await;
        assert!(matches!(result, Err(AppError::Protocol { .. })));
        assert_eq!(transport.sent().len(), 1);

        let (source, _) = alibaba(vec![Reply::Json(200, json!({}))], Config::default());
        assert!(matches!(
            source.fetch(&params()).await,
            Err(AppError::Protocol { .. })
        ));

        let (source, _) = alibaba(
            vec![Reply::Json(200, json!({"result": {}}))],
            Config::default(),
        );
        assert!(source.search(&params()).await.is_empty());
    }

    #[tokio::test]
    async fn test_server_error_degrades_to_empty() {
        let (source, _) = alibaba(
            vec![Reply::Json(500, json!({"error": "boom"}))],
            Config::default(),
        );
        assert!(source.search(&params()).await.is_empty());
    }

    #[tokio::test]
    async fn test_endpoint_override() {
        let mut config = Config::default();
        config
            .sources
            .endpoints
            .insert(NAME.to_string(), "http://localhost:9000/".to_string());
        let (source, transport) = alibaba(vec![created("x"), poll(vec![], true)], config);
        source.fetch(&params()).await.unwrap();
        assert_eq!(
            transport.sent()[0].url,
            "http://localhost:9000/international/proposal-requests"
        );
    }

    #[test]
    fn test_parse_proposal_fields() {
        let now = Local::now().naive_local();
        let flight = parse_proposal(
            &proposal("879", 450_000_000.0),
            &params(),
            "https://link",
            now,
        )
        .unwrap();

        assert_eq!(flight.origin, "IKA");
        assert_eq!(flight.flight_number, "TK879 (+1)");
        assert_eq!(flight.airline, "Turkish Airlines");
        assert_eq!(flight.price, 450_000_000.0);
        assert_eq!(flight.currency, "IRR");
        assert_eq!(flight.stops, 1);
        assert_eq!(flight.duration_minutes, 315);
        assert_eq!(flight.seats_available, 5);
        assert!(flight.is_refundable);
        assert_eq!(flight.departure_time.to_string(), "2025-01-15 08:30:00");
        assert_eq!(flight.source, NAME);
    }

    #[test]
    fn test_parse_proposal_defaults() {
        let now = Local::now().naive_local();
        let flight = parse_proposal(
            &json!({"total": "1000", "leavingFlightGroup": {}}),
            &params(),
            "https://link",
            now,
        )
        .unwrap();

        assert_eq!(flight.origin, "THR");
        assert_eq!(flight.destination, "IST");
        assert_eq!(flight.airline, "Unknown");
        assert_eq!(flight.flight_number, "");
        assert_eq!(flight.price, 1000.0);
        assert_eq!(flight.cabin_class, CabinClass::Economy);
        assert_eq!(flight.departure_time, now);
        assert_eq!(flight.arrival_time, now);
        assert!(!flight.is_refundable);
    }

    #[test]
    fn test_parse_proposal_without_group_is_skipped() {
        let now = Local::now().naive_local();
        let result = parse_proposal(&json!({"total": 10}), &params(), "x", now);
        assert!(matches!(result, Err(AppError::Record { .. })));
    }

    #[test]
    fn test_flight_number_without_carrier() {
        let segments = vec![
            Segment {
                marketing_carrier: None,
                flight_number: Some("100".into()),
            },
            Segment {
                marketing_carrier: None,
                flight_number: Some("200".into()),
            },
        ];
        assert_eq!(flight_number(&segments), "100/200");
        assert_eq!(flight_number(&[]), "");
    }

    #[tokio::test]
    async fn test_domestic_single_request() {
        let (source, transport) = alibaba(
            vec![Reply::Json(
                200,
                json!({"result": {"departing": [
                    {
                        "origin": "THR",
                        "destination": "MHD",
                        "departureDateTime": "2025-01-15T06:00:00",
                        "arrivalDateTime": "2025-01-15T07:30:00",
                        "airlineName": "Mahan",
                        "flightNumber": "W5114",
                        "adultPrice": 25_000_000,
                        "cabinType": "Business",
                        "flightDuration": 90
                    },
                    {"price": 18_000_000, "flightNumber": "IR221"},
                    {"price": -5}
                ]}}),
            )],
            Config::default(),
        );

        let params = SearchParams::parse("thr", "mhd", "2025-01-15")
            .unwrap()
            .domestic(true);
        let flights = source.fetch(&params).await.unwrap();

        assert_eq!(flights.len(), 2);
        assert_eq!(flights[0].flight_number, "W5114");
        assert_eq!(flights[0].price, 25_000_000.0);
        assert_eq!(flights[0].cabin_class, CabinClass::Business);
        assert_eq!(flights[0].duration_minutes, 90);
        assert_eq!(flights[1].price, 18_000_000.0);
        assert_eq!(flights[1].origin, "THR");
        assert!(flights.iter().all(|f| f.stops == 0));

        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].url.ends_with("/domestic/available"));
        assert_eq!(sent[0].body.as_ref().unwrap()["destination"], "MHD");
        assert!(
            flights[0]
                .deep_link
                .starts_with("https://www.alibaba.ir/flights/THR-MHD?departing=2025-01-15")
        );
    }
}
