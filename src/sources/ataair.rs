// src/sources/ataair.rs

//! Ata Airlines (ataair.ir) adapter: one POST returns every availability.

use async_trait::async_trait;
use chrono::{Local, NaiveDateTime};
use serde::Deserialize;
use serde_json::{Value, json};

use super::decode::{self, opt_count, opt_f64, opt_string};
use super::{FlightSource, IRR, SourceContext};
use crate::error::{AppError, Result};
use crate::models::{CabinClass, Flight, SearchParams};
use crate::utils::http::{HttpRequest, HttpTransport, fetch_json};
use crate::utils::parse_timestamp;
use crate::utils::url::with_query;

pub(super) const NAME: &str = "ataair";
pub(super) const WEBSITE: &str = "https://app.ataair.ir";

const API_BASE: &str = "https://reservationcoreapi.ataair.ir/Reservation/v1/Flight-api";
const AIRLINE: &str = "Ata Airlines";
const DEFAULT_CARRIER: &str = "I3";

/// Iran Standard Time, as the backend expects on the departure date
const DATE_SUFFIX: &str = "T00:00:00+03:30";

#[derive(Debug, Deserialize)]
struct AvailableResponse {
    #[serde(default)]
    availables: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Available {
    #[serde(default, deserialize_with = "opt_f64")]
    total_price: Option<f64>,
    #[serde(default, deserialize_with = "opt_count")]
    seat_remain: Option<u32>,
    #[serde(default)]
    flight_itineraries: Option<Vec<Itinerary>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Itinerary {
    #[serde(default, deserialize_with = "opt_string")]
    origin_iata_code: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    destination_iata_code: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    departure_date_time: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    arrival_date_time: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    airline_code: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    flight_number: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    cabin_type_name: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    refund_method_type: Option<String>,
}

/// Adapter for ataair.ir.
pub struct AtaairSource {
    session: Box<dyn HttpTransport>,
    api_base: String,
}

impl AtaairSource {
    pub fn new(ctx: SourceContext) -> Self {
        Self {
            api_base: ctx.config.sources.endpoint(NAME, API_BASE),
            session: ctx.session,
        }
    }
}

#[async_trait]
impl FlightSource for AtaairSource {
    fn name(&self) -> &str {
        NAME
    }

    async fn fetch(&self, params: &SearchParams) -> Result<Vec<Flight>> {
        // counts go out as strings
        let payload = json!({
            "originIataCode": params.origin,
            "destinationIataCode": params.destination,
            "departureDate": format!("{}{}", params.date_str(), DATE_SUFFIX),
            "adultCount": params.adults.to_string(),
            "childCount": params.children.to_string(),
            "infantCount": params.infants.to_string(),
            "airTripType": 0,
            "flightLegType": 0,
            "flightReservationType": 0,
        });

        let url = format!("{}/Available/GetAvailable", self.api_base);
        let request = HttpRequest::post_json(url, payload).headers([
            ("Accept", "application/json".to_string()),
            ("Content-Type", "application/json".to_string()),
            ("Origin", WEBSITE.to_string()),
            ("Referer", format!("{WEBSITE}/")),
        ]);
        let response: AvailableResponse = fetch_json(self.session.as_ref(), request).await?;

        let availables = response.availables.unwrap_or_default();
        let deep_link = deep_link(params)?;
        let now = Local::now().naive_local();

        Ok(decode::each(NAME, "available", &availables, |item| {
            parse_available(item, params, &deep_link, now)
        }))
    }
}

fn deep_link(params: &SearchParams) -> Result<String> {
    with_query(
        WEBSITE,
        "/flight/available",
        &[
            ("origin", params.origin.clone()),
            ("destination", params.destination.clone()),
            ("date", params.date_str()),
        ],
    )
}

fn parse_available(
    value: &Value,
    params: &SearchParams,
    deep_link: &str,
    now: NaiveDateTime,
) -> Result<Flight> {
    let item: Available = decode::record("available", value)?;
    let mut itineraries = item.flight_itineraries.unwrap_or_default();
    let stops = itineraries.len().saturating_sub(1) as u32;
    if itineraries.is_empty() {
        return Err(AppError::record("available", "no flightItineraries"));
    }
    let first = itineraries.swap_remove(0);

    let departure_time = parse_timestamp(first.departure_date_time.as_deref(), now)?;
    let arrival_time = parse_timestamp(first.arrival_date_time.as_deref(), now)?;
    let duration_minutes =
        u32::try_from((arrival_time - departure_time).num_minutes()).unwrap_or(0);

    let carrier = first
        .airline_code
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| DEFAULT_CARRIER.to_string());
    let is_refundable = first
        .refund_method_type
        .is_some_and(|t| t.trim().eq_ignore_ascii_case("online"));

    Ok(Flight {
        origin: first
            .origin_iata_code
            .unwrap_or_else(|| params.origin.clone()),
        destination: first
            .destination_iata_code
            .unwrap_or_else(|| params.destination.clone()),
        departure_time,
        arrival_time,
        airline: AIRLINE.to_string(),
        flight_number: format!("{}{}", carrier, first.flight_number.unwrap_or_default()),
        price: decode::price("available", item.total_price)?,
        currency: IRR.to_string(),
        cabin_class: first
            .cabin_type_name
            .as_deref()
            .map(CabinClass::from_label)
            .unwrap_or_default(),
        stops,
        duration_minutes,
        source: NAME.to_string(),
        deep_link: deep_link.to_string(),
        seats_available: item.seat_remain.unwrap_or(0),
        is_refundable,
        raw_data: value.clone(),
    })
}
