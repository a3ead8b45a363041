// src/sources/mrbilit.rs

//! MrBilit (mrbilit.com) adapter.
//!
//! A single POST to the atighgasht API returns every flight with its
//! price options. Each price option (fare class) becomes its own offer.

use async_trait::async_trait;
use chrono::{Local, NaiveDateTime};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use super::decode::{self, opt_bool, opt_count, opt_f64, opt_string};
use super::{FlightSource, IRR, SourceContext};
use crate::error::{AppError, Result};
use crate::models::{CabinClass, Flight, SearchParams};
use crate::utils::http::{HttpRequest, HttpTransport, fetch_json};
use crate::utils::url::with_query;
use crate::utils::{city_code, parse_duration, parse_timestamp};

pub(super) const NAME: &str = "mrbilit";
pub(super) const WEBSITE: &str = "https://mrbilit.com";

const API_BASE: &str = "https://flight.atighgasht.com/api";
const ADULT: &str = "ADL";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct FlightsResponse {
    #[serde(default)]
    flights: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct FlightItem {
    #[serde(default)]
    id: Value,
    #[serde(default)]
    prices: Option<Vec<Value>>,
    #[serde(default)]
    segments: Option<Vec<Segment>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Segment {
    #[serde(default, deserialize_with = "opt_string")]
    total_time: Option<String>,
    #[serde(default)]
    legs: Option<Vec<Leg>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Leg {
    #[serde(default, deserialize_with = "opt_string")]
    departure_time: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    arrival_time: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    journey_time: Option<String>,
    #[serde(default)]
    airline: Option<Airline>,
    #[serde(default, deserialize_with = "opt_string")]
    airline_code: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    flight_number: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    origin_code: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    destination_code: Option<String>,
    #[serde(default, deserialize_with = "opt_count")]
    stops: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Airline {
    #[serde(default, deserialize_with = "opt_string")]
    english_title: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    persian_title: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PriceOption {
    #[serde(default)]
    passenger_fares: Option<Vec<PassengerFare>>,
    #[serde(default, deserialize_with = "opt_string")]
    cabin_class: Option<String>,
    #[serde(default, deserialize_with = "opt_count")]
    capacity: Option<u32>,
    #[serde(default, deserialize_with = "opt_bool")]
    is_charter: Option<bool>,
    #[serde(default)]
    booking_class: Value,
    #[serde(default)]
    baggage: Value,
    #[serde(default)]
    baggage_type: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PassengerFare {
    #[serde(default, deserialize_with = "opt_string")]
    pax_type: Option<String>,
    #[serde(default, deserialize_with = "opt_f64")]
    total_fare: Option<f64>,
}

/// Flight-level fields shared by every price option.
struct Itinerary {
    origin: String,
    destination: String,
    departure_time: NaiveDateTime,
    arrival_time: NaiveDateTime,
    airline: String,
    flight_number: String,
    stops: u32,
    duration_minutes: u32,
}

/// Adapter for mrbilit.com.
pub struct MrbilitSource {
    session: Box<dyn HttpTransport>,
    api_base: String,
    token: String,
}

impl MrbilitSource {
    pub fn new(ctx: SourceContext) -> Self {
        Self {
            api_base: ctx.config.sources.endpoint(NAME, API_BASE),
            token: ctx.config.sources.mrbilit_token.clone(),
            session: ctx.session,
        }
    }

    /// Fresh session and player ids on every request.
    fn headers(&self) -> [(&'static str, String); 7] {
        [
            ("Accept", "application/json, text/plain, */*".to_string()),
            ("Content-Type", "application/json-patch+json".to_string()),
            ("Authorization", format!("Bearer {}", self.token)),
            ("Origin", WEBSITE.to_string()),
            ("Referer", format!("{WEBSITE}/")),
            ("sessionid", format!("session_{}", Uuid::new_v4())),
            ("x-playerid", Uuid::new_v4().to_string()),
        ]
    }
}

#[async_trait]
impl FlightSource for MrbilitSource {
    fn name(&self) -> &str {
        NAME
    }

    async fn fetch(&self, params: &SearchParams) -> Result<Vec<Flight>> {
        let destination = if params.domestic {
            params.destination.clone()
        } else {
            city_code(&params.destination)
        };
        let payload = json!({
            "AdultCount": params.adults,
            "ChildCount": params.children,
            "InfantCount": params.infants,
            "CabinClass": "All",
            "Routes": [{
                "OriginCode": params.origin,
                "DestinationCode": destination,
                "DepartureDate": params.date_str(),
            }],
            "Baggage": true,
            "IncludeFlightsWithHigherCapacity": false,
        });

        let url = format!("{}/Flights", self.api_base);
        let request = HttpRequest::post_json(url, payload).headers(self.headers());
        let response: FlightsResponse = fetch_json(self.session.as_ref(), request).await?;

        let items = response.flights.unwrap_or_default();
        let deep_link = deep_link(params)?;
        let now = Local::now().naive_local();

        Ok(decode::each(NAME, "flight", &items, |item| {
            parse_flight(item, params, &deep_link, now)
        })
        .into_iter()
        .flatten()
        .collect())
    }
}

fn deep_link(params: &SearchParams) -> Result<String> {
    with_query(
        WEBSITE,
        "/flight/search",
        &[
            ("origin", params.origin.clone()),
            ("destination", params.destination.clone()),
            ("date", params.date_str()),
            ("adult", params.adults.to_string()),
            ("child", params.children.to_string()),
            ("infant", params.infants.to_string()),
        ],
    )
}

/// Decode the first segment's first leg into the fields every offer shares.
fn itinerary(segments: Vec<Segment>, params: &SearchParams, now: NaiveDateTime) -> Result<Itinerary> {
    let segment = segments
        .into_iter()
        .next()
        .ok_or_else(|| AppError::record("flight", "no Segments"))?;
    let legs = segment.legs.unwrap_or_default();
    let leg = legs
        .first()
        .ok_or_else(|| AppError::record("flight", "no Legs in first segment"))?;

    // unparseable times fall back to now, together
    let (departure_time, arrival_time) = match (
        parse_timestamp(leg.departure_time.as_deref(), now),
        parse_timestamp(leg.arrival_time.as_deref(), now),
    ) {
        (Ok(departure), Ok(arrival)) => (departure, arrival),
        _ => (now, now),
    };

    let duration_minutes = match leg.journey_time.as_deref().map(parse_duration) {
        Some(minutes) if minutes > 0 => minutes,
        _ => segment.total_time.as_deref().map(parse_duration).unwrap_or(0),
    };

    let airline = leg
        .airline
        .as_ref()
        .and_then(|a| {
            [&a.english_title, &a.persian_title]
                .into_iter()
                .flatten()
                .find(|title| !title.trim().is_empty())
                .cloned()
        })
        .unwrap_or_else(|| "Unknown".to_string());

    let connections = u32::try_from(legs.len().saturating_sub(1)).unwrap_or(u32::MAX);
    let stops = legs
        .iter()
        .map(|l| l.stops.unwrap_or(0))
        .fold(connections, u32::saturating_add);

    Ok(Itinerary {
        origin: leg
            .origin_code
            .clone()
            .unwrap_or_else(|| params.origin.clone()),
        destination: leg
            .destination_code
            .clone()
            .unwrap_or_else(|| params.destination.clone()),
        departure_time,
        arrival_time,
        airline,
        flight_number: format!(
            "{}{}",
            leg.airline_code.as_deref().unwrap_or_default(),
            leg.flight_number.as_deref().unwrap_or_default()
        ),
        stops,
        duration_minutes,
    })
}

/// One offer per price option; a bad option is skipped on its own.
fn parse_flight(
    value: &Value,
    params: &SearchParams,
    deep_link: &str,
    now: NaiveDateTime,
) -> Result<Vec<Flight>> {
    let item: FlightItem = decode::record("flight", value)?;
    let itinerary = itinerary(item.segments.unwrap_or_default(), params, now)?;
    let prices = item.prices.unwrap_or_default();

    Ok(decode::each(NAME, "price option", &prices, |option| {
        parse_price_option(option, &item.id, &itinerary, deep_link)
    }))
}

fn parse_price_option(
    value: &Value,
    flight_id: &Value,
    itinerary: &Itinerary,
    deep_link: &str,
) -> Result<Flight> {
    let option: PriceOption = decode::record("price option", value)?;
    let fares = option.passenger_fares.unwrap_or_default();
    let adult_fare = fares
        .iter()
        .find(|f| f.pax_type.as_deref() == Some(ADULT))
        .or_else(|| fares.first());
    let is_charter = option.is_charter.unwrap_or(false);

    Ok(Flight {
        origin: itinerary.origin.clone(),
        destination: itinerary.destination.clone(),
        departure_time: itinerary.departure_time,
        arrival_time: itinerary.arrival_time,
        airline: itinerary.airline.clone(),
        flight_number: itinerary.flight_number.clone(),
        price: decode::price("price option", adult_fare.and_then(|f| f.total_fare))?,
        currency: IRR.to_string(),
        cabin_class: option
            .cabin_class
            .as_deref()
            .map(CabinClass::from_label)
            .unwrap_or_default(),
        stops: itinerary.stops,
        duration_minutes: itinerary.duration_minutes,
        source: NAME.to_string(),
        deep_link: deep_link.to_string(),
        seats_available: option.capacity.unwrap_or(0),
        // charter fares are sold non-refundable
        is_refundable: !is_charter,
        raw_data: json!({
            "flight_id": flight_id,
            "booking_class": option.booking_class,
            "is_charter": is_charter,
            "baggage": option.baggage,
            "baggage_type": option.baggage_type,
        }),
    })
}
