//! Normalized flight offer and cabin class.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Cabin class after normalization.
///
/// Backends label cabins in free text (English or Persian); every label is
/// mapped into this closed set, falling back to economy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CabinClass {
    #[default]
    Economy,
    Business,
    First,
}

/// Persian cabin labels seen on Iranian backends.
const PERSIAN_LABELS: &[(&str, CabinClass)] = &[
    ("اکونومی", CabinClass::Economy),
    ("اقتصادی", CabinClass::Economy),
    ("بیزینس", CabinClass::Business),
    ("بیزنس", CabinClass::Business),
    ("تجاری", CabinClass::Business),
    ("فرست کلاس", CabinClass::First),
    ("فرست", CabinClass::First),
    ("درجه یک", CabinClass::First),
];

impl CabinClass {
    /// Map a source-specific label into the closed set.
    pub fn from_label(label: &str) -> Self {
        let trimmed = label.trim();

        if let Some((_, cabin)) = PERSIAN_LABELS.iter().find(|(fa, _)| *fa == trimmed) {
            return *cabin;
        }

        let normalized: String = trimmed
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .collect();

        match normalized.as_str() {
            "business" | "businessclass" | "c" | "j" => Self::Business,
            "first" | "firstclass" | "f" => Self::First,
            _ => Self::Economy,
        }
    }

    /// Canonical lower-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Economy => "economy",
            Self::Business => "business",
            Self::First => "first",
        }
    }
}

impl fmt::Display for CabinClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single normalized flight offer.
///
/// One physical flight may produce several `Flight` values when the
/// backend sells it in more than one fare class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flight {
    /// Origin code as returned by the source
    pub origin: String,

    /// Destination code as returned by the source
    pub destination: String,

    /// Departure time (source-local)
    pub departure_time: NaiveDateTime,

    /// Arrival time (source-local)
    pub arrival_time: NaiveDateTime,

    /// Airline display name
    pub airline: String,

    /// Carrier code + number, e.g. `W5114` or `TK879 (+1)`
    pub flight_number: String,

    /// Total fare in `currency`
    pub price: f64,

    /// ISO 4217 currency code
    pub currency: String,

    pub cabin_class: CabinClass,

    /// Number of stops (0 = direct)
    pub stops: u32,

    pub duration_minutes: u32,

    /// Adapter name that produced this offer
    pub source: String,

    /// Booking URL on the source website
    pub deep_link: String,

    /// Remaining seats, 0 if unknown
    pub seats_available: u32,

    pub is_refundable: bool,

    /// Original backend payload, excluded from equality
    #[serde(default)]
    pub raw_data: serde_json::Value,
}

impl Flight {
    /// Duration as `Xh Ym`.
    pub fn duration_formatted(&self) -> String {
        format!(
            "{}h {}m",
            self.duration_minutes / 60,
            self.duration_minutes % 60
        )
    }

    pub fn is_direct(&self) -> bool {
        self.stops == 0
    }
}

impl PartialEq for Flight {
    fn eq(&self, other: &Self) -> bool {
        self.origin == other.origin
            && self.destination == other.destination
            && self.departure_time == other.departure_time
            && self.arrival_time == other.arrival_time
            && self.airline == other.airline
            && self.flight_number == other.flight_number
            && self.price == other.price
            && self.currency == other.currency
            && self.cabin_class == other.cabin_class
            && self.stops == other.stops
            && self.duration_minutes == other.duration_minutes
            && self.source == other.source
            && self.deep_link == other.deep_link
            && self.seats_available == other.seats_available
            && self.is_refundable == other.is_refundable
    }
}

impl fmt::Display for Flight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} | {}→{} | {} - {} | {:.0} {}",
            self.airline,
            self.flight_number,
            self.origin,
            self.destination,
            self.departure_time.format("%H:%M"),
            self.arrival_time.format("%H:%M"),
            self.price,
            self.currency
        )
    }
}
