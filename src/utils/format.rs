//! Display formatting for flights and prices.

use chrono::NaiveDateTime;
use unicode_segmentation::UnicodeSegmentation;

use crate::models::{Flight, SearchParams};

/// Format a price for display.
///
/// IRR amounts are shown in Toman (1 Toman = 10 Rial) and abbreviated.
pub fn format_price(price: f64, currency: &str) -> String {
    if currency == "IRR" {
        let toman = price / 10.0;
        if toman >= 1_000_000.0 {
            return format!("{:.1}M T", toman / 1_000_000.0);
        } else if toman >= 1_000.0 {
            return format!("{:.0}K T", toman / 1_000.0);
        }
        return format!("{} T", group_thousands(toman));
    }
    format!("{} {}", group_thousands(price), currency)
}

/// Round to an integer and insert thousands separators.
pub fn group_thousands(value: f64) -> String {
    let rounded = value.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if rounded < 0 {
        out.insert(0, '-');
    }
    out
}

/// `HH:MM`
pub fn format_time(dt: &NaiveDateTime) -> String {
    dt.format("%H:%M").to_string()
}

/// `Xh YYm`
pub fn format_duration(minutes: u32) -> String {
    format!("{}h {:02}m", minutes / 60, minutes % 60)
}

pub fn format_stops(stops: u32) -> String {
    match stops {
        0 => "Direct".to_string(),
        1 => "1 stop".to_string(),
        n => format!("{n} stops"),
    }
}

/// Truncate to at most `max` user-perceived characters.
pub fn truncate(text: &str, max: usize) -> String {
    text.graphemes(true).take(max).collect()
}

fn pad(text: &str, width: usize) -> String {
    let text = truncate(text, width);
    let len = text.graphemes(true).count();
    format!("{}{}", text, " ".repeat(width.saturating_sub(len)))
}

/// Render flights as a fixed-width text table.
pub fn flights_table(flights: &[Flight], params: &SearchParams) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Flights: {} → {} | {}\n",
        params.origin,
        params.destination,
        params.date_str()
    ));

    let columns = [
        ("#", 3),
        ("Airline", 18),
        ("Flight", 12),
        ("Dep", 5),
        ("Arr", 5),
        ("Duration", 8),
        ("Stops", 7),
        ("Price", 12),
        ("Seats", 5),
        ("Source", 8),
    ];
    let header: Vec<String> = columns.iter().map(|(name, w)| pad(name, *w)).collect();
    out.push_str(header.join(" ").trim_end());
    out.push('\n');

    for (idx, flight) in flights.iter().enumerate() {
        let seats = if flight.seats_available > 0 {
            flight.seats_available.to_string()
        } else {
            "-".to_string()
        };
        let cells = [
            (format!("{}", idx + 1), 3),
            (flight.airline.clone(), 18),
            (flight.flight_number.clone(), 12),
            (format_time(&flight.departure_time), 5),
            (format_time(&flight.arrival_time), 5),
            (format_duration(flight.duration_minutes), 8),
            (format_stops(flight.stops), 7),
            (format_price(flight.price, &flight.currency), 12),
            (seats, 5),
            (flight.source.clone(), 8),
        ];
        let row: Vec<String> = cells.iter().map(|(text, w)| pad(text, *w)).collect();
        out.push_str(row.join(" ").trim_end());
        out.push('\n');
    }
    out
}
