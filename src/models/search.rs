//! Normalized search query.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::CabinClass;

/// Parameters for a single flight search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParams {
    /// Upper-cased origin code (airport or city)
    pub origin: String,

    /// Upper-cased destination code (airport or city)
    pub destination: String,

    pub date: NaiveDate,

    pub adults: u32,
    pub children: u32,
    pub infants: u32,

    pub cabin_class: CabinClass,

    /// Use domestic endpoints where a backend distinguishes them
    pub domestic: bool,
}

impl SearchParams {
    /// One adult, economy, international.
    pub fn new(origin: &str, destination: &str, date: NaiveDate) -> Self {
        Self {
            origin: origin.trim().to_uppercase(),
            destination: destination.trim().to_uppercase(),
            date,
            adults: 1,
            children: 0,
            infants: 0,
            cabin_class: CabinClass::Economy,
            domestic: false,
        }
    }

    /// Build from a `YYYY-MM-DD` date string.
    pub fn parse(origin: &str, destination: &str, date: &str) -> Result<Self> {
        let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").map_err(|e| {
            AppError::config(format!("Invalid date '{date}', expected YYYY-MM-DD: {e}"))
        })?;
        Ok(Self::new(origin, destination, date))
    }

    pub fn with_passengers(mut self, adults: u32, children: u32, infants: u32) -> Self {
        self.adults = adults;
        self.children = children;
        self.infants = infants;
        self
    }

    pub fn with_cabin(mut self, cabin_class: CabinClass) -> Self {
        self.cabin_class = cabin_class;
        self
    }

    pub fn domestic(mut self, domestic: bool) -> Self {
        self.domestic = domestic;
        self
    }

    /// ISO date as sent to backends.
    pub fn date_str(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    /// Total number of travellers.
    pub fn passenger_count(&self) -> u32 {
        self.adults
            .saturating_add(self.children)
            .saturating_add(self.infants)
    }

    /// Reject queries no backend can answer.
    pub fn validate(&self) -> Result<()> {
        for (label, code) in [("origin", &self.origin), ("destination", &self.destination)] {
            if code.len() < 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(AppError::config(format!(
                    "Invalid {label} code '{code}': expected letters only, at least 3"
                )));
            }
        }
        if self.origin == self.destination {
            return Err(AppError::config("Origin and destination must differ"));
        }
        if self.adults == 0 {
            return Err(AppError::config("At least one adult passenger is required"));
        }
        if self.infants > self.adults {
            return Err(AppError::config(
                "Each infant must travel with an adult (infants > adults)",
            ));
        }
        Ok(())
    }
}
