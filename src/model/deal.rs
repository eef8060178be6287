//! Deal records as delivered by the backend.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// An alternative departure/return time pair for the same route and dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeOption {
    pub outbound_time: String,
    pub return_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

/// One priced round trip for a date pair and origin/destination combination.
///
/// Deals are never mutated after they arrive; grouping and sorting always
/// work on copies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deal {
    pub city: String,
    pub country: String,
    /// Price per person in euro, stored at full precision.
    pub price: f64,
    #[serde(default)]
    pub origin: String,
    pub departure_date: NaiveDate,
    pub return_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outbound_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_time: Option<String>,
    #[serde(default)]
    pub is_direct: bool,
    #[serde(default)]
    pub is_early_departure: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub time_options: Vec<TimeOption>,
    #[serde(default)]
    pub url: String,
}

/// Composite identity of a deal.
///
/// Two deals with equal keys describe the same offer even if their
/// non-defining fields (times, links, coordinates) differ.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DealKey {
    pub city: String,
    pub country: String,
    pub departure_date: NaiveDate,
    pub return_date: NaiveDate,
    pub origin: String,
    price_bits: u64,
}

impl DealKey {
    pub fn price(&self) -> f64 {
        f64::from_bits(self.price_bits)
    }
}

impl Deal {
    pub fn key(&self) -> DealKey {
        DealKey {
            city: self.city.clone(),
            country: self.country.clone(),
            departure_date: self.departure_date,
            return_date: self.return_date,
            origin: self.origin.clone(),
            price_bits: self.price.to_bits(),
        }
    }

    /// Number of nights between departure and return.
    pub fn nights(&self) -> i64 {
        (self.return_date - self.departure_date).num_days()
    }

    /// Geocoordinates, if the backend located the destination.
    ///
    /// The backend reports unknown coordinates as `0.0`, so a zero on either
    /// axis counts as missing.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) if lat != 0.0 && lon != 0.0 => Some((lat, lon)),
            _ => None,
        }
    }

    /// Price rounded to one decimal for display.
    pub fn display_price(&self) -> String {
        format!("{:.1}€", self.price)
    }
}

#[cfg(test)]
pub(crate) fn sample_deal(city: &str, price: f64) -> Deal {
    Deal {
        city: city.to_string(),
        country: "Italien".to_string(),
        price,
        origin: "Wien".to_string(),
        departure_date: NaiveDate::from_ymd_opt(2026, 3, 20).unwrap(),
        return_date: NaiveDate::from_ymd_opt(2026, 3, 22).unwrap(),
        outbound_time: None,
        return_time: None,
        is_direct: false,
        is_early_departure: false,
        latitude: None,
        longitude: None,
        time_options: Vec::new(),
        url: String::new(),
    }
}
