//! Search configuration and its validation.

use chrono::{Datelike, Days, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use thiserror::Error;

/// Reasons a search configuration is rejected before submission.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("at least one origin airport is required")]
    NoAirports,
    #[error("invalid airport code: {0:?}")]
    InvalidAirport(String),
    #[error("at least one trip duration is required")]
    NoDurations,
    #[error("trip duration must be at least one night")]
    ZeroDuration,
    #[error("trip duration of {0} nights exceeds the maximum of {max}", max = MAX_TRIP_NIGHTS)]
    DurationTooLong(u32),
    #[error("start weekday {0} out of range (0=Monday .. 6=Sunday)")]
    InvalidWeekday(u8),
    #[error("end date {end} is before start date {start}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },
    #[error("party size must be at least one")]
    NoTravellers,
    #[error("max price must be a positive amount")]
    InvalidMaxPrice,
    #[error("hour {0} out of range (0-23)")]
    InvalidHour(u8),
    #[error("city whitelist is empty")]
    EmptyWhitelist,
    #[error("date window contains no trip for the chosen weekday and durations")]
    NoTrips,
}

/// Which destinations a search may return.
///
/// The two modes are mutually exclusive: either everything except some
/// countries, or exactly a list of cities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DestinationFilter {
    Blacklist { countries: Vec<String> },
    Whitelist { cities: Vec<String> },
}

impl Default for DestinationFilter {
    fn default() -> Self {
        Self::Blacklist { countries: Vec::new() }
    }
}

/// An immutable recurring weekend-flight search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Origin airport codes, e.g. `vie`.
    pub airports: Vec<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// 0=Monday .. 6=Sunday
    pub start_weekday: u8,
    /// Acceptable trip lengths in nights.
    pub durations: Vec<u32>,
    pub adults: u32,
    /// Maximum price per person.
    pub max_price: f64,
    pub min_departure_hour: u8,
    pub max_return_hour: u8,
    #[serde(default)]
    pub destinations: DestinationFilter,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            airports: vec!["vie".to_string()],
            start_date: NaiveDate::from_ymd_opt(2026, 3, 20).unwrap_or_default(),
            end_date: NaiveDate::from_ymd_opt(2026, 4, 30).unwrap_or_default(),
            start_weekday: 4,
            durations: vec![2],
            adults: 1,
            max_price: 70.0,
            min_departure_hour: 14,
            max_return_hour: 23,
            destinations: DestinationFilter::default(),
        }
    }
}

/// Longest trip, in nights, a search or calendar request may ask for.
pub const MAX_TRIP_NIGHTS: u32 = 30;

fn airport_code_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z]{3}$").unwrap())
}

impl SearchConfig {
    /// Derive the date window from a start date.
    ///
    /// The window ends on the last day of the start month, trips start on the
    /// start date's weekday and last until the following Sunday (at least one
    /// night).
    pub fn with_start_date(mut self, start: NaiveDate) -> Self {
        let weekday = start.weekday().num_days_from_monday();
        self.start_date = start;
        self.end_date = last_day_of_month(start);
        self.start_weekday = weekday as u8;
        self.durations = vec![(6 - weekday).max(1)];
        self
    }

    /// Check every invariant the backend relies on.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.airports.is_empty() {
            return Err(ValidationError::NoAirports);
        }
        if let Some(bad) = self.airports.iter().find(|a| !airport_code_re().is_match(a)) {
            return Err(ValidationError::InvalidAirport(bad.clone()));
        }
        if self.durations.is_empty() {
            return Err(ValidationError::NoDurations);
        }
        if self.durations.contains(&0) {
            return Err(ValidationError::ZeroDuration);
        }
        if let Some(&long) = self.durations.iter().find(|&&n| n > MAX_TRIP_NIGHTS) {
            return Err(ValidationError::DurationTooLong(long));
        }
        if self.start_weekday > 6 {
            return Err(ValidationError::InvalidWeekday(self.start_weekday));
        }
        if self.end_date < self.start_date {
            return Err(ValidationError::InvalidDateRange {
                start: self.start_date,
                end: self.end_date,
            });
        }
        if self.adults == 0 {
            return Err(ValidationError::NoTravellers);
        }
        if !self.max_price.is_finite() || self.max_price <= 0.0 {
            return Err(ValidationError::InvalidMaxPrice);
        }
        for hour in [self.min_departure_hour, self.max_return_hour] {
            if hour > 23 {
                return Err(ValidationError::InvalidHour(hour));
            }
        }
        if let DestinationFilter::Whitelist { cities } = &self.destinations {
            if cities.is_empty() {
                return Err(ValidationError::EmptyWhitelist);
            }
        }
        if self.trips().is_empty() {
            return Err(ValidationError::NoTrips);
        }
        Ok(())
    }

    /// Enumerate the (departure, return) pairs the backend will search.
    ///
    /// Departures fall on `start_weekday`, weekly from the first such date in
    /// the window; a pair is kept only if its return is inside the window.
    /// Sorted by departure, then trip length.
    pub fn trips(&self) -> Vec<(NaiveDate, NaiveDate)> {
        let mut durations = self.durations.clone();
        durations.sort_unstable();
        durations.dedup();

        if self.start_weekday > 6 {
            return Vec::new();
        }
        let offset = (i64::from(self.start_weekday)
            - i64::from(self.start_date.weekday().num_days_from_monday()))
        .rem_euclid(7);
        let mut trips = Vec::new();
        let mut next = self.start_date.checked_add_days(Days::new(offset as u64));

        // Dates past the representable range end the expansion
        while let Some(departure) = next.filter(|d| *d <= self.end_date) {
            for &nights in &durations {
                match departure.checked_add_days(Days::new(u64::from(nights))) {
                    Some(ret) if ret <= self.end_date => trips.push((departure, ret)),
                    _ => {}
                }
            }
            next = departure.checked_add_days(Days::new(7));
        }
        trips
    }

    /// Build the request body for `POST /search`.
    pub fn to_request(&self) -> SearchRequest {
        let (blacklist_countries, whitelist_cities) = match &self.destinations {
            DestinationFilter::Blacklist { countries } => (countries.clone(), Vec::new()),
            DestinationFilter::Whitelist { cities } => (Vec::new(), cities.clone()),
        };
        SearchRequest {
            airports: self.airports.iter().map(|a| a.to_lowercase()).collect(),
            start_date: self.start_date,
            end_date: self.end_date,
            start_weekday: self.start_weekday,
            durations: self.durations.clone(),
            adults: self.adults,
            max_price: self.max_price,
            min_departure_hour: self.min_departure_hour,
            max_return_hour: self.max_return_hour,
            search_mode: if whitelist_cities.is_empty() { "everywhere" } else { "cities" }.to_string(),
            blacklist_countries,
            whitelist_cities,
        }
    }
}

/// Wire body of `POST /search`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub airports: Vec<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_weekday: u8,
    pub durations: Vec<u32>,
    pub adults: u32,
    pub max_price: f64,
    pub min_departure_hour: u8,
    pub max_return_hour: u8,
    pub search_mode: String,
    pub blacklist_countries: Vec<String>,
    pub whitelist_cities: Vec<String>,
}

pub(crate) fn last_day_of_month(date: NaiveDate) -> NaiveDate {
    let last = if date.month() == 12 {
        NaiveDate::from_ymd_opt(date.year(), 12, 31)
    } else {
        NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1).and_then(|d| d.pred_opt())
    };
    last.unwrap_or(date)
}
