//! Month-scoped search types.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::{last_day_of_month, Deal, ValidationError, MAX_TRIP_NIGHTS};

/// Calendar error types.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalendarError {
    #[error("month {0} out of range (1-12)")]
    InvalidMonth(u32),
    #[error("year {0} outside the supported date range")]
    InvalidYear(i32),
    #[error("invalid month string {0:?}, expected YYYY-MM")]
    Unparseable(String),
}

/// A calendar month whose days are all representable dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self, CalendarError> {
        if !(1..=12).contains(&month) {
            return Err(CalendarError::InvalidMonth(month));
        }
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(CalendarError::InvalidYear(year));
        }
        Ok(Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or_default()
    }

    /// Number of days in the month, leap years included.
    pub fn days(&self) -> u32 {
        last_day_of_month(self.first_day()).day()
    }

    /// Weekday of the 1st, Monday=0 .. Sunday=6.
    pub fn first_weekday(&self) -> u32 {
        self.first_day().weekday().num_days_from_monday()
    }

    pub fn day(&self, day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, day)
    }

    /// The following month, `None` past the last supported date.
    pub fn next(&self) -> Option<Self> {
        if self.month == 12 {
            Self::new(self.year.checked_add(1)?, 1).ok()
        } else {
            Self::new(self.year, self.month + 1).ok()
        }
    }

    /// The preceding month, `None` before the first supported date.
    pub fn prev(&self) -> Option<Self> {
        if self.month == 1 {
            Self::new(self.year.checked_sub(1)?, 12).ok()
        } else {
            Self::new(self.year, self.month - 1).ok()
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unparseable = || CalendarError::Unparseable(s.to_string());
        let (y, m) = s.split_once('-').ok_or_else(unparseable)?;
        let year = y.parse().map_err(|_| unparseable())?;
        let month = m.parse().map_err(|_| unparseable())?;
        Self::new(year, month)
    }
}

impl TryFrom<String> for YearMonth {
    type Error = CalendarError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<YearMonth> for String {
    fn from(ym: YearMonth) -> Self {
        ym.to_string()
    }
}

/// Per-day price summary returned by a calendar job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    /// Cheapest deal that day; `None` means no data.
    #[serde(default)]
    pub min_price: Option<f64>,
    #[serde(default)]
    pub deals_count: u32,
    #[serde(default)]
    pub deals: Vec<Deal>,
}

/// Wire body of `POST /calendar`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarRequest {
    pub airports: Vec<String>,
    pub month: YearMonth,
    pub duration: u32,
    pub adults: u32,
    pub max_price: f64,
    #[serde(default)]
    pub blacklist_countries: Vec<String>,
}

impl CalendarRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.airports.is_empty() {
            return Err(ValidationError::NoAirports);
        }
        if self.duration == 0 {
            return Err(ValidationError::ZeroDuration);
        }
        if self.duration > MAX_TRIP_NIGHTS {
            return Err(ValidationError::DurationTooLong(self.duration));
        }
        if self.adults == 0 {
            return Err(ValidationError::NoTravellers);
        }
        if !self.max_price.is_finite() || self.max_price <= 0.0 {
            return Err(ValidationError::InvalidMaxPrice);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_days_in_month() {
        assert_eq!(YearMonth::new(2028, 2).unwrap().days(), 29);
        assert_eq!(YearMonth::new(2027, 2).unwrap().days(), 28);
        assert_eq!(YearMonth::new(2026, 4).unwrap().days(), 30);
        assert_eq!(YearMonth::new(2026, 12).unwrap().days(), 31);
    }

    #[test]
    fn test_first_weekday_monday_based() {
        // 2026-03-01 is a Sunday
        assert_eq!(YearMonth::new(2026, 3).unwrap().first_weekday(), 6);
        // 2027-02-01 is a Monday
        assert_eq!(YearMonth::new(2027, 2).unwrap().first_weekday(), 0);
    }

    #[test]
    fn test_parse_and_navigation() {
        let ym: YearMonth = "2026-12".parse().unwrap();
        assert_eq!(ym.next().unwrap().to_string(), "2027-01");
        assert_eq!(ym.next().and_then(|m| m.prev()), Some(ym));
        assert_eq!("2026-1".parse::<YearMonth>().unwrap().to_string(), "2026-01");
        assert_eq!("2026-13".parse::<YearMonth>(), Err(CalendarError::InvalidMonth(13)));
        assert!(matches!("march".parse::<YearMonth>(), Err(CalendarError::Unparseable(_))));
    }

    #[test]
    fn test_unrepresentable_years_rejected() {
        assert_eq!("300000-02".parse::<YearMonth>(), Err(CalendarError::InvalidYear(300000)));
        assert_eq!(YearMonth::new(i32::MAX, 12), Err(CalendarError::InvalidYear(i32::MAX)));
        assert!(serde_json::from_str::<YearMonth>(r#""300000-02""#).is_err());

        let last = YearMonth::of(NaiveDate::MAX);
        assert_eq!(last.days(), 31);
        assert_eq!(last.next(), None);
        assert!(last.prev().is_some());

        let first = YearMonth::of(NaiveDate::MIN);
        assert_eq!(first.prev(), None);
        assert_eq!(first.next().and_then(|m| m.prev()), Some(first));
    }

    #[test]
    fn test_request_serializes_month_string() {
        let req = CalendarRequest {
            airports: vec!["vie".into()],
            month: YearMonth::new(2026, 3).unwrap(),
            duration: 2,
            adults: 1,
            max_price: 70.0,
            blacklist_countries: vec![],
        };
        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(body["month"], "2026-03");
        assert_eq!(req.validate(), Ok(()));

        let long = CalendarRequest { duration: 31, ..req };
        assert_eq!(long.validate(), Err(ValidationError::DurationTooLong(31)));
    }

    #[test]
    fn test_calendar_day_null_price() {
        let day: CalendarDay =
            serde_json::from_str(r#"{"date": "2026-03-21", "min_price": null}"#).unwrap();
        assert!(day.min_price.is_none());
        assert_eq!(day.deals_count, 0);
    }
}
