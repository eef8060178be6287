//! Calendar grid construction.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::HashMap;

use super::classify::CellShade;
use crate::model::{CalendarDay, Deal, YearMonth};

/// One calendar day in the grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayCell {
    pub day: u32,
    pub date: NaiveDate,
    /// `None` means no data; zero is a real price.
    pub min_price: Option<f64>,
    pub deals_count: u32,
    pub deals: Vec<Deal>,
    pub shade: CellShade,
}

impl DayCell {
    pub fn has_data(&self) -> bool {
        self.min_price.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GridCell {
    /// Placeholder before the 1st of the month.
    Blank,
    Day(DayCell),
}

/// A month laid out in Monday-first rows of seven.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarGrid {
    pub month: YearMonth,
    pub leading_blanks: usize,
    pub cells: Vec<GridCell>,
}

impl CalendarGrid {
    /// Rows of seven cells; the last row may be short.
    pub fn weeks(&self) -> std::slice::Chunks<'_, GridCell> {
        self.cells.chunks(7)
    }

    pub fn day(&self, day: u32) -> Option<&DayCell> {
        if day == 0 {
            return None;
        }
        match self.cells.get(self.leading_blanks + day as usize - 1) {
            Some(GridCell::Day(cell)) => Some(cell),
            _ => None,
        }
    }

    pub fn days(&self) -> impl Iterator<Item = &DayCell> {
        self.cells.iter().filter_map(|c| match c {
            GridCell::Day(cell) => Some(cell),
            GridCell::Blank => None,
        })
    }

    /// Cheapest day with data, earliest on ties.
    pub fn cheapest_day(&self) -> Option<&DayCell> {
        let mut best: Option<&DayCell> = None;
        for cell in self.days() {
            let Some(price) = cell.min_price else { continue };
            if best.and_then(|b| b.min_price).map_or(true, |p| price < p) {
                best = Some(cell);
            }
        }
        best
    }
}

/// Lay out sparse per-day summaries for `month`.
///
/// Leading blanks align the 1st under its weekday; every day of the month
/// gets a cell, filled from `days` where present. Entries outside the month
/// are ignored; a repeated date keeps the last entry.
pub fn build_grid(month: YearMonth, days: &[CalendarDay], max_price: f64) -> CalendarGrid {
    let mut by_day: HashMap<u32, &CalendarDay> = HashMap::new();
    for entry in days {
        if YearMonth::of(entry.date) != month {
            tracing::debug!("Ignoring calendar entry {} outside {}", entry.date, month);
            continue;
        }
        by_day.insert(entry.date.day(), entry);
    }

    let leading_blanks = month.first_weekday() as usize;
    let days_in_month = month.days();
    let mut cells = Vec::with_capacity(leading_blanks + days_in_month as usize);
    cells.extend(std::iter::repeat(GridCell::Blank).take(leading_blanks));

    for day in 1..=days_in_month {
        let Some(date) = month.day(day) else {
            continue;
        };
        let cell = match by_day.get(&day) {
            Some(entry) => DayCell {
                day,
                date,
                min_price: entry.min_price,
                deals_count: entry.deals_count,
                deals: entry.deals.clone(),
                shade: CellShade::for_price(entry.min_price, max_price),
            },
            None => DayCell {
                day,
                date,
                min_price: None,
                deals_count: 0,
                deals: Vec::new(),
                shade: CellShade::NoData,
            },
        };
        cells.push(GridCell::Day(cell));
    }

    CalendarGrid {
        month,
        leading_blanks,
        cells,
    }
}
