//! Result aggregation: grouping a flat deal list by destination.
//!
//! Everything here is a pure function of its inputs. Callers recompute the
//! view whenever the deal list or the favorite set changes.

use serde::Serialize;
use std::collections::{HashMap, HashSet};

use super::classify::{classify_absolute, PriceTier};
use super::favorites::FavoriteSet;
use crate::model::{Deal, DealKey, SavedDeal};

/// All deals for one destination city.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DealGroup {
    pub city: String,
    pub country: String,
    /// Cheapest price among `deals`.
    pub min_price: f64,
    /// Member deals, ascending by price.
    pub deals: Vec<Deal>,
    pub is_favorite: bool,
}

impl DealGroup {
    pub fn cheapest(&self) -> Option<&Deal> {
        self.deals.first()
    }

    pub fn tier(&self) -> PriceTier {
        classify_absolute(self.min_price)
    }
}

/// Group deals by exact city name and sort the groups.
///
/// Favorites come first; within each partition groups ascend by minimum
/// price. Equal keys keep first-appearance order.
pub fn group_deals(deals: &[Deal], favorites: &FavoriteSet) -> Vec<DealGroup> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<DealGroup> = Vec::new();

    for deal in deals {
        match index.get(deal.city.as_str()) {
            Some(&i) => groups[i].deals.push(deal.clone()),
            None => {
                index.insert(deal.city.as_str(), groups.len());
                groups.push(DealGroup {
                    city: deal.city.clone(),
                    country: deal.country.clone(),
                    min_price: deal.price,
                    deals: vec![deal.clone()],
                    is_favorite: favorites.contains(&deal.city),
                });
            }
        }
    }

    for group in &mut groups {
        group.deals.sort_by(|a, b| a.price.total_cmp(&b.price));
        if let Some(first) = group.deals.first() {
            group.min_price = first.price;
        }
    }

    groups.sort_by(|a, b| {
        b.is_favorite
            .cmp(&a.is_favorite)
            .then_with(|| a.min_price.total_cmp(&b.min_price))
    });
    groups
}

/// A destination marker for the map widget.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapPoint {
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
    pub price: f64,
    pub origin: String,
    pub tier: PriceTier,
}

/// One point per group: its cheapest deal that has coordinates.
pub fn map_points(groups: &[DealGroup]) -> Vec<MapPoint> {
    groups
        .iter()
        .filter_map(|group| {
            group.deals.iter().find_map(|deal| {
                deal.coordinates().map(|(latitude, longitude)| MapPoint {
                    city: group.city.clone(),
                    latitude,
                    longitude,
                    price: deal.price,
                    origin: deal.origin.clone(),
                    tier: classify_absolute(deal.price),
                })
            })
        })
        .collect()
}

/// Headline figures of a result list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultSummary {
    pub deals: usize,
    pub destinations: usize,
    pub cheapest: Option<f64>,
    pub direct: usize,
}

pub fn summarize(deals: &[Deal]) -> ResultSummary {
    let destinations: HashSet<&str> = deals.iter().map(|d| d.city.as_str()).collect();
    ResultSummary {
        deals: deals.len(),
        destinations: destinations.len(),
        cheapest: deals.iter().map(|d| d.price).min_by(|a, b| a.total_cmp(b)),
        direct: deals.iter().filter(|d| d.is_direct).count(),
    }
}

/// Whether `deal` is among the user's saved deals.
pub fn is_saved(deal: &Deal, saved: &[SavedDeal]) -> bool {
    let key: DealKey = deal.key();
    saved.iter().any(|s| s.deal.key() == key)
}
