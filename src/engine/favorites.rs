//! Favorite destinations.

use std::collections::BTreeSet;

use crate::store::{KeyValueStore, StoreError};

const FAVORITES_KEY: &str = "favorites";

/// Set of favorited city names, independent of any job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FavoriteSet {
    cities: BTreeSet<String>,
}

impl FavoriteSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, city: &str) -> bool {
        self.cities.contains(city)
    }

    /// Flip a city's membership; returns whether it is now a favorite.
    pub fn toggle(&mut self, city: &str) -> bool {
        if self.cities.remove(city) {
            false
        } else {
            self.cities.insert(city.to_string());
            true
        }
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.cities.iter().map(String::as_str)
    }

    /// Load the persisted set; missing means empty.
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Result<Self, StoreError> {
        match store.get(FAVORITES_KEY)? {
            Some(raw) => {
                let cities: Vec<String> = serde_json::from_str(&raw)?;
                Ok(cities.into_iter().collect())
            }
            None => Ok(Self::default()),
        }
    }

    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &S) -> Result<(), StoreError> {
        let cities: Vec<&str> = self.iter().collect();
        store.set(FAVORITES_KEY, &serde_json::to_string(&cities)?)
    }
}

impl FromIterator<String> for FavoriteSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            cities: iter.into_iter().collect(),
        }
    }
}

impl<'a> FromIterator<&'a str> for FavoriteSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        iter.into_iter().map(str::to_string).collect()
    }
}
