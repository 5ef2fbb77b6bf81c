//! City coordinate lookup.
//!
//! Coordinate acquisition (geocoding, retries, the on-disk cache) happens outside
//! this crate; the pipeline only sees an injected `CoordinateProvider`. The
//! `CoordinateTable` is the in-memory, insertion-ordered mapping every stage
//! indexes against, and it can be read from the cache format
//! `{"City": [lat, lon], ...}` with file order preserved.

use std::collections::HashMap;

use log::{debug, trace};
use serde_json::{Map, Value};

use crate::errors::Result;
use crate::geometry::Coordinate;

/// Resolves a city name to its coordinate, if known.
pub trait CoordinateProvider {
    fn resolve(&self, city: &str) -> Option<Coordinate>;
}

/// Insertion-ordered `{city -> Coordinate}` mapping.
///
/// The order in which cities were inserted is the row/column order of every
/// matrix built from this table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoordinateTable {
    cities: Vec<String>,
    coords: Vec<Coordinate>,
    index: HashMap<String, usize>,
}

impl CoordinateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a city, overwriting the coordinate but keeping the original
    /// position if the city is already present.
    pub fn insert(&mut self, city: impl Into<String>, coord: Coordinate) {
        let city = city.into();
        match self.index.get(&city).copied() {
            Some(i) => self.coords[i] = coord,
            None => {
                self.index.insert(city.clone(), self.cities.len());
                self.cities.push(city);
                self.coords.push(coord);
            }
        }
    }

    /// Parses the coordinate cache format `{"City": [lat, lon], ...}`.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let map: Map<String, Value> = serde_json::from_str(json)?;
        let mut table = Self::new();
        for (city, value) in map {
            let (lat, lon): (f64, f64) = serde_json::from_value(value)?;
            table.insert(city, Coordinate::new(lat, lon));
        }
        debug!("Loaded {} coordinates from JSON", table.len());
        Ok(table)
    }

    /// Serialises back to the cache format, in table order.
    pub fn to_json_string(&self) -> Result<String> {
        let mut map = Map::with_capacity(self.len());
        for (city, coord) in self.iter() {
            map.insert(city.to_string(), serde_json::to_value(coord)?);
        }
        Ok(serde_json::to_string_pretty(&Value::Object(map))?)
    }

    /// Builds a table for `cities`, in the given order, from any provider.
    ///
    /// Cities the provider cannot resolve are left out; they take no part in the graph.
    pub fn resolve_all<'a, P, I>(provider: &P, cities: I) -> Self
    where
        P: CoordinateProvider + ?Sized,
        I: IntoIterator<Item = &'a str>,
    {
        let mut table = Self::new();
        let mut missing = 0usize;
        for city in cities {
            match provider.resolve(city) {
                Some(coord) => table.insert(city, coord),
                None => {
                    trace!("No coordinate for {}, excluding it", city);
                    missing += 1;
                }
            }
        }
        debug!("Resolved {} cities, {} without coordinates", table.len(), missing);
        table
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    pub fn contains(&self, city: &str) -> bool {
        self.index.contains_key(city)
    }

    pub fn get(&self, city: &str) -> Option<Coordinate> {
        self.index.get(city).map(|&i| self.coords[i])
    }

    /// Position of a city in table order.
    pub fn index_of(&self, city: &str) -> Option<usize> {
        self.index.get(city).copied()
    }

    pub fn cities(&self) -> &[String] {
        &self.cities
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Coordinate)> + '_ {
        self.cities.iter().map(String::as_str).zip(self.coords.iter().copied())
    }
}

impl CoordinateProvider for CoordinateTable {
    fn resolve(&self, city: &str) -> Option<Coordinate> {
        self.get(city)
    }
}

impl CoordinateProvider for HashMap<String, Coordinate> {
    fn resolve(&self, city: &str) -> Option<Coordinate> {
        self.get(city).copied()
    }
}

impl<S: Into<String>> FromIterator<(S, Coordinate)> for CoordinateTable {
    fn from_iter<T: IntoIterator<Item = (S, Coordinate)>>(iter: T) -> Self {
        let mut table = Self::new();
        for (city, coord) in iter {
            table.insert(city, coord);
        }
        table
    }
}
