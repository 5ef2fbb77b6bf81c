//! Per-city wind observations.
//!
//! Rows come from an external tabular source; field names follow its columns
//! (`District`, `Speed (in m/s)`, `Direction (in ° angle)`). Direction is the
//! compass bearing the wind is coming *from*.

use std::collections::HashMap;

use log::{debug, trace};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindObservation {
    #[serde(rename = "District")]
    pub district: String,
    #[serde(rename = "Speed (in m/s)")]
    pub speed_ms: f64,
    #[serde(rename = "Direction (in ° angle)")]
    pub direction_deg: f64,
}

impl WindObservation {
    pub fn new(district: impl Into<String>, speed_ms: f64, direction_deg: f64) -> Self {
        Self { district: district.into(), speed_ms, direction_deg }
    }
}

/// Wind observations keyed by district, first record wins on duplicates.
#[derive(Debug, Clone, Default)]
pub struct WindTable {
    records: Vec<WindObservation>,
    index: HashMap<String, usize>,
}

impl WindTable {
    /// District names are trimmed; later rows for an already seen district are dropped.
    pub fn from_records(records: impl IntoIterator<Item = WindObservation>) -> Self {
        let mut table = Self::default();
        let mut duplicates = 0usize;
        for mut obs in records {
            obs.district = obs.district.trim().to_string();
            if table.index.contains_key(&obs.district) {
                trace!("Duplicate wind row for {}, keeping the first", obs.district);
                duplicates += 1;
                continue;
            }
            table.index.insert(obs.district.clone(), table.records.len());
            table.records.push(obs);
        }
        debug!(
            "Wind table: {} districts ({} duplicate rows ignored)",
            table.records.len(),
            duplicates
        );
        table
    }

    pub fn get(&self, district: &str) -> Option<&WindObservation> {
        self.index.get(district).map(|&i| &self.records[i])
    }

    /// Unique districts in table order.
    pub fn districts(&self) -> impl Iterator<Item = &str> + '_ {
        self.records.iter().map(|r| r.district.as_str())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<WindObservation> for WindTable {
    fn from_iter<T: IntoIterator<Item = WindObservation>>(iter: T) -> Self {
        Self::from_records(iter)
    }
}
