//! # Angular-sector nearest-neighbour graph over cities
//!
//! ## Algorithm
//!
//! For every source city `s`:
//! 1. Compute distance and bearing from `s` to every other city `t`
//! 2. Keep candidates in the half-open band `radius_km_min < d <= MAX_RADIUS_KM`
//! 3. Bucket candidates by `angle_segment(bearing, angle_segment_size_deg)`
//! 4. In each occupied sector keep the nearest candidate; on equal distance the
//!    candidate met first in city order wins
//! 5. Emit one `SectorEdge` per occupied sector, in sector discovery order
//!
//! Cities with no candidate in the band are absent from the graph rather than
//! present with an empty edge list.
//!
//! ## Complexity
//! `O(n²)` distance/bearing evaluations, no spatial index. The per-source scans are
//! independent and run in parallel with rayon; collection preserves city order so
//! the result is identical to a sequential scan.

use std::collections::HashMap;

use log::{debug, info, trace};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::coordinates::CoordinateTable;
use crate::geometry::{angle_segment, Coordinate};

/// Upper bound of the distance band in km.
pub const MAX_RADIUS_KM: f64 = 400.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct SectorParams {
    /// Exclusive lower bound of the distance band, in km.
    pub radius_km_min: f64,
    /// Width of an angular sector, in degrees.
    pub angle_segment_size_deg: f64,
}

impl Default for SectorParams {
    fn default() -> Self {
        Self { radius_km_min: 100.0, angle_segment_size_deg: 20.0 }
    }
}

impl PartialEq for SectorParams {
    fn eq(&self, other: &Self) -> bool {
        approx::relative_eq!(self.radius_km_min, other.radius_km_min)
            && approx::relative_eq!(self.angle_segment_size_deg, other.angle_segment_size_deg)
    }
}

/// A city within the distance band of a source, before sector selection.
#[derive(Debug, Clone, PartialEq)]
pub struct SectorCandidate {
    pub city: String,
    pub distance_km: f64,
    pub bearing_deg: f64,
}

/// The nearest city of one occupied angular sector of a source city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorEdge {
    pub city: String,
    pub distance_km: f64,
    pub bearing_deg: f64,
    pub segment: i32,
}

/// Source city and its outgoing sector edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorNode {
    pub city: String,
    pub edges: Vec<SectorEdge>,
}

/// Ordered mapping `source city -> [SectorEdge]`, at most one edge per sector.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectorGraph {
    nodes: Vec<SectorNode>,
    index: HashMap<String, usize>,
    pub params: SectorParams,
}

impl SectorGraph {
    fn from_nodes(nodes: Vec<SectorNode>, params: SectorParams) -> Self {
        let index = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.city.clone(), i))
            .collect();
        Self { nodes, index, params }
    }

    /// Edges of `city`; `None` means the city has no outgoing edges.
    pub fn edges(&self, city: &str) -> Option<&[SectorEdge]> {
        self.index.get(city).map(|&i| self.nodes[i].edges.as_slice())
    }

    /// Source cities with their edges, in construction order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[SectorEdge])> + '_ {
        self.nodes.iter().map(|n| (n.city.as_str(), n.edges.as_slice()))
    }

    pub fn nodes(&self) -> &[SectorNode] {
        &self.nodes
    }

    /// Number of source cities with at least one edge.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.edges.len()).sum()
    }
}

pub struct SectorGraphBuilder {
    params: SectorParams,
}

impl SectorGraphBuilder {
    pub fn new(params: SectorParams) -> Self {
        assert!(
            params.angle_segment_size_deg > 0.0,
            "angle segment size should be strictly positive, got {}",
            params.angle_segment_size_deg
        );
        Self { params }
    }

    /// Builds the graph over every city of the table, in table order.
    pub fn build_all(&self, coords: &CoordinateTable) -> SectorGraph {
        let cities: Vec<&str> = coords.cities().iter().map(String::as_str).collect();
        self.build(coords, &cities)
    }

    /// Builds the graph over `cities`, skipping those absent from `coords`.
    ///
    /// The order of `cities` decides both the order of sources in the result and
    /// the tie-break between equidistant candidates.
    pub fn build(&self, coords: &CoordinateTable, cities: &[&str]) -> SectorGraph {
        let located: Vec<(&str, Coordinate)> = cities
            .iter()
            .filter_map(|&c| coords.get(c).map(|coord| (c, coord)))
            .collect();

        info!("Building sector graph for {} cities", located.len());
        debug!(
            "Sector parameters: radius_km_min={}, max_radius_km={}, angle_segment_size_deg={}",
            self.params.radius_km_min, MAX_RADIUS_KM, self.params.angle_segment_size_deg
        );

        let nodes: Vec<SectorNode> = located
            .par_iter()
            .filter_map(|&(source, origin)| {
                let edges = self.sector_edges(source, origin, &located);
                if edges.is_empty() {
                    trace!("{} has no candidate within the distance band", source);
                    None
                } else {
                    Some(SectorNode { city: source.to_string(), edges })
                }
            })
            .collect();

        let graph = SectorGraph::from_nodes(nodes, self.params);
        info!(
            "Sector graph built: {} source cities, {} edges",
            graph.len(),
            graph.edge_count()
        );
        graph
    }

    /// Candidates of `source` that fall in the distance band, in city order.
    pub fn candidates(
        &self,
        source: &str,
        origin: Coordinate,
        located: &[(&str, Coordinate)],
    ) -> Vec<SectorCandidate> {
        located
            .iter()
            .filter(|(city, _)| *city != source)
            .filter_map(|&(city, coord)| {
                let distance_km = origin.distance_km(&coord);
                if distance_km > self.params.radius_km_min && distance_km <= MAX_RADIUS_KM {
                    Some(SectorCandidate {
                        city: city.to_string(),
                        distance_km,
                        bearing_deg: origin.bearing_deg(&coord),
                    })
                } else {
                    None
                }
            })
            .collect()
    }

    fn sector_edges(
        &self,
        source: &str,
        origin: Coordinate,
        located: &[(&str, Coordinate)],
    ) -> Vec<SectorEdge> {
        // (segment, candidates) in discovery order
        let mut sectors: Vec<(i32, Vec<SectorCandidate>)> = Vec::new();
        for cand in self.candidates(source, origin, located) {
            let segment = angle_segment(cand.bearing_deg, self.params.angle_segment_size_deg);
            match sectors.iter_mut().find(|(s, _)| *s == segment) {
                Some((_, bucket)) => bucket.push(cand),
                None => sectors.push((segment, vec![cand])),
            }
        }

        sectors
            .into_iter()
            .filter_map(|(segment, mut bucket)| {
                // stable: first met wins on equal distance
                bucket.sort_by(|a, b| {
                    a.distance_km
                        .partial_cmp(&b.distance_km)
                        .unwrap_or(std::cmp::Ordering::Equal)
                });
                bucket.into_iter().next().map(|nearest| SectorEdge {
                    city: nearest.city,
                    distance_km: nearest.distance_km,
                    bearing_deg: nearest.bearing_deg,
                    segment,
                })
            })
            .collect()
    }
}
