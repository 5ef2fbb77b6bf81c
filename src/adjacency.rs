//! # Wind-conditioned reduction of the sector graph
//!
//! Each source city with a wind observation keeps at most one edge: the nearest
//! sector neighbour lying in the sector of its wind direction. The wind speed is
//! written as `A[target, source]`: wind direction is where the wind comes *from*,
//! so transport flows from the target towards the source and the column is the
//! wind-originating city.
//!
//! A target whose row already holds a positive entry is not eligible. Source
//! cities are visited in sector-graph order, so the outcome depends on that order.
//!
//! Invariant: every column has at most one nonzero entry.

use log::{debug, info, trace, warn};
use smartcore::linalg::basic::arrays::{Array, Array2, MutArray};
use smartcore::linalg::basic::matrix::DenseMatrix;
use sprs::{CsMat, TriMat};

use crate::coordinates::CoordinateTable;
use crate::errors::{Result, WindGraphError};
use crate::geometry::angle_segment;
use crate::sector_graph::{SectorEdge, SectorGraph};
use crate::wind::WindTable;

/// Row diagnostics of an adjacency matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionCounts {
    pub nodes: usize,
    pub rows_with_one: usize,
    pub rows_with_zero: usize,
}

/// Dense `n × n` wind-weighted adjacency with the city order indexing it.
#[derive(Debug, Clone)]
pub struct AdjacencyMatrix {
    pub matrix: DenseMatrix<f64>,
    pub cities: Vec<String>,
}

impl AdjacencyMatrix {
    pub fn zeros(cities: Vec<String>) -> Self {
        let n = cities.len();
        Self { matrix: DenseMatrix::zeros(n, n), cities }
    }

    /// Builds from explicit rows; `rows` must be `cities.len()` square.
    pub fn from_rows(cities: Vec<String>, rows: &[Vec<f64>]) -> Result<Self> {
        let n = cities.len();
        if rows.len() != n || rows.iter().any(|r| r.len() != n) {
            return Err(WindGraphError::ShapeMismatch {
                expected: format!("{}x{}", n, n),
                found: format!(
                    "{}x{}",
                    rows.len(),
                    rows.first().map(|r| r.len()).unwrap_or(0)
                ),
            });
        }
        let mut adj = Self::zeros(cities);
        for (i, row) in rows.iter().enumerate() {
            for (j, &v) in row.iter().enumerate() {
                if v != 0.0 {
                    adj.matrix.set((i, j), v);
                }
            }
        }
        Ok(adj)
    }

    pub fn nnodes(&self) -> usize {
        self.cities.len()
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        *self.matrix.get((i, j))
    }

    pub fn index_of(&self, city: &str) -> Option<usize> {
        self.cities.iter().position(|c| c == city)
    }

    /// Node signal: weighted sum of each row.
    pub fn row_sums(&self) -> Vec<f64> {
        let n = self.nnodes();
        (0..n).map(|i| (0..n).map(|j| self.get(i, j)).sum()).collect()
    }

    /// Whether a row holds any positive entry.
    pub fn row_has_positive(&self, i: usize) -> bool {
        (0..self.nnodes()).any(|j| self.get(i, j) > 0.0)
    }

    /// Nonzero count of column `j`.
    pub fn column_nnz(&self, j: usize) -> usize {
        (0..self.nnodes()).filter(|&i| self.get(i, j) != 0.0).count()
    }

    /// Sparse CSR copy keeping only nonzero entries.
    pub fn to_csr(&self) -> CsMat<f64> {
        let n = self.nnodes();
        let mut tri = TriMat::new((n, n));
        for i in 0..n {
            for j in 0..n {
                let v = self.get(i, j);
                if v != 0.0 {
                    tri.add_triplet(i, j, v);
                }
            }
        }
        tri.to_csr()
    }

    pub fn edge_count(&self) -> usize {
        self.to_csr().nnz()
    }

    pub fn is_directed(&self) -> bool {
        let n = self.nnodes();
        (0..n).any(|i| (0..i).any(|j| self.get(i, j) != self.get(j, i)))
    }

    pub fn connection_counts(&self) -> ConnectionCounts {
        let csr = self.to_csr();
        let mut counts =
            ConnectionCounts { nodes: self.nnodes(), rows_with_one: 0, rows_with_zero: 0 };
        for row in csr.outer_iterator() {
            match row.nnz() {
                0 => counts.rows_with_zero += 1,
                1 => counts.rows_with_one += 1,
                _ => {}
            }
        }
        counts
    }
}

pub struct WindAdjacencyReducer {
    wind_segment_size_deg: f64,
}

impl Default for WindAdjacencyReducer {
    fn default() -> Self {
        Self { wind_segment_size_deg: 20.0 }
    }
}

impl WindAdjacencyReducer {
    pub fn new(wind_segment_size_deg: f64) -> Self {
        assert!(
            wind_segment_size_deg > 0.0,
            "wind segment size should be strictly positive, got {}",
            wind_segment_size_deg
        );
        Self { wind_segment_size_deg }
    }

    /// Reduces the sector graph to a wind-weighted adjacency indexed by `coords` order.
    pub fn reduce(
        &self,
        graph: &SectorGraph,
        coords: &CoordinateTable,
        wind: &WindTable,
    ) -> AdjacencyMatrix {
        let mut adj = AdjacencyMatrix::zeros(coords.cities().to_vec());
        info!(
            "Reducing sector graph of {} sources into {}x{} wind adjacency",
            graph.len(),
            adj.nnodes(),
            adj.nnodes()
        );
        debug!("Wind segment size: {} deg", self.wind_segment_size_deg);

        for (source, edges) in graph.iter() {
            let Some(obs) = wind.get(source) else {
                trace!("{} has no wind observation", source);
                continue;
            };
            if !obs.direction_deg.is_finite() || !obs.speed_ms.is_finite() {
                warn!(
                    "{} has a non-finite wind observation (speed {}, direction {}), skipping it",
                    source, obs.speed_ms, obs.direction_deg
                );
                continue;
            }
            let Some(source_idx) = coords.index_of(source) else {
                continue;
            };

            let wind_segment = angle_segment(obs.direction_deg, self.wind_segment_size_deg);
            match self.select_target(&adj, coords, edges, wind_segment) {
                Some((target_idx, edge)) => {
                    trace!(
                        "{} <- {}: speed {} over {:.1} km (segment {})",
                        edge.city,
                        source,
                        obs.speed_ms,
                        edge.distance_km,
                        wind_segment
                    );
                    adj.matrix.set((target_idx, source_idx), obs.speed_ms);
                }
                None => trace!("{} has no eligible city in wind segment {}", source, wind_segment),
            }
        }

        let counts = adj.connection_counts();
        info!("Wind adjacency built: {} nodes", counts.nodes);
        debug!(
            "Rows with exactly 1 connection: {}, rows with 0 connections: {}",
            counts.rows_with_one, counts.rows_with_zero
        );
        adj
    }

    /// Nearest eligible edge in `wind_segment`; first edge wins on equal distance.
    fn select_target<'e>(
        &self,
        adj: &AdjacencyMatrix,
        coords: &CoordinateTable,
        edges: &'e [SectorEdge],
        wind_segment: i32,
    ) -> Option<(usize, &'e SectorEdge)> {
        let mut best: Option<(usize, &SectorEdge)> = None;
        for edge in edges.iter().filter(|e| e.segment == wind_segment) {
            let Some(target_idx) = coords.index_of(&edge.city) else {
                continue;
            };
            if adj.row_has_positive(target_idx) {
                continue;
            }
            match best {
                Some((_, b)) if b.distance_km <= edge.distance_km => {}
                _ => best = Some((target_idx, edge)),
            }
        }
        best
    }
}
