//! Error taxonomy for the wind-graph pipeline.
//!
//! Geometric and graph-construction anomalies (a city without coordinates, an
//! empty angular sector) are filtering rules and never show up here. Only the
//! numerical stages and malformed inputs surface as errors.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, WindGraphError>;

#[derive(Debug, Error)]
pub enum WindGraphError {
    /// The eigenvector selected for the stationary distribution cannot be normalised.
    #[error("stationary distribution is degenerate: eigenvector components sum to {sum:e}")]
    DegenerateStationaryDistribution { sum: f64 },

    /// An eigen-decomposition or SVD did not converge within the iteration cap.
    #[error("{stage} did not converge")]
    SolverFailure { stage: &'static str },

    #[error("cannot run spectral analysis on an empty graph")]
    EmptyGraph,

    #[error("shape mismatch: expected {expected}, found {found}")]
    ShapeMismatch { expected: String, found: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Coordinate cache or pipeline configuration could not be parsed.
    #[error("invalid JSON input: {0}")]
    Json(#[from] serde_json::Error),
}
