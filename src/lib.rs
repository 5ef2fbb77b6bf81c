//! # windspectra
//!
//! Directed inter-city wind influence as a graph, and its spectral structure.
//!
//! Pipeline: coordinates → `sector_graph` (nearest city per angular sector within
//! a distance band) → `adjacency` (one wind-weighted edge per source city, picked
//! in its wind-direction sector) → `hermitian` (Hermitian random-walk Laplacian
//! and its eigen-decomposition) → `gft` (SVD-based graph Fourier transform
//! round-trip as a numerical self-check).
//!
//! ```ignore
//! use windspectra::builder::WindGraphBuilder;
//!
//! let spectrum = WindGraphBuilder::new()
//!     .with_sector_graph(100.0, 20.0)
//!     .with_wind_segment(20.0)
//!     .with_hermitian_q(0.01)
//!     .build(&coords, &wind)?;
//! println!("{:?}", spectrum.laplacian.eigenvalues);
//! ```

pub mod adjacency;
pub mod builder;
pub mod coordinates;
pub mod errors;
pub mod geometry;
pub mod gft;
pub mod hermitian;
pub mod sector_graph;
pub mod wind;

pub use errors::{Result, WindGraphError};

#[cfg(test)]
mod tests;
