use log::{debug, info, trace};
use serde::{Deserialize, Serialize};

use crate::adjacency::{AdjacencyMatrix, WindAdjacencyReducer};
use crate::coordinates::{CoordinateProvider, CoordinateTable};
use crate::errors::{Result, WindGraphError};
use crate::gft::{SpectralSignal, SvdGft};
use crate::hermitian::{HermitianAnalyzer, HermitianParams, LaplacianResult};
use crate::sector_graph::{SectorGraph, SectorGraphBuilder, SectorParams};
use crate::wind::WindTable;

/// All recognised pipeline options; missing JSON fields fall back to defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub sector: SectorParams,
    pub wind_segment_size_deg: f64,
    pub hermitian: HermitianParams,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sector: SectorParams::default(),
            wind_segment_size_deg: 20.0,
            hermitian: HermitianParams::default(),
        }
    }
}

impl PipelineConfig {
    /// Parses and validates a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Sector widths must be finite and strictly positive.
    pub fn validate(&self) -> Result<()> {
        let widths = [
            ("sector.angle_segment_size_deg", self.sector.angle_segment_size_deg),
            ("wind_segment_size_deg", self.wind_segment_size_deg),
        ];
        for (name, value) in widths {
            if !(value.is_finite() && value > 0.0) {
                return Err(WindGraphError::InvalidConfig(format!(
                    "{} should be strictly positive, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// Output of one pipeline run.
#[derive(Debug, Clone)]
pub struct WindSpectrum {
    pub sector_graph: SectorGraph,
    pub adjacency: AdjacencyMatrix,
    pub laplacian: LaplacianResult,
    pub signal: SpectralSignal,
}

pub struct WindGraphBuilder {
    config: PipelineConfig,
}

impl Default for WindGraphBuilder {
    fn default() -> Self {
        debug!("Creating WindGraphBuilder with default parameters");
        Self { config: PipelineConfig::default() }
    }
}

impl WindGraphBuilder {
    pub fn new() -> Self {
        info!("Initializing new WindGraphBuilder");
        Self::default()
    }

    pub fn from_config(config: PipelineConfig) -> Self {
        info!("Initializing WindGraphBuilder from config: {:?}", config);
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    // -------------------- Configuration --------------------

    /// Topology of the sector graph:
    /// - radius_km_min: exclusive lower bound of the distance band
    /// - angle_segment_size_deg: width of the angular sectors
    pub fn with_sector_graph(mut self, radius_km_min: f64, angle_segment_size_deg: f64) -> Self {
        info!(
            "Configuring sector graph: radius_km_min={}, angle_segment_size_deg={}",
            radius_km_min, angle_segment_size_deg
        );
        self.config.sector = SectorParams { radius_km_min, angle_segment_size_deg };
        self
    }

    /// Sector width used to match a city's wind direction against its edges.
    pub fn with_wind_segment(mut self, wind_segment_size_deg: f64) -> Self {
        info!("Setting wind segment size: {}", wind_segment_size_deg);
        self.config.wind_segment_size_deg = wind_segment_size_deg;
        self
    }

    pub fn with_hermitian_q(mut self, q: f64) -> Self {
        info!("Setting Hermitian phase parameter q={}", q);
        self.config.hermitian.q = q;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        debug!("Setting solver iteration cap: {}", max_iterations);
        self.config.hermitian.max_iterations = max_iterations;
        self
    }

    // -------------------- Build --------------------

    /// Resolves the table's districts through `provider`, then runs `build`.
    pub fn build_with_provider<P>(&self, provider: &P, wind: &WindTable) -> Result<WindSpectrum>
    where
        P: CoordinateProvider + ?Sized,
    {
        let coords = CoordinateTable::resolve_all(provider, wind.districts());
        self.build(&coords, wind)
    }

    /// Runs the whole pipeline:
    /// 1. sector graph over the table's districts that have coordinates, in table order
    /// 2. wind adjacency indexed by coordinate-table order
    /// 3. Hermitian random-walk Laplacian and its spectrum
    /// 4. SVD-GFT round-trip of the adjacency row sums
    pub fn build(&self, coords: &CoordinateTable, wind: &WindTable) -> Result<WindSpectrum> {
        info!(
            "Building wind spectrum from {} wind rows and {} coordinates",
            wind.len(),
            coords.len()
        );
        debug!("Build configuration: {:?}", self.config);
        self.config.validate()?;

        let cities: Vec<&str> = wind.districts().filter(|c| coords.contains(c)).collect();
        trace!("{} districts have coordinates", cities.len());

        let sector_graph = SectorGraphBuilder::new(self.config.sector).build(coords, &cities);

        let adjacency = WindAdjacencyReducer::new(self.config.wind_segment_size_deg)
            .reduce(&sector_graph, coords, wind);
        debug!(
            "Adjacency: {} nodes, {} edges, directed={}",
            adjacency.nnodes(),
            adjacency.edge_count(),
            adjacency.is_directed()
        );

        let laplacian = HermitianAnalyzer::new(self.config.hermitian).analyze_adjacency(&adjacency)?;

        let signal = SvdGft::decompose(&laplacian.laplacian, self.config.hermitian.max_iterations)?
            .roundtrip(&adjacency.row_sums())?;

        info!("Wind spectrum build completed successfully");
        Ok(WindSpectrum { sector_graph, adjacency, laplacian, signal })
    }
}
