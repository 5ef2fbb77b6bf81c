//! SVD-based graph Fourier transform and its inverse.
//!
//! With `L = U Σ Vᴴ`:
//! - forward: `z1 = (Uᴴ + Vᴴ) x / 2`, `z2 = (Uᴴ − Vᴴ) x / 2`
//! - inverse: `x̂ = ½ (U (z1 + z2) + V (z1 − z2))`
//!
//! Since `U` and `V` are unitary the round-trip is exact up to solver precision;
//! the reconstruction error only serves as a self-check of the spectral stage.

use log::{debug, info, warn};
use nalgebra::{DMatrix, DVector, SVD};
use num_complex::Complex64;

use crate::errors::{Result, WindGraphError};
use crate::hermitian::to_complex;

/// Round-trip error above which the decomposition is reported as suspect.
pub const ROUNDTRIP_TOL: f64 = 1e-8;

/// Full SVD factors of a square operator.
#[derive(Debug, Clone)]
pub struct SvdGft {
    pub u: DMatrix<Complex64>,
    pub singular_values: DVector<f64>,
    pub v: DMatrix<Complex64>,
}

/// A node signal with its half-spectrum components and round-trip check.
#[derive(Debug, Clone)]
pub struct SpectralSignal {
    pub signal: DVector<f64>,
    pub z1: DVector<Complex64>,
    pub z2: DVector<Complex64>,
    pub reconstructed: DVector<Complex64>,
    pub reconstruction_error: f64,
}

impl SpectralSignal {
    /// `[z1; z2]`, length `2n`.
    pub fn spectrum(&self) -> DVector<Complex64> {
        let n = self.z1.len();
        DVector::from_fn(2 * n, |i, _| if i < n { self.z1[i] } else { self.z2[i - n] })
    }
}

impl SvdGft {
    pub fn decompose(l: &DMatrix<Complex64>, max_iterations: usize) -> Result<Self> {
        if l.nrows() != l.ncols() {
            return Err(WindGraphError::ShapeMismatch {
                expected: "square matrix".to_string(),
                found: format!("{}x{}", l.nrows(), l.ncols()),
            });
        }
        if l.nrows() == 0 {
            return Err(WindGraphError::EmptyGraph);
        }
        let svd = SVD::try_new(l.clone(), true, true, f64::EPSILON, max_iterations)
            .ok_or(WindGraphError::SolverFailure { stage: "SVD of L" })?;
        let (u, v_t) = match (svd.u, svd.v_t) {
            (Some(u), Some(v_t)) => (u, v_t),
            _ => return Err(WindGraphError::SolverFailure { stage: "SVD of L" }),
        };
        debug!("SVD of {}x{} operator computed", l.nrows(), l.ncols());
        Ok(Self { u, singular_values: svd.singular_values, v: v_t.adjoint() })
    }

    pub fn decompose_real(l: &DMatrix<f64>, max_iterations: usize) -> Result<Self> {
        Self::decompose(&to_complex(l), max_iterations)
    }

    pub fn forward(&self, x: &DVector<Complex64>) -> (DVector<Complex64>, DVector<Complex64>) {
        let ux = self.u.adjoint() * x;
        let vx = self.v.adjoint() * x;
        let z1 = (&ux + &vx) * Complex64::new(0.5, 0.0);
        let z2 = (ux - vx) * Complex64::new(0.5, 0.0);
        (z1, z2)
    }

    pub fn inverse(&self, z1: &DVector<Complex64>, z2: &DVector<Complex64>) -> DVector<Complex64> {
        (&self.u * (z1 + z2) + &self.v * (z1 - z2)) * Complex64::new(0.5, 0.0)
    }

    /// Forward then inverse transform of a real signal, with the reconstruction error.
    pub fn roundtrip(&self, signal: &[f64]) -> Result<SpectralSignal> {
        let n = self.u.nrows();
        if signal.len() != n {
            return Err(WindGraphError::ShapeMismatch {
                expected: format!("signal of length {}", n),
                found: format!("length {}", signal.len()),
            });
        }
        let signal = DVector::from_column_slice(signal);
        let x = signal.map(|v| Complex64::new(v, 0.0));
        let (z1, z2) = self.forward(&x);
        let reconstructed = self.inverse(&z1, &z2);
        let reconstruction_error = (&x - &reconstructed).norm();

        if reconstruction_error < ROUNDTRIP_TOL {
            info!("GFT round-trip reconstruction error: {:e}", reconstruction_error);
        } else {
            warn!(
                "GFT round-trip reconstruction error {:e} exceeds {:e}",
                reconstruction_error, ROUNDTRIP_TOL
            );
        }
        Ok(SpectralSignal { signal, z1, z2, reconstructed, reconstruction_error })
    }
}

/// Decomposes `l` and runs the round-trip on `signal`.
pub fn validate_roundtrip(
    l: &DMatrix<Complex64>,
    signal: &[f64],
    max_iterations: usize,
) -> Result<SpectralSignal> {
    SvdGft::decompose(l, max_iterations)?.roundtrip(signal)
}
