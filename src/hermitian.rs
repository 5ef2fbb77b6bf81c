//! # Hermitian random-walk Laplacian of a directed weighted graph
//!
//! Given a real, possibly asymmetric adjacency `W`:
//!
//! 1. `P = D_out⁻¹ W`, zero out-degrees replaced by 1 so empty rows stay zero
//! 2. stationary `π` with `Pᵗπ = π`: eigenvector of `Pᵗ` for the eigenvalue
//!    closest to 1, real part, normalised to sum 1
//! 3. `Π = diag(π)`, `P̃ = ½(ΠP + PᵗΠ)`
//! 4. phase `Γ_q[i,j] = exp(i·q·(W[i,j] − W[j,i])·PI)` on pairs linked in either
//!    direction, 1 elsewhere
//! 5. `P̃_H = Γ_q ⊙ P̃`, `L = Π − P̃_H`
//! 6. Hermitian check of `L`, then a Hermitian eigen-decomposition with real
//!    eigenvalues sorted ascending
//!
//! `Γ_q` is conjugate-symmetric and `P̃` is symmetric, so `L` is Hermitian by
//! construction; the check is reported, never enforced.

use std::cmp::Ordering;

use log::{debug, info, trace, warn};
use nalgebra::{DMatrix, DVector, Schur, SymmetricEigen, SVD};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use smartcore::linalg::basic::arrays::Array;
use smartcore::linalg::basic::matrix::DenseMatrix;

use crate::adjacency::AdjacencyMatrix;
use crate::errors::{Result, WindGraphError};

/// A stationary vector whose components sum below this is not normalisable.
pub const DEGENERATE_SUM_TOL: f64 = 1e-12;

/// A normalised stationary vector with a component below `-NEGATIVE_MASS_TOL`
/// came from a mixed-sign eigenvector and is not a distribution.
pub const NEGATIVE_MASS_TOL: f64 = 1e-9;

/// Relative and absolute tolerance of the Hermitian check.
pub const HERMITIAN_RTOL: f64 = 1e-5;
pub const HERMITIAN_ATOL: f64 = 1e-8;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct HermitianParams {
    /// Phase parameter of `Γ_q`.
    pub q: f64,
    /// Iteration cap handed to the eigen and SVD solvers.
    pub max_iterations: usize,
}

impl Default for HermitianParams {
    fn default() -> Self {
        Self { q: 0.01, max_iterations: 10_000 }
    }
}

impl PartialEq for HermitianParams {
    fn eq(&self, other: &Self) -> bool {
        approx::relative_eq!(self.q, other.q) && self.max_iterations == other.max_iterations
    }
}

/// Every intermediate of one Hermitian analysis pass.
#[derive(Debug, Clone)]
pub struct LaplacianResult {
    /// Row-normalised transition matrix `P`.
    pub transition: DMatrix<f64>,
    /// Stationary distribution `π`.
    pub stationary: DVector<f64>,
    /// `Π = diag(π)`.
    pub pi: DMatrix<f64>,
    /// Symmetrised transition `P̃`.
    pub p_tilde: DMatrix<f64>,
    pub gamma_q: DMatrix<Complex64>,
    pub p_tilde_hermitian: DMatrix<Complex64>,
    /// Hermitian random-walk Laplacian `L = Π − P̃_H`.
    pub laplacian: DMatrix<Complex64>,
    /// Real eigenvalues of `L`, ascending.
    pub eigenvalues: DVector<f64>,
    /// Eigenvectors of `L` as columns, matching `eigenvalues`.
    pub eigenvectors: DMatrix<Complex64>,
    pub q: f64,
    pub is_hermitian: bool,
}

impl LaplacianResult {
    pub fn nnodes(&self) -> usize {
        self.laplacian.nrows()
    }
}

pub struct HermitianAnalyzer {
    params: HermitianParams,
}

impl Default for HermitianAnalyzer {
    fn default() -> Self {
        Self::new(HermitianParams::default())
    }
}

impl HermitianAnalyzer {
    pub fn new(params: HermitianParams) -> Self {
        Self { params }
    }

    pub fn analyze_adjacency(&self, adj: &AdjacencyMatrix) -> Result<LaplacianResult> {
        self.analyze(&adj.matrix)
    }

    pub fn analyze(&self, w: &DenseMatrix<f64>) -> Result<LaplacianResult> {
        let w = to_dmatrix(w)?;
        let n = w.nrows();
        if n == 0 {
            return Err(WindGraphError::EmptyGraph);
        }
        info!("Computing Hermitian random-walk Laplacian for {} nodes", n);
        debug!("Hermitian parameters: {:?}", self.params);

        let transition = transition_matrix(&w);
        let stationary = stationary_distribution(&transition, self.params.max_iterations)?;
        debug!("Stationary distribution: sum={:.6}", stationary.sum());
        trace!("π = {:?}", stationary.as_slice());

        let pi = DMatrix::from_diagonal(&stationary);
        let p_tilde = (&pi * &transition + transition.transpose() * &pi) * 0.5;
        let gamma_q = phase_matrix(&w, self.params.q);
        let p_tilde_hermitian = gamma_q.component_mul(&to_complex(&p_tilde));
        let laplacian = to_complex(&pi) - &p_tilde_hermitian;

        let is_hermitian = is_hermitian(&laplacian, HERMITIAN_RTOL, HERMITIAN_ATOL);
        if is_hermitian {
            debug!("L is Hermitian");
        } else {
            warn!("L failed the Hermitian check, eigenvalues are suspect");
        }

        let (eigenvalues, eigenvectors) =
            sorted_hermitian_eigen(laplacian.clone(), self.params.max_iterations)?;
        debug!(
            "Eigenvalues of L: min={:.6}, max={:.6}",
            eigenvalues.min(),
            eigenvalues.max()
        );
        info!("Hermitian Laplacian spectrum computed");

        Ok(LaplacianResult {
            transition,
            stationary,
            pi,
            p_tilde,
            gamma_q,
            p_tilde_hermitian,
            laplacian,
            eigenvalues,
            eigenvectors,
            q: self.params.q,
            is_hermitian,
        })
    }
}

/// Copies a square smartcore matrix into nalgebra.
pub fn to_dmatrix(w: &DenseMatrix<f64>) -> Result<DMatrix<f64>> {
    let (rows, cols) = w.shape();
    if rows != cols {
        return Err(WindGraphError::ShapeMismatch {
            expected: "square matrix".to_string(),
            found: format!("{}x{}", rows, cols),
        });
    }
    Ok(DMatrix::from_fn(rows, cols, |i, j| *w.get((i, j))))
}

pub fn to_complex(m: &DMatrix<f64>) -> DMatrix<Complex64> {
    m.map(|x| Complex64::new(x, 0.0))
}

/// `P = W / out_degree` row-wise, with zero out-degrees replaced by 1.
pub fn transition_matrix(w: &DMatrix<f64>) -> DMatrix<f64> {
    let mut p = w.clone();
    for (i, mut row) in p.row_iter_mut().enumerate() {
        let out_degree = w.row(i).sum();
        let out_degree = if out_degree == 0.0 { 1.0 } else { out_degree };
        row /= out_degree;
    }
    p
}

/// Left eigenvector of `P` for the eigenvalue closest to 1, normalised to sum 1.
///
/// Fails when the eigenvector sums to (near) zero or, once normalised, has
/// clearly negative components.
pub fn stationary_distribution(p: &DMatrix<f64>, max_iterations: usize) -> Result<DVector<f64>> {
    let n = p.nrows();
    if n == 0 {
        return Err(WindGraphError::EmptyGraph);
    }
    let pt = p.transpose();

    let eigenvalues = Schur::try_new(pt.clone(), f64::EPSILON, max_iterations)
        .ok_or(WindGraphError::SolverFailure { stage: "eigenvalues of Pᵗ" })?
        .complex_eigenvalues();
    let one = Complex64::new(1.0, 0.0);
    let lambda = eigenvalues
        .iter()
        .copied()
        .min_by(|a, b| {
            (a - one).norm().partial_cmp(&(b - one).norm()).unwrap_or(Ordering::Equal)
        })
        .ok_or(WindGraphError::EmptyGraph)?;
    trace!("Eigenvalue of Pᵗ closest to 1: {}", lambda);

    // eigenvector = null vector of (Pᵗ − λI): right singular vector of the smallest singular value
    let shifted = to_complex(&pt) - DMatrix::from_diagonal_element(n, n, lambda);
    let svd = SVD::try_new(shifted, false, true, f64::EPSILON, max_iterations)
        .ok_or(WindGraphError::SolverFailure { stage: "SVD of Pᵗ − λI" })?;
    let v_t = svd
        .v_t
        .ok_or(WindGraphError::SolverFailure { stage: "SVD of Pᵗ − λI" })?;
    let k = argmin(svd.singular_values.iter().copied());
    let v: Vec<Complex64> = v_t.row(k).iter().map(|z| z.conj()).collect();

    // rotate out the arbitrary global phase before taking the real part
    let anchor = v
        .iter()
        .copied()
        .max_by(|a, b| a.norm().partial_cmp(&b.norm()).unwrap_or(Ordering::Equal))
        .unwrap_or(one);
    let phase = if anchor.norm() > 0.0 { anchor.conj() / anchor.norm() } else { one };
    let pi = DVector::from_iterator(n, v.iter().map(|z| (z * phase).re));

    let sum = pi.sum();
    if !sum.is_finite() || sum.abs() < DEGENERATE_SUM_TOL {
        return Err(WindGraphError::DegenerateStationaryDistribution { sum });
    }
    let pi = pi / sum;
    if pi.iter().any(|&x| x < -NEGATIVE_MASS_TOL) {
        debug!("Stationary vector has negative mass, min component {:e}", pi.min());
        return Err(WindGraphError::DegenerateStationaryDistribution { sum });
    }
    Ok(pi)
}

/// `Γ_q[i,j] = exp(i·q·(W[i,j] − W[j,i])·PI)` for linked off-diagonal pairs, 1 elsewhere.
pub fn phase_matrix(w: &DMatrix<f64>, q: f64) -> DMatrix<Complex64> {
    let n = w.nrows();
    DMatrix::from_fn(n, n, |i, j| {
        if i != j && (w[(i, j)] > 0.0 || w[(j, i)] > 0.0) {
            let theta = q * (w[(i, j)] - w[(j, i)]) * std::f64::consts::PI;
            Complex64::from_polar(1.0, theta)
        } else {
            Complex64::new(1.0, 0.0)
        }
    })
}

/// `|a − b| <= atol + rtol·|b|` entrywise between `m` and its conjugate transpose.
pub fn is_hermitian(m: &DMatrix<Complex64>, rtol: f64, atol: f64) -> bool {
    if m.nrows() != m.ncols() {
        return false;
    }
    let adjoint = m.adjoint();
    m.iter()
        .zip(adjoint.iter())
        .all(|(a, b)| (a - b).norm() <= atol + rtol * b.norm())
}

/// Hermitian eigen-decomposition with eigenvalues ascending and columns permuted to match.
pub fn sorted_hermitian_eigen(
    m: DMatrix<Complex64>,
    max_iterations: usize,
) -> Result<(DVector<f64>, DMatrix<Complex64>)> {
    let n = m.nrows();
    let eig = SymmetricEigen::try_new(m, f64::EPSILON, max_iterations)
        .ok_or(WindGraphError::SolverFailure { stage: "Hermitian eigen-decomposition of L" })?;

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        eig.eigenvalues[a]
            .partial_cmp(&eig.eigenvalues[b])
            .unwrap_or(Ordering::Equal)
    });

    let eigenvalues = DVector::from_iterator(n, order.iter().map(|&k| eig.eigenvalues[k]));
    let eigenvectors = DMatrix::from_fn(n, n, |r, c| eig.eigenvectors[(r, order[c])]);
    Ok((eigenvalues, eigenvectors))
}

/// Symmetrised combinatorial Laplacian `D − W_s`, `W_s = (W + Wᵗ)/2`.
pub fn combinatorial_laplacian(w: &DenseMatrix<f64>) -> Result<DMatrix<f64>> {
    let w = to_dmatrix(w)?;
    let ws = (&w + w.transpose()) * 0.5;
    let degrees = DVector::from_iterator(ws.nrows(), ws.row_iter().map(|r| r.sum()));
    Ok(DMatrix::from_diagonal(&degrees) - ws)
}

fn argmin(values: impl Iterator<Item = f64>) -> usize {
    values
        .enumerate()
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal))
        .map(|(i, _)| i)
        .unwrap_or(0)
}
