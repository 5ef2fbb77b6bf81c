use approx::assert_abs_diff_eq;
use nalgebra::DMatrix;
use num_complex::Complex64;

use crate::errors::WindGraphError;
use crate::hermitian::*;
use crate::tests::init;
use crate::tests::test_data::{dense, random_weights};

fn analyze(rows: Vec<Vec<f64>>) -> LaplacianResult {
    HermitianAnalyzer::default().analyze(&dense(rows)).unwrap()
}

#[test]
fn test_zero_out_degree_row_stays_zero() {
    init();
    let result = analyze(vec![vec![0.0, 1.0], vec![0.0, 0.0]]);
    let p = &result.transition;

    assert!(p.iter().all(|x| x.is_finite()));
    assert_eq!(p[(0, 1)], 1.0);
    assert_eq!(p[(1, 0)], 0.0);
    assert_eq!(p[(1, 1)], 0.0);

    assert_abs_diff_eq!(result.stationary[0], 0.0, epsilon = 1e-10);
    assert_abs_diff_eq!(result.stationary[1], 1.0, epsilon = 1e-10);
    assert_abs_diff_eq!(result.eigenvalues[0], 0.0, epsilon = 1e-10);
    assert_abs_diff_eq!(result.eigenvalues[1], 1.0, epsilon = 1e-10);
    assert!(result.is_hermitian);
}

#[test]
fn test_transition_rows_are_stochastic_or_zero() {
    let w = DMatrix::from_row_slice(3, 3, &[0.0, 2.0, 6.0, 0.0, 0.0, 0.0, 1.0, 1.0, 0.0]);
    let p = transition_matrix(&w);

    assert_abs_diff_eq!(p.row(0).sum(), 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(p[(0, 2)], 0.75, epsilon = 1e-12);
    assert_eq!(p.row(1).sum(), 0.0);
    assert_abs_diff_eq!(p.row(2).sum(), 1.0, epsilon = 1e-12);
}

#[test]
fn test_stationary_distribution_is_fixed_point() {
    init();
    let result = analyze(vec![
        vec![0.0, 2.0, 1.0],
        vec![1.0, 0.0, 1.0],
        vec![1.0, 1.0, 0.0],
    ]);
    let pi = &result.stationary;

    assert_abs_diff_eq!(pi.sum(), 1.0, epsilon = 1e-6);
    assert!(pi.iter().all(|&x| x >= -1e-12), "π should be nonnegative: {:?}", pi);
    let drift = result.transition.transpose() * pi - pi;
    assert!(drift.norm() < 1e-9, "Pᵗπ should equal π, drift {:e}", drift.norm());
}

#[test]
fn test_stationary_distribution_on_random_graph() {
    for seed in 0..3u64 {
        let result = HermitianAnalyzer::default().analyze(&random_weights(8, seed)).unwrap();
        let pi = &result.stationary;
        assert_abs_diff_eq!(pi.sum(), 1.0, epsilon = 1e-6);
        assert!(pi.iter().all(|&x| x > 0.0), "seed {}: irreducible chain has positive π", seed);
        let drift = result.transition.transpose() * pi - pi;
        assert!(drift.norm() < 1e-8);
    }
}

#[test]
fn test_degenerate_stationary_vector_is_an_error() {
    // Pᵗ v = v only for v ∝ [1, -1], whose components sum to zero
    let p = DMatrix::from_row_slice(2, 2, &[0.0, -1.0, -1.0, 0.0]);
    let err = stationary_distribution(&p, 1000).unwrap_err();
    assert!(matches!(err, WindGraphError::DegenerateStationaryDistribution { .. }));
}

#[test]
fn test_phase_matrix_is_conjugate_symmetric() {
    let w = DMatrix::from_row_slice(3, 3, &[0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
    let gamma = phase_matrix(&w, 0.5);

    // θ = q·(1 − 0)·PI = PI/2
    assert_abs_diff_eq!(gamma[(0, 1)].re, 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(gamma[(0, 1)].im, 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(gamma[(1, 0)].im, -1.0, epsilon = 1e-12);
    // no edge either way, and the diagonal, keep 1
    assert_eq!(gamma[(0, 2)], Complex64::new(1.0, 0.0));
    assert_eq!(gamma[(2, 1)], Complex64::new(1.0, 0.0));
    assert_eq!(gamma[(1, 1)], Complex64::new(1.0, 0.0));
    for i in 0..3 {
        for j in 0..3 {
            assert_abs_diff_eq!((gamma[(i, j)] - gamma[(j, i)].conj()).norm(), 0.0, epsilon = 1e-15);
        }
    }
}

#[test]
fn test_laplacian_is_hermitian_with_sorted_real_spectrum() {
    init();
    let w = random_weights(10, 42);
    let result = HermitianAnalyzer::new(HermitianParams { q: 0.25, ..Default::default() })
        .analyze(&w)
        .unwrap();
    let l = &result.laplacian;

    assert!(result.is_hermitian);
    assert!(is_hermitian(l, HERMITIAN_RTOL, HERMITIAN_ATOL));
    assert!((l - l.adjoint()).norm() < 1e-12);
    assert_eq!(result.q, 0.25);

    let ev = &result.eigenvalues;
    assert!(ev.as_slice().windows(2).all(|w| w[0] <= w[1]), "eigenvalues not ascending");

    // L v = λ v for every returned pair
    for k in 0..result.nnodes() {
        let v = result.eigenvectors.column(k);
        let lambda = Complex64::new(ev[k], 0.0);
        let residual = l * v - v * lambda;
        assert!(residual.norm() < 1e-9, "eigenpair {} residual {:e}", k, residual.norm());
    }
}

#[test]
fn test_laplacian_assembly_matches_definition() {
    let result = analyze(vec![
        vec![0.0, 3.0, 0.0],
        vec![1.0, 0.0, 2.0],
        vec![4.0, 0.0, 0.0],
    ]);
    let p = &result.transition;
    let pi = &result.pi;

    let p_tilde = (pi * p + p.transpose() * pi) * 0.5;
    assert!((&result.p_tilde - &p_tilde).norm() < 1e-12);
    assert!((&result.p_tilde - result.p_tilde.transpose()).norm() < 1e-12);

    let expected = to_complex(pi) - result.gamma_q.component_mul(&to_complex(&p_tilde));
    assert!((&result.laplacian - expected).norm() < 1e-12);
    assert!((&result.p_tilde_hermitian - result.p_tilde_hermitian.adjoint()).norm() < 1e-12);
}

#[test]
fn test_non_square_input_is_rejected() {
    let w = dense(vec![vec![0.0, 1.0, 2.0], vec![1.0, 0.0, 0.0]]);
    let err = HermitianAnalyzer::default().analyze(&w).unwrap_err();
    assert!(matches!(err, WindGraphError::ShapeMismatch { .. }));
}

#[test]
fn test_is_hermitian_detects_asymmetry() {
    let m = DMatrix::from_row_slice(
        2,
        2,
        &[
            Complex64::new(1.0, 0.0),
            Complex64::new(0.0, 1.0),
            Complex64::new(0.0, 1.0),
            Complex64::new(2.0, 0.0),
        ],
    );
    assert!(!is_hermitian(&m, HERMITIAN_RTOL, HERMITIAN_ATOL));

    // A + Aᴴ is always Hermitian
    let sym = &m + m.adjoint();
    assert!(is_hermitian(&sym, HERMITIAN_RTOL, HERMITIAN_ATOL));
}

#[test]
fn test_combinatorial_laplacian_rows_sum_to_zero() {
    let w = random_weights(6, 5);
    let l = combinatorial_laplacian(&w).unwrap();

    for i in 0..6 {
        assert_abs_diff_eq!(l.row(i).sum(), 0.0, epsilon = 1e-12);
        assert!(l[(i, i)] > 0.0);
    }
    assert!((&l - l.transpose()).norm() < 1e-12);
}

#[test]
fn test_mixed_sign_stationary_vector_is_an_error() {
    // Pᵗ has eigenvalues {1, -1}; the eigenvector for 1 is [1, -(1 - δ)], whose
    // sum clears the absolute tolerance but normalises to huge opposite-sign entries
    let delta = 1e-9;
    let s = 1.0 / (2.0 - delta);
    let p = DMatrix::from_row_slice(
        2,
        2,
        &[delta * s, -2.0 * (1.0 - delta) * s, -2.0 * s, -delta * s],
    );
    let err = stationary_distribution(&p, 1000).unwrap_err();
    match err {
        WindGraphError::DegenerateStationaryDistribution { sum } => {
            assert!(sum.abs() > DEGENERATE_SUM_TOL, "sum {:e} should pass the absolute check", sum)
        }
        other => panic!("unexpected error {:?}", other),
    }
}
