/////////////////////////////////////////////////////////////////////////////////////////////
//
// Adds the SVD based pseudo-inverse solve used to fit thin plate spline systems.
//
// Created on: 15 Nov 2025     Author: Daniel Owen 
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License. 
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # linalg
//!
//! Helper linear algebra functionality.
//!
//! The thin plate spline saddle-point system is symmetric but indefinite, and
//! becomes singular for duplicate or collinear control points. It is solved
//! through the Moore-Penrose pseudo-inverse `X = V Σ⁺ Uᵀ B`, which returns the
//! minimum-norm least-squares solution whenever the system is rank deficient.

use crate::error::{TpsError, TpsResult};
use faer::Mat;

/// Result of a pseudo-inverse solve.
#[derive(Debug)]
pub(crate) struct PinvSolution {
    /// Minimum-norm least-squares solution, one column per right-hand side.
    pub solution: Mat<f64>,

    /// Number of singular values kept above the cutoff.
    pub rank: usize,
}

/// Solves `lhs · X = rhs` through the SVD pseudo-inverse of `lhs`.
///
/// Singular values `σ_i <= rcond · σ_max` are dropped.
///
/// ### Errors
/// Returns [`TpsError::SingularSystem`] when `lhs` holds non-finite entries,
/// the SVD does not converge, every singular value is dropped, or the solution
/// is not finite.
pub(crate) fn pinv_solve(lhs: &Mat<f64>, rhs: &Mat<f64>, rcond: f64) -> TpsResult<PinvSolution> {
    debug_assert_eq!(lhs.nrows(), rhs.nrows(), "lhs and rhs row counts differ");

    if !all_finite(lhs) {
        return Err(TpsError::SingularSystem {
            reason: "system matrix contains non-finite entries".to_string(),
        });
    }

    let svd = lhs.svd().map_err(|err| TpsError::SingularSystem {
        reason: format!("singular value decomposition failed: {:?}", err),
    })?;

    let u = svd.U();
    let v = svd.V();
    let sigma: Vec<f64> = svd.S().column_vector().iter().cloned().collect();

    let sigma_max = sigma.iter().cloned().fold(0.0, f64::max);
    let cutoff = rcond * sigma_max;

    // Uᵀ B, then scale row i by 1/σ_i (or zero it below the cutoff).
    let mut projected = u.transpose() * rhs.as_ref();
    let mut rank = 0;

    for (i, &s) in sigma.iter().enumerate() {
        let inv = match s > cutoff && s > 0.0 {
            true => {
                rank += 1;
                1.0 / s
            }
            false => 0.0,
        };

        for j in 0..projected.ncols() {
            projected[(i, j)] *= inv;
        }
    }

    if rank == 0 {
        return Err(TpsError::SingularSystem {
            reason: "all singular values fall below the cutoff".to_string(),
        });
    }

    let solution = v * projected.as_ref();

    if !all_finite(&solution) {
        return Err(TpsError::SingularSystem {
            reason: "pseudo-inverse produced non-finite coefficients".to_string(),
        });
    }

    Ok(PinvSolution { solution, rank })
}

/// Returns `true` when every entry of `mat` is finite.
pub(crate) fn all_finite(mat: &Mat<f64>) -> bool {
    mat.col_iter().all(|col| col.iter().all(|x| x.is_finite()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use equator::assert;
    use faer::{self, mat, prelude::Solve, utils::approx::*};

    /// Deterministic, well conditioned, non-symmetric matrix.
    fn make_regular(n: usize) -> Mat<f64> {
        let mut m = Mat::<f64>::zeros(n, n);
        for i in 0..n {
            for j in 0..n {
                let x = (i as f64 + 1.0) * (j as f64 + 2.0);
                m[(i, j)] = (x.sin() + 2.0 * x.cos()) / (1.0 + (i + j + 1) as f64);
            }
            m[(i, i)] += 4.0;
        }
        m
    }

    #[test]
    fn regular_system_matches_lu() {
        let n = 9usize;
        let a = make_regular(n);
        let b = Mat::<f64>::from_fn(n, 2, |i, j| (i + 1 + 3 * j) as f64 / (1.0 + i as f64));

        let pinv = pinv_solve(&a, &b, n as f64 * f64::EPSILON).unwrap();
        let x_lu = a.partial_piv_lu().solve(&b);

        let approx_eq = CwiseMat(ApproxEq::eps() * 1024.0 * (n as f64));

        assert!(pinv.rank == n);
        assert!(&a * &pinv.solution ~ b);
        assert!(&pinv.solution ~ &x_lu);
    }

    #[test]
    fn rank_deficient_system_returns_minimum_norm_solution() {
        // Two identical equations: x + y = 2. Minimum-norm solution is (1, 1).
        let a = mat![[1.0, 1.0], [1.0, 1.0]];
        let b = mat![[2.0], [2.0]];

        let pinv = pinv_solve(&a, &b, 1e-12).unwrap();

        assert!(pinv.rank == 1);
        assert!((pinv.solution[(0, 0)] - 1.0).abs() < 1e-12);
        assert!((pinv.solution[(1, 0)] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn inconsistent_system_returns_least_squares_solution() {
        // x = 0 and x = 2 cannot both hold; least squares picks x = 1.
        let a = mat![[1.0], [1.0]];
        let b = mat![[0.0], [2.0]];

        let pinv = pinv_solve(&a, &b, 1e-12).unwrap();

        assert!((pinv.solution[(0, 0)] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn zero_matrix_is_singular() {
        let a = Mat::<f64>::zeros(3, 3);
        let b = Mat::<f64>::from_fn(3, 1, |i, _| i as f64);

        let err = pinv_solve(&a, &b, 1e-12).unwrap_err();
        assert!(err.kind() == crate::ErrorKind::SingularSystem);
    }

    #[test]
    fn non_finite_matrix_is_singular() {
        let mut a = make_regular(3);
        a[(1, 2)] = f64::NAN;
        let b = Mat::<f64>::zeros(3, 1);

        let err = pinv_solve(&a, &b, 1e-12).unwrap_err();
        assert!(err.kind() == crate::ErrorKind::SingularSystem);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "row counts differ")]
    fn mismatched_rhs_rows_are_caught_in_debug_builds() {
        let a = make_regular(3);
        let b = Mat::<f64>::zeros(2, 1);

        let _ = pinv_solve(&a, &b, 1e-12);
    }

    #[test]
    fn all_finite_detects_infinity() {
        let mut a = Mat::<f64>::zeros(2, 2);
        assert!(all_finite(&a));
        a[(0, 1)] = f64::INFINITY;
        assert!(!all_finite(&a));
    }
}
