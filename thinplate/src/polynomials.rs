/////////////////////////////////////////////////////////////////////////////////////////////
//
// Builds the lifted affine design block appended to the thin plate spline kernel system.
//
// Created on: 15 Nov 2025     Author: Daniel Owen 
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License. 
//
/////////////////////////////////////////////////////////////////////////////////////////////

use faer::{Mat, RowRef};

/// Number of affine unknowns for `dim` output channels: `dim·dim` entries of
/// `A` plus `dim` entries of `b`.
#[inline]
pub(crate) fn affine_basis_size(dim: usize) -> usize {
    dim * dim + dim
}

/// Evaluates the lifted affine design matrix `P` for an `(n × dim)` point set.
///
/// `P` has shape `(n·dim × (dim·dim + dim))`. For point `i` and axis `j` the
/// coordinate `p_i[j]` sits on the diagonal of the `dim × dim` sub-block at
/// row-block `i`, column-block `j`. The trailing column-block is `I_dim` for
/// every point and carries the translation `b`.
///
/// Multiplying `P` by `[vec(A); b]`, with `A` stored column-major, stacks
/// `A·p_i + b` for every point.
pub(crate) fn affine_design_matrix(points: &Mat<f64>) -> Mat<f64> {
    let (n, dim) = points.shape();
    let linear_cols = dim * dim;

    Mat::from_fn(n * dim, affine_basis_size(dim), |row, col| {
        let (i, k) = (row / dim, row % dim);

        match col < linear_cols {
            true if col % dim == k => points[(i, col / dim)],
            true => 0.0,
            false if col - linear_cols == k => 1.0,
            false => 0.0,
        }
    })
}

/// Evaluates `A·x + b` for a single query row.
pub(crate) fn evaluate_affine(a_matrix: &Mat<f64>, b: &[f64], query: RowRef<f64>) -> Vec<f64> {
    let dim = b.len();
    let mut out = b.to_vec();

    for (j, x_j) in query.iter().enumerate() {
        for k in 0..dim {
            out[k] += a_matrix[(k, j)] * x_j;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use equator::assert;
    use faer::{mat, utils::approx::*, Mat};

    fn run_case(points: Mat<f64>, expected: Mat<f64>) {
        let design = affine_design_matrix(&points);
        assert_eq!(design.shape(), expected.shape(), "shape mismatch in test setup");

        let approx_eq = CwiseMat(ApproxEq::eps() * 128.0);
        assert!(&design ~ &expected);
    }

    #[test]
    fn design_1d() {
        let points = mat![[1.0], [2.0]];
        // Columns: [x, 1]
        let expected = mat![[1.0, 1.0], [2.0, 1.0]];
        run_case(points, expected);
    }

    #[test]
    fn design_2d() {
        let points = mat![[1.0, 2.0], [3.0, 4.0]];
        // Columns: [x·e0, x·e1, y·e0, y·e1, e0, e1]
        let expected = mat![
            [1.0, 0.0, 2.0, 0.0, 1.0, 0.0],
            [0.0, 1.0, 0.0, 2.0, 0.0, 1.0],
            [3.0, 0.0, 4.0, 0.0, 1.0, 0.0],
            [0.0, 3.0, 0.0, 4.0, 0.0, 1.0],
        ];
        run_case(points, expected);
    }

    #[test]
    fn design_3d_shape_and_bias_block() {
        let points = mat![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        let design = affine_design_matrix(&points);

        assert_eq!(design.shape(), (6, 12));
        for row in 0..6 {
            for k in 0..3 {
                let expected = if row % 3 == k { 1.0 } else { 0.0 };
                assert_eq!(design[(row, 9 + k)], expected);
            }
        }
        // z coordinate of the second point on channel 1
        assert_eq!(design[(4, 2 * 3 + 1)], 6.0);
    }

    #[test]
    fn design_times_column_major_affine_stacks_affine_map() {
        let points = mat![[0.5, -1.0], [2.0, 3.0], [-4.0, 0.25]];
        let a = mat![[1.0, 2.0], [-3.0, 0.5]];
        let b = [7.0, -2.0];

        // [vec(A); b] with A column-major
        let params = Mat::from_fn(6, 1, |i, _| match i {
            0..=3 => a[(i % 2, i / 2)],
            _ => b[i - 4],
        });

        let stacked = affine_design_matrix(&points) * &params;

        for i in 0..points.nrows() {
            let direct = evaluate_affine(&a, &b, points.row(i));
            for k in 0..2 {
                let diff: f64 = stacked[(i * 2 + k, 0)] - direct[k];
                assert!(diff.abs() < 1e-12);
            }
        }
    }

    #[test]
    fn affine_of_origin_is_translation() {
        let a = mat![[3.0, 1.0], [1.0, 3.0]];
        let origin = mat![[0.0, 0.0]];
        assert_eq!(evaluate_affine(&a, &[1.5, -0.5], origin.row(0)), vec![1.5, -0.5]);
    }
}
