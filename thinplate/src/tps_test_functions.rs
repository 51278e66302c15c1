/////////////////////////////////////////////////////////////////////////////////////////////
//
// Provides sample control point sets for demonstrating and testing thin plate splines.
//
// Created on: 15 Nov 2025     Author: Daniel Owen 
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License. 
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Sample data sets: a V-shaped height profile and exact affine maps.
use faer::Mat;

/// Abscissae of the V-shaped sample profile.
const V_PROFILE_X: [f64; 7] = [30.0, 60.0, 90.0, 120.0, 150.0, 180.0, 210.0];

/// Ordinates of the V-shaped sample profile in two dimensions.
const V_PROFILE_Y: [f64; 7] = [30.0, 60.0, 90.0, 140.0, 90.0, 60.0, 30.0];

/// Heights carried by the V-shaped sample profile.
const V_PROFILE_HEIGHTS: [f64; 7] = [100.0, 200.0, 300.0, 400.0, 300.0, 200.0, 100.0];

/// Struct that implements sample point sets for testing thin plate spline
/// interpolation.
pub struct TpsTestFunctions;

impl TpsTestFunctions {
    /// Seven points along a line with heights rising from 100 to 400 and
    /// falling back to 100.
    ///
    /// Returns `(points, values)`, both of shape `(7, 1)`.
    pub fn v_profile_1d() -> (Mat<f64>, Mat<f64>) {
        let points = Mat::from_fn(V_PROFILE_X.len(), 1, |i, _| V_PROFILE_X[i]);
        let values = Mat::from_fn(V_PROFILE_HEIGHTS.len(), 1, |i, _| V_PROFILE_HEIGHTS[i]);

        (points, values)
    }

    /// The V profile laid out in the plane, pinned by `num_anchors` zero-valued
    /// anchors spaced 5 units apart along `y = 400`.
    ///
    /// Profile heights go in the first value component; the second is zero.
    ///
    /// Returns `(points, values)`, both of shape `(7 + num_anchors, 2)`.
    pub fn v_profile_2d(num_anchors: usize) -> (Mat<f64>, Mat<f64>) {
        let num_profile = V_PROFILE_X.len();
        let n = num_profile + num_anchors;

        let points = Mat::from_fn(n, 2, |i, j| match (i < num_profile, j) {
            (true, 0) => V_PROFILE_X[i],
            (true, _) => V_PROFILE_Y[i],
            (false, 0) => 5.0 * (i - num_profile) as f64,
            (false, _) => 400.0,
        });

        let values = Mat::from_fn(n, 2, |i, j| match i < num_profile && j == 0 {
            true => V_PROFILE_HEIGHTS[i],
            false => 0.0,
        });

        (points, values)
    }

    /// Evaluates the affine map `v = A·p + b` at every row of `points`.
    ///
    /// `a_matrix` must be `(dim × dim)` and `b` of length `dim`, where
    /// `dim = points.ncols()`.
    pub fn affine_map(points: &Mat<f64>, a_matrix: &Mat<f64>, b: &[f64]) -> Mat<f64> {
        let dim = points.ncols();
        assert_eq!(a_matrix.shape(), (dim, dim));
        assert_eq!(b.len(), dim);

        Mat::from_fn(points.nrows(), dim, |i, k| {
            b[k] + (0..dim).map(|j| a_matrix[(k, j)] * points[(i, j)]).sum::<f64>()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use faer::mat;

    #[test]
    fn v_profile_2d_appends_anchor_row() {
        let (points, values) = TpsTestFunctions::v_profile_2d(100);

        assert_eq!(points.shape(), (107, 2));
        assert_eq!(values.shape(), (107, 2));

        assert_eq!((points[(3, 0)], points[(3, 1)]), (120.0, 140.0));
        assert_eq!(values[(3, 0)], 400.0);
        assert_eq!(values[(3, 1)], 0.0);

        assert_eq!((points[(106, 0)], points[(106, 1)]), (495.0, 400.0));
        assert_eq!((values[(106, 0)], values[(106, 1)]), (0.0, 0.0));
    }

    #[test]
    fn affine_map_applies_matrix_then_offset() {
        let points = mat![[1.0, 2.0], [0.0, 0.0]];
        let a = mat![[2.0, 0.0], [1.0, -1.0]];
        let values = TpsTestFunctions::affine_map(&points, &a, &[10.0, 20.0]);

        assert_eq!(values, mat![[12.0, 19.0], [10.0, 20.0]]);
    }
}
