/////////////////////////////////////////////////////////////////////////////////////////////
//
// Exposes the public API and high-level documentation for thin plate spline interpolation.
//
// Created on: 15 Nov 2025     Author: Daniel Owen 
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License. 
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # Thin Plate Spline (TPS) interpolation of scattered vector data.
//!
//! Given `n` control points in `dim` dimensions and a `dim`-dimensional target
//! vector at each, this crate fits the interpolant
//!
//! ```text
//! f(x) = Σ_i phi(|x - p_i|)·c_i + A·x + b
//! ```
//!
//! by solving one dense saddle-point system of size `dim·n + dim·dim + dim`
//! through an SVD pseudo-inverse. Degenerate inputs such as duplicate or
//! collinear points yield a minimum-norm least-squares fit rather than a
//! failure. The fit is exact at the control points and reproduces affine maps.
//!
//! The radial kernel is `phi(r) = r` in every dimension. This is the thin plate
//! kernel for three dimensions; in two dimensions the customary choice is
//! `r²·ln(r)`, and in one dimension `phi(r) = r` yields piecewise linear
//! interpolation.
//!
//! # Features
//! - Any positive dimension; 2D point warps and 3D deformation fields are typical
//! - Vector valued targets with one coefficient column per control point
//! - A [`TpsInterpolator`] that can be refitted in place while other threads
//!   evaluate it
//! - Batch evaluation on the rayon thread pool
//! - Single precision exports of the fitted model for external renderers
//! - Versioned JSON model files
//! - Built on [`faer`](https://docs.rs/faer/latest/faer/) for linear algebra, avoiding complex build dependencies
//!
//! # Examples
//!
//! ```
//! use thinplate::{TpsInterpolator, TpsTestFunctions, generate_random_points};
//! use faer::mat;
//!
//! // Values produced by a known affine map
//! let points = generate_random_points(50, 2, Some(42));
//! let a = mat![[1.0, 0.5], [-0.5, 2.0]];
//! let values = TpsTestFunctions::affine_map(&points, &a, &[3.0, -1.0]);
//!
//! // Fit the spline
//! let tps = TpsInterpolator::new(2, points.clone(), values.clone()).unwrap();
//!
//! // The fit is exact at the control points
//! let fitted = tps.interpolate_many(&points).unwrap();
//! let max_diff = (0..points.nrows())
//!     .flat_map(|i| (0..2).map(move |k| (i, k)))
//!     .fold(0.0f64, |acc, (i, k)| acc.max((fitted[(i, k)] - values[(i, k)]).abs()));
//! assert!(max_diff < 1e-8);
//!
//! // and recovers the map
//! let model = tps.model();
//! assert!((model.affine_matrix()[(1, 1)] - 2.0).abs() < 1e-8);
//! ```
//!
//! # References
//! 1.  F. L. Bookstein. Principal warps: thin-plate splines and the decomposition
//!     of deformations. IEEE Trans. Pattern Anal. Mach. Intell., 11(6):567–585, 1989.
//! 2.  Fasshauer, G., 2007. Meshfree Approximation Methods with Matlab. World Scientific Publishing Co.
mod common;

mod tps;

mod error;

mod polynomials;

mod linalg;

mod system;

pub mod progress;

pub mod config;

mod tps_test_functions;

pub use {
    common::{
        create_evaluation_grid, csv_to_point_arrays, generate_random_points,
        point_arrays_to_csv, rows_to_mat,
    },
    config::{Params, ParamsBuilder},
    error::{ErrorKind, InputRole, ModelIOError, TpsError, TpsResult},
    progress::{closure_sink, ProgressMsg, ProgressSink},
    tps::{TpsInterpolator, TpsInterpolatorBuilder, TpsModel},
    tps_test_functions::TpsTestFunctions,
};
