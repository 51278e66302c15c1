/////////////////////////////////////////////////////////////////////////////////////////////
//
// Assembles the thin plate spline saddle-point system and unpacks its solution.
//
// Created on: 15 Nov 2025     Author: Daniel Owen 
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License. 
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # system
//!
//! For `n` control points in `dim` dimensions the system has size
//! `S = dim·n + dim·dim + dim` and block form
//!
//! ```text
//! | K   P | | c |   | v |
//! | Pᵀ  0 | | a | = | 0 |
//! ```
//!
//! where `K` is the lifted kernel matrix (block `(i, j)` is `phi(|p_i - p_j|)·I_dim`),
//! `P` the lifted affine design matrix, `c` the stacked kernel coefficients,
//! `a = [vec(A); b]` the affine unknowns and `v` the stacked target values.

use crate::polynomials;
use faer::{Mat, concat};
use thinplate_utils::{self, KernelFunction};

/// Transient system matrix and right-hand side. Built fresh for every fit.
#[derive(Debug)]
pub(crate) struct LinearSystem {
    pub lhs: Mat<f64>,
    pub rhs: Mat<f64>,
}

impl LinearSystem {
    pub fn size(&self) -> usize {
        self.lhs.nrows()
    }
}

/// Size of the square system for `n` points in `dim` dimensions.
#[inline]
pub(crate) fn system_size(num_points: usize, dim: usize) -> usize {
    dim * num_points + polynomials::affine_basis_size(dim)
}

/// Assembles the system for validated `(n × dim)` points and values.
pub(crate) fn assemble<K>(points: &Mat<f64>, values: &Mat<f64>, kernel: &K) -> LinearSystem
where
    K: KernelFunction,
{
    let (num_points, dim) = points.shape();
    let num_poly = polynomials::affine_basis_size(dim);
    let num_kernel_rows = num_points * dim;

    let a_matrix = thinplate_utils::get_a_matrix_symmetric(points, kernel);
    let lifted = thinplate_utils::lift_kernel_matrix(&a_matrix, dim);

    let poly_matrix = polynomials::affine_design_matrix(points);
    let poly_t = poly_matrix.transpose().to_owned();

    let lhs_zeros = Mat::<f64>::zeros(num_poly, num_poly);

    let lhs = concat![[lifted, poly_matrix], [poly_t, lhs_zeros]];

    let rhs = Mat::from_fn(num_kernel_rows + num_poly, 1, |row, _| {
        match row < num_kernel_rows {
            true => values[(row / dim, row % dim)],
            false => 0.0,
        }
    });

    LinearSystem { lhs, rhs }
}

/// Fitted parameters split out of the solution vector.
#[derive(Debug)]
pub(crate) struct UnpackedParams {
    /// `(dim × n)`, column `i` holds the kernel weights of control point `i`.
    pub coefficients: Mat<f64>,

    /// `(dim × dim)` linear part of the affine term.
    pub affine: Mat<f64>,

    /// Length `dim` translation of the affine term.
    pub translation: Vec<f64>,
}

/// Splits a `(S × 1)` solution into kernel coefficients, `A` (column-major) and `b`.
pub(crate) fn unpack(params: &Mat<f64>, num_points: usize, dim: usize) -> UnpackedParams {
    debug_assert_eq!(params.nrows(), system_size(num_points, dim));

    let affine_offset = dim * num_points;
    let translation_offset = affine_offset + dim * dim;

    let coefficients = Mat::from_fn(dim, num_points, |k, i| params[(i * dim + k, 0)]);
    let affine = Mat::from_fn(dim, dim, |k, j| params[(affine_offset + j * dim + k, 0)]);
    let translation = (0..dim)
        .map(|k| params[(translation_offset + k, 0)])
        .collect();

    UnpackedParams {
        coefficients,
        affine,
        translation,
    }
}
