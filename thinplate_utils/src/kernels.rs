/////////////////////////////////////////////////////////////////////////////////////////////
//
// Implements the Euclidean distance kernel used by the thin plate spline system.
//
// Created on: 15 Nov 2025     Author: Daniel Owen 
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License. 
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::traits::KernelFunction;

/// Euclidean distance kernel with `phi(r) = r`.
///
/// This is the kernel used for every dimension. It is the conditionally
/// positive definite thin plate kernel for **3D** inputs only. In 2D the
/// customary thin plate kernel is `r^2 ln(r)` and in 1D it is `r^3`; those are
/// not substituted here, so fits in other dimensions use the 3D kernel as is.
///
/// # Examples
///
/// ```
/// use faer::mat;
/// use thinplate_utils::{KernelFunction, kernels::DistanceKernel};
///
/// let a = mat![[0.0, 0.0]];
/// let b = mat![[3.0, 4.0f64]];
///
/// assert!(DistanceKernel.evaluate(a.row(0), b.row(0)) == 5.0);
/// ```
#[derive(Clone, Debug, Copy, Default, PartialEq, Eq)]
pub struct DistanceKernel;

impl KernelFunction for DistanceKernel {
    #[inline(always)]
    fn phi(&self, r: f64) -> f64 {
        r
    }
}
