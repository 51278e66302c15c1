/////////////////////////////////////////////////////////////////////////////////////////////
//
// Declares the kernel evaluation trait used to assemble and evaluate thin plate splines.
//
// Created on: 15 Nov 2025     Author: Daniel Owen 
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License. 
//
/////////////////////////////////////////////////////////////////////////////////////////////

use faer::RowRef;

/// Evaluates a radial kernel between a target and source point.
///
/// Implementors supply the radial profile [`KernelFunction::phi`]; the default
/// [`KernelFunction::evaluate`] applies it to the Euclidean distance between the
/// two [`faer::RowRef<f64>`](https://docs.rs/faer/latest/faer/row/type.RowRef.html)
/// arguments. Points of any dimension are accepted, both rows must have the
/// same length.
pub trait KernelFunction {
    /// Radial profile as a function of distance `r >= 0`.
    fn phi(&self, r: f64) -> f64;

    #[inline(always)]
    fn evaluate(&self, target: RowRef<f64>, source: RowRef<f64>) -> f64 {
        self.phi(crate::get_distance(target, source))
    }
}
