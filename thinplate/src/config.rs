/////////////////////////////////////////////////////////////////////////////////////////////
//
// Declares solver and evaluation parameters for thin plate spline fitting.
//
// Created on: 15 Nov 2025     Author: Daniel Owen 
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License. 
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Declares solver and evaluation parameters for thin plate spline fitting.
use serde::{Deserialize, Serialize};

/// Parameters controlling the pseudo-inverse solve and batch evaluation.
///
/// The defaults suit most point sets and rarely need changing.
///
/// ### Default Values
/// - `rcond`: `None` (system size × machine epsilon)
/// - `check_finite`: `true`
/// - `parallel_eval_threshold`: `1024`
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
pub struct Params {
    /// Relative cutoff for small singular values. Singular values below
    /// `rcond * sigma_max` are treated as zero by the pseudo-inverse.
    ///
    /// `None` uses `S * f64::EPSILON`, where `S` is the size of the square system.
    pub rcond: Option<f64>,

    /// Whether to reject NaN or infinite entries in points and values before
    /// assembling the system.
    pub check_finite: bool,

    /// Number of query rows at or above which batch evaluation is spread over
    /// the rayon thread pool.
    pub parallel_eval_threshold: usize,
}

impl Default for Params {
    fn default() -> Self {
        Params::builder().build()
    }
}

impl Params {
    /// Returns a new [`ParamsBuilder`] populated with the default values.
    pub fn builder() -> ParamsBuilder {
        ParamsBuilder::new()
    }

    /// Resolves the singular value cutoff for a square system of size `system_size`.
    pub(crate) fn resolved_rcond(&self, system_size: usize) -> f64 {
        match self.rcond {
            Some(rcond) => rcond,
            None => system_size.max(1) as f64 * f64::EPSILON,
        }
    }
}

/// A convenience builder for constructing a [`Params`] instance.
///
/// The builder should be called via the [`Params::builder`] method.
///
/// See [`Params`] for details on each field.
#[derive(Debug, Clone, Copy)]
pub struct ParamsBuilder {
    pub rcond: Option<f64>,
    pub check_finite: bool,
    pub parallel_eval_threshold: usize,
}

impl ParamsBuilder {
    fn new() -> Self {
        Self {
            rcond: None,
            check_finite: true,
            parallel_eval_threshold: 1024,
        }
    }

    /// Sets an explicit relative singular value cutoff.
    pub fn rcond(mut self, rcond: f64) -> Self {
        self.rcond = Some(rcond);
        self
    }

    /// Enables or disables the finiteness check on inputs.
    pub fn check_finite(mut self, check_finite: bool) -> Self {
        self.check_finite = check_finite;
        self
    }

    /// Sets the batch size at which evaluation switches to the rayon pool.
    pub fn parallel_eval_threshold(mut self, parallel_eval_threshold: usize) -> Self {
        self.parallel_eval_threshold = parallel_eval_threshold;
        self
    }

    /// Builds and returns a [`Params`] instance.
    pub fn build(self) -> Params {
        Params {
            rcond: self.rcond,
            check_finite: self.check_finite,
            parallel_eval_threshold: self.parallel_eval_threshold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rcond_scales_with_system_size() {
        let params = Params::default();
        assert_eq!(params.resolved_rcond(12), 12.0 * f64::EPSILON);
    }

    #[test]
    fn builder_overrides_defaults() {
        let params = Params::builder()
            .rcond(1e-10)
            .check_finite(false)
            .parallel_eval_threshold(8)
            .build();

        assert_eq!(params.resolved_rcond(500), 1e-10);
        assert!(!params.check_finite);
        assert_eq!(params.parallel_eval_threshold, 8);
    }
}
