/////////////////////////////////////////////////////////////////////////////////////////////
//
// Re-exports kernel utilities and matrix helpers used across the thinplate crates.
//
// Created on: 15 Nov 2025     Author: Daniel Owen 
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License. 
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # Utilities for the [`thinplate`] crate
//!
//! Holds the [`KernelFunction`] trait, the Euclidean [`kernels::DistanceKernel`]
//! and the dense kernel-matrix builders used to assemble thin plate spline systems.
//!
//! [`thinplate`]: https://docs.rs/thinplate
mod traits;
mod utils;

/// Implemented kernels.
pub mod kernels;

pub use {
    traits::KernelFunction,
    utils::{get_a_matrix_symmetric, get_distance, lift_kernel_matrix, lifted_kernel},
};
