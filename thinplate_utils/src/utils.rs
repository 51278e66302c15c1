/////////////////////////////////////////////////////////////////////////////////////////////
//
// Supplies distance helpers and dense (lifted) kernel matrix builders.
//
// Created on: 15 Nov 2025     Author: Daniel Owen 
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License. 
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::KernelFunction;
use faer::{Mat, RowRef};

/// Computes the Euclidean distance between two points.
///
/// # Examples
///
/// ```
/// use faer::mat;
/// use thinplate_utils::get_distance;
///
/// let a = mat![[1.0, 1.0]];
/// let b = mat![[4.0, 5.0f64]];
///
/// assert_eq!(get_distance(a.row(0), b.row(0)), 5.0);
/// ```
#[inline(always)]
pub fn get_distance(target: RowRef<f64>, source: RowRef<f64>) -> f64 {
    let mut dist = 0.0;
    for (t, s) in target.iter().zip(source.iter()) {
        let diff = t - s;
        dist += diff * diff;
    }
    dist.sqrt()
}

/// Builds the symmetric `(n × n)` kernel matrix of a point set with itself.
///
/// Only the lower triangle is evaluated, the upper triangle is mirrored.
#[inline(always)]
pub fn get_a_matrix_symmetric<K>(points: &Mat<f64>, kernel: &K) -> Mat<f64>
where
    K: KernelFunction,
{
    let n = points.nrows();

    let mut a_matrix = Mat::<f64>::zeros(n, n);

    for j in 0..n {
        let source_row = points.row(j);

        for i in j..n {
            let k_val = kernel.evaluate(points.row(i), source_row);

            a_matrix[(i, j)] = k_val;
            a_matrix[(j, i)] = k_val;
        }
    }

    a_matrix
}

/// Lifts a scalar kernel matrix to `dim` output channels.
///
/// Block `(i, j)` of the `(m·dim × n·dim)` result is `k[(i, j)] · I_dim`; all
/// off-diagonal entries inside a block are zero.
///
/// # Examples
///
/// ```
/// use faer::mat;
/// use thinplate_utils::lift_kernel_matrix;
///
/// let k = mat![[0.0, 2.0], [2.0, 0.0f64]];
/// let lifted = lift_kernel_matrix(&k, 2);
///
/// assert_eq!(
///     lifted,
///     mat![
///         [0.0, 0.0, 2.0, 0.0],
///         [0.0, 0.0, 0.0, 2.0],
///         [2.0, 0.0, 0.0, 0.0],
///         [0.0, 2.0, 0.0, 0.0f64],
///     ]
/// );
/// ```
pub fn lift_kernel_matrix(k: &Mat<f64>, dim: usize) -> Mat<f64> {
    Mat::from_fn(k.nrows() * dim, k.ncols() * dim, |row, col| {
        match row % dim == col % dim {
            true => k[(row / dim, col / dim)],
            false => 0.0,
        }
    })
}

/// Evaluates the lifted kernel `G(p1, p2) = phi(|p1 - p2|) · I_dim`.
pub fn lifted_kernel<K>(p1: RowRef<f64>, p2: RowRef<f64>, kernel: &K, dim: usize) -> Mat<f64>
where
    K: KernelFunction,
{
    let val = kernel.evaluate(p1, p2);
    Mat::from_fn(dim, dim, |i, j| if i == j { val } else { 0.0 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::DistanceKernel;
    use equator::assert;
    use faer::mat;

    #[test]
    fn distance_matches_pythagoras_in_3d() {
        let a = mat![[1.0, 2.0, 3.0f64]];
        let b = mat![[3.0, 5.0, 9.0f64]];
        assert!(get_distance(a.row(0), b.row(0)) == 7.0);
    }

    #[test]
    fn symmetric_matrix_holds_pairwise_distances() {
        let points = mat![[0.0, 0.0], [3.0, 0.0], [0.0, 4.0], [3.0, 4.0f64]];

        let a = get_a_matrix_symmetric(&points, &DistanceKernel);

        let expected = mat![
            [0.0, 3.0, 4.0, 5.0],
            [3.0, 0.0, 5.0, 4.0],
            [4.0, 5.0, 0.0, 3.0],
            [5.0, 4.0, 3.0, 0.0f64],
        ];
        assert!(a == expected);
    }

    #[test]
    fn single_point_gives_zero_matrix() {
        let points = mat![[1.5, -2.0, 7.0f64]];
        let a = get_a_matrix_symmetric(&points, &DistanceKernel);

        assert!(a.shape() == (1, 1));
        assert!(a[(0, 0)] == 0.0);
    }

    #[test]
    fn lifted_kernel_is_scaled_identity() {
        let p1 = mat![[0.0, 0.0, 0.0f64]];
        let p2 = mat![[0.0, 3.0, 4.0f64]];

        let g = lifted_kernel(p1.row(0), p2.row(0), &DistanceKernel, 3);

        assert!(g == mat![[5.0, 0.0, 0.0], [0.0, 5.0, 0.0], [0.0, 0.0, 5.0f64]]);
    }

    #[test]
    fn lifting_places_each_entry_on_a_block_diagonal() {
        let k = mat![[0.0, 1.5], [2.5, 0.0f64]];
        let lifted = lift_kernel_matrix(&k, 2);

        assert!(lifted.shape() == (4, 4));
        assert!(all(lifted[(0, 2)] == 1.5, lifted[(1, 3)] == 1.5));
        assert!(all(lifted[(2, 0)] == 2.5, lifted[(3, 1)] == 2.5));
        assert!(all(lifted[(0, 3)] == 0.0, lifted[(1, 2)] == 0.0));
    }

    #[test]
    fn lifting_with_one_channel_is_a_copy() {
        let k = mat![[0.0, 1.5], [1.5, 0.0f64]];
        assert!(lift_kernel_matrix(&k, 1) == k);
    }
}
