/////////////////////////////////////////////////////////////////////////////////////////////
//
// Defines shared helpers for input conversion, random points, evaluation grids and CSV I/O.
//
// Created on: 15 Nov 2025     Author: Daniel Owen 
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License. 
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::error::{InputRole, TpsError, TpsResult};
use csv::{ReaderBuilder, Writer};
use faer::{Mat, MatRef};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::error::Error;
use std::fs::File;

/// Converts a ragged list of rows into an `(n × dim)` matrix.
///
/// Every row must have at least `dim` components; any extra components are
/// ignored.
///
/// # Errors
/// - [`TpsError::InvalidDimension`] if `dim == 0`.
/// - [`TpsError::TooFewComponents`] naming the first short row.
///
/// # Example
/// ```
/// use thinplate::{rows_to_mat, InputRole};
///
/// let rows = vec![vec![0.0, 1.0, 9.0], vec![2.0, 3.0]];
/// let points = rows_to_mat(&rows, 2, InputRole::Points).unwrap();
/// assert_eq!(points.shape(), (2, 2));
/// assert_eq!(points[(0, 1)], 1.0);
/// ```
pub fn rows_to_mat(rows: &[Vec<f64>], dim: usize, role: InputRole) -> TpsResult<Mat<f64>> {
    if dim == 0 {
        return Err(TpsError::InvalidDimension { dim });
    }

    if let Some((row, short)) = rows.iter().enumerate().find(|(_, r)| r.len() < dim) {
        return Err(TpsError::TooFewComponents {
            role,
            row,
            found: short.len(),
            expected: dim,
        });
    }

    Ok(Mat::from_fn(rows.len(), dim, |i, j| rows[i][j]))
}

/// Generate a matrix of random points in the unit hypercube.
///
/// # Parameters
/// - `n`: Number of points to generate (rows in the output matrix).
/// - `d`: Number of spatial dimensions per point (columns in the output matrix).
/// - `seed`: Optional random seed. With `Some(seed)` the same points are
///   produced on every run; with `None` the generator is seeded from the OS.
///
/// # Example
/// ```
/// use thinplate::generate_random_points;
///
/// let pts = generate_random_points(100, 3, Some(42));
/// assert_eq!(pts.shape(), (100, 3));
/// ```
pub fn generate_random_points(n: usize, d: usize, seed: Option<u64>) -> Mat<f64> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    Mat::from_fn(n, d, |_, _| rng.random_range(0.0..1.0))
}

/// Create a regular evaluation grid from per-dimension ranges and sample counts.
///
/// The first dimension varies fastest.
///
/// # Arguments
/// * `ranges` - Inclusive `(min, max)` range for each dimension.
/// * `counts` - Number of grid samples per range; must match `ranges.len()`.
///
/// # Returns
/// A `Mat<f64>` with one row per grid point and one column per dimension.
pub fn create_evaluation_grid(ranges: &[(f64, f64)], counts: &[usize]) -> Mat<f64> {
    assert_eq!(ranges.len(), counts.len());

    let total_points: usize = counts.iter().product();
    let num_dimensions = ranges.len();

    Mat::from_fn(total_points, num_dimensions, |row_idx, col_idx| {
        let dim_points = counts[col_idx];
        let (start, end) = ranges[col_idx];
        let step = match dim_points > 1 {
            true => (end - start) / (dim_points as f64 - 1.0),
            false => 0.0,
        };

        let stride: usize = counts[..col_idx].iter().product();

        let index_in_dim = (row_idx / stride) % dim_points;
        start + step * index_in_dim as f64
    })
}

/// Load a CSV file into separate point and value matrices.
///
/// Each record holds `dim` coordinates followed by `dim` values.
///
/// # Arguments
/// * `file_path` - Path to the CSV file.
/// * `has_headers` - Whether the file has a single header row to skip.
/// * `dim` - Dimension of the points and values.
///
/// # Returns
/// On success, returns `(points, values)`, both of shape `(n_rows, dim)`.
pub fn csv_to_point_arrays(
    file_path: &str,
    has_headers: bool,
    dim: usize,
) -> Result<(Mat<f64>, Mat<f64>), Box<dyn Error>> {
    let file = File::open(file_path)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(has_headers)
        .from_reader(file);

    let mut point_data = Vec::new();
    let mut value_data = Vec::new();
    let mut num_rows = 0;

    for result in reader.records() {
        let record = result?;
        if record.len() != 2 * dim {
            return Err(format!(
                "record {} has {} columns, expected {}",
                num_rows,
                record.len(),
                2 * dim
            )
            .into());
        }

        for (i, value) in record.iter().enumerate() {
            let parsed_value: f64 = value.trim().parse()?;
            match i < dim {
                true => point_data.push(parsed_value),
                false => value_data.push(parsed_value),
            }
        }

        num_rows += 1;
    }

    let points = MatRef::from_row_major_slice(point_data.as_slice(), num_rows, dim).to_owned();
    let values = MatRef::from_row_major_slice(value_data.as_slice(), num_rows, dim).to_owned();

    Ok((points, values))
}

/// Write point coordinates and associated values to a CSV file.
///
/// Each row of `points` is written followed by the matching row of `values`,
/// under headers `X0, X1, .., V0, V1, ..`.
///
/// # Errors
/// Returns an error if writing to disk fails.
pub fn point_arrays_to_csv(
    points: &Mat<f64>,
    values: &Mat<f64>,
    filename: &str,
) -> Result<(), Box<dyn Error>> {
    let num_points = points.nrows();
    assert_eq!(num_points, values.nrows(), "Points and values must have same length.");

    let mut wtr = Writer::from_path(filename)?;

    let headers: Vec<String> = (0..points.ncols())
        .map(|j| format!("X{}", j))
        .chain((0..values.ncols()).map(|j| format!("V{}", j)))
        .collect();
    wtr.write_record(&headers)?;

    for i in 0..num_points {
        let record: Vec<String> = points
            .row(i)
            .iter()
            .chain(values.row(i).iter())
            .map(|c| c.to_string())
            .collect();
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Flattens a matrix to single precision in column-major order.
pub(crate) fn to_f32_col_major(mat: &Mat<f64>) -> Vec<f32> {
    mat.col_iter()
        .flat_map(|col| col.iter().map(|&x| x as f32).collect::<Vec<_>>())
        .collect()
}

/// Flattens a matrix to single precision in row-major order.
pub(crate) fn to_f32_row_major(mat: &Mat<f64>) -> Vec<f32> {
    mat.row_iter()
        .flat_map(|row| row.iter().map(|&x| x as f32).collect::<Vec<_>>())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use faer::mat;

    #[test]
    fn rows_to_mat_truncates_extra_components() {
        let rows = vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]];
        let m = rows_to_mat(&rows, 2, InputRole::Values).unwrap();
        assert_eq!(m, mat![[1.0, 2.0], [4.0, 5.0]]);
    }

    #[test]
    fn rows_to_mat_reports_first_short_row() {
        let rows = vec![vec![1.0, 2.0], vec![4.0], vec![]];
        let err = rows_to_mat(&rows, 2, InputRole::Points).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ShapeMismatch);
        match err {
            TpsError::TooFewComponents { role, row, found, expected } => {
                assert_eq!(role, InputRole::Points);
                assert_eq!((row, found, expected), (1, 1, 2));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn rows_to_mat_rejects_zero_dimension() {
        let err = rows_to_mat(&[vec![1.0]], 0, InputRole::Points).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidDimension);
    }

    #[test]
    fn random_points_are_reproducible() {
        let a = generate_random_points(20, 2, Some(7));
        let b = generate_random_points(20, 2, Some(7));
        assert_eq!(a, b);
        assert!(a.col_iter().all(|c| c.iter().all(|&x| (0.0..1.0).contains(&x))));
    }

    #[test]
    fn evaluation_grid_varies_first_dimension_fastest() {
        let grid = create_evaluation_grid(&[(0.0, 1.0), (10.0, 20.0)], &[3, 2]);

        assert_eq!(
            grid,
            mat![
                [0.0, 10.0],
                [0.5, 10.0],
                [1.0, 10.0],
                [0.0, 20.0],
                [0.5, 20.0],
                [1.0, 20.0],
            ]
        );
    }

    #[test]
    fn f32_flattening_orders() {
        let m = mat![[1.0, 2.0], [3.0, 4.0]];
        assert_eq!(to_f32_col_major(&m), vec![1.0f32, 3.0, 2.0, 4.0]);
        assert_eq!(to_f32_row_major(&m), vec![1.0f32, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn csv_round_trip() {
        let path = std::env::temp_dir().join(format!("thinplate_csv_{}.csv", std::process::id()));
        let path_str = path.to_str().unwrap();

        let points = mat![[0.0, 1.0], [2.5, -3.0]];
        let values = mat![[10.0, 11.0], [12.0, 13.5]];

        point_arrays_to_csv(&points, &values, path_str).unwrap();
        let (read_points, read_values) = csv_to_point_arrays(path_str, true, 2).unwrap();

        assert_eq!(read_points, points);
        assert_eq!(read_values, values);

        std::fs::remove_file(&path).unwrap();
    }
}
