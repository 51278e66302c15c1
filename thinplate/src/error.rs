/////////////////////////////////////////////////////////////////////////////////////////////
//
// Declares the error types returned by fitting, evaluation and model file IO.
//
// Created on: 15 Nov 2025     Author: Daniel Owen 
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License. 
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Error types for fitting and evaluating a thin plate spline, and for model files.

use std::{io, path::PathBuf};
use thiserror::Error;

/// Which input array an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputRole {
    Points,
    Values,
}

impl std::fmt::Display for InputRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputRole::Points => write!(f, "points"),
            InputRole::Values => write!(f, "values"),
        }
    }
}

/// Coarse classification of a [`TpsError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Point and value lists disagree in length, or an entry is narrower than
    /// the declared dimension.
    ShapeMismatch,
    /// No control points were supplied.
    InsufficientData,
    /// A query point has a different dimension to the fitted model.
    DimensionMismatch,
    /// The pseudo-inverse did not produce a finite solution.
    SingularSystem,
    /// The declared dimension is zero.
    InvalidDimension,
    /// An input coordinate or value is NaN or infinite.
    NonFiniteInput,
}

/// Errors raised while fitting or evaluating a thin plate spline.
///
/// All input validation happens eagerly when a model is fitted, before any
/// matrix is assembled. Use [`TpsError::kind`] to branch on the failure class.
#[derive(Debug, Error)]
pub enum TpsError {
    #[error("dimension must be at least 1, got {dim}")]
    InvalidDimension { dim: usize },

    #[error("unequal length: {num_points} points but {num_values} values")]
    LengthMismatch { num_points: usize, num_values: usize },

    #[error("{role} have {found} columns, need at least {expected}")]
    TooFewColumns {
        role: InputRole,
        found: usize,
        expected: usize,
    },

    #[error("{role} row {row} has {found} components, need at least {expected}")]
    TooFewComponents {
        role: InputRole,
        row: usize,
        found: usize,
        expected: usize,
    },

    #[error("no control points supplied")]
    InsufficientData,

    #[error("non-finite {role} entry at row {row}, column {col}")]
    NonFiniteInput { role: InputRole, row: usize, col: usize },

    #[error("query point has dimension {found}, model dimension is {expected}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("singular system: {reason}")]
    SingularSystem { reason: String },
}

impl TpsError {
    /// Returns the [`ErrorKind`] this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            TpsError::InvalidDimension { .. } => ErrorKind::InvalidDimension,
            TpsError::LengthMismatch { .. }
            | TpsError::TooFewColumns { .. }
            | TpsError::TooFewComponents { .. } => ErrorKind::ShapeMismatch,
            TpsError::InsufficientData => ErrorKind::InsufficientData,
            TpsError::NonFiniteInput { .. } => ErrorKind::NonFiniteInput,
            TpsError::DimensionMismatch { .. } => ErrorKind::DimensionMismatch,
            TpsError::SingularSystem { .. } => ErrorKind::SingularSystem,
        }
    }
}

pub type TpsResult<T> = std::result::Result<T, TpsError>;

/// Errors that can occur when saving or loading a [`crate::TpsModel`].
///
/// Wraps lower-level IO and JSON failures as well as format, version and
/// consistency checks on the loaded model.
#[derive(Debug, Error)]
pub enum ModelIOError {
    /// Failed to create the target file before writing a model.
    #[error("creating {}: {source}", .path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to open an existing model file for reading.
    #[error("opening {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to flush buffered output when finishing a write.
    #[error("flushing {}: {source}", .path.display())]
    Flush {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Error serializing the in-memory model to JSON.
    #[error("serializing JSON to {}: {source}", .path.display())]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Error parsing JSON when reading a model from disk.
    #[error("parsing JSON in {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The JSON `format` field does not match the expected model format.
    #[error("unsupported format {found:?} (expected {expected:?}) in {}", .path.display())]
    FormatMismatch {
        path: PathBuf,
        found: String,
        expected: &'static str,
    },

    /// The JSON `version` field does not match the supported version.
    #[error("unsupported version {found} (expected {expected}) in {}", .path.display())]
    VersionMismatch {
        path: PathBuf,
        found: u32,
        expected: u32,
    },

    /// The model parsed but its matrices disagree in shape.
    #[error("inconsistent model in {}: {reason}", .path.display())]
    Invalid { path: PathBuf, reason: String },
}

pub(crate) type ModelIOResult<T> = std::result::Result<T, ModelIOError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_errors_share_a_kind() {
        let errors = [
            TpsError::LengthMismatch { num_points: 3, num_values: 2 },
            TpsError::TooFewColumns { role: InputRole::Values, found: 1, expected: 2 },
            TpsError::TooFewComponents {
                role: InputRole::Points,
                row: 4,
                found: 1,
                expected: 3,
            },
        ];

        for err in errors {
            assert_eq!(err.kind(), ErrorKind::ShapeMismatch);
        }
    }

    #[test]
    fn messages_name_the_offending_input() {
        let err = TpsError::TooFewComponents {
            role: InputRole::Values,
            row: 2,
            found: 1,
            expected: 2,
        };
        assert_eq!(err.to_string(), "values row 2 has 1 components, need at least 2");

        let err = TpsError::DimensionMismatch { expected: 2, found: 3 };
        assert_eq!(err.kind(), ErrorKind::DimensionMismatch);
        assert_eq!(err.to_string(), "query point has dimension 3, model dimension is 2");
    }
}
