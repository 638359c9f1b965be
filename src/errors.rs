//! Error types and validation functions for model reduction.
//!
//! This module provides the error taxonomy shared by every DBMR operation,
//! together with the argument validators run before any iteration starts.

use nalgebra::DMatrix;
use thiserror::Error;

/// Error types for Direct Bayesian Model Reduction.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum DbmrError {
    /// Invalid parameter value or malformed input.
    #[error("Invalid parameter: {parameter} = {value}, expected {constraint}")]
    InvalidParameter {
        /// Parameter name
        parameter: String,
        /// Invalid value provided
        value: f64,
        /// Valid range or constraint description
        constraint: String,
    },

    /// Matrix operands with incompatible shapes.
    #[error("Shape mismatch for {operand}: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        /// Operand whose shape is wrong
        operand: String,
        /// Expected (rows, columns)
        expected: (usize, usize),
        /// Actual (rows, columns)
        actual: (usize, usize),
    },

    /// A normalising sum vanished or a computed quantity left the finite range.
    #[error("Numeric degeneracy: {reason}")]
    NumericDegeneracy {
        /// Detailed reason for the failure
        reason: String,
        /// Operation that failed
        operation: Option<String>,
    },
}

/// Result type for model reduction operations.
///
/// This is a convenience type alias for operations that may fail with [`DbmrError`].
pub type DbmrResult<T> = Result<T, DbmrError>;

/// Validates that a parameter is within expected bounds.
///
/// # Arguments
/// * `value` - Parameter value to validate
/// * `min` - Minimum acceptable value (inclusive)
/// * `max` - Maximum acceptable value (inclusive)
/// * `name` - Parameter name for error reporting
///
/// # Example
/// ```rust
/// use dbmr::errors::validate_parameter;
///
/// assert!(validate_parameter(0.5, 0.0, 1.0, "tolerance").is_ok());
/// assert!(validate_parameter(-1.0, 0.0, f64::INFINITY, "tolerance").is_err());
/// ```
pub fn validate_parameter(value: f64, min: f64, max: f64, name: &str) -> DbmrResult<()> {
    if value.is_nan() {
        return Err(DbmrError::InvalidParameter {
            parameter: name.to_string(),
            value,
            constraint: "must not be NaN".to_string(),
        });
    }

    if value < min || value > max {
        Err(DbmrError::InvalidParameter {
            parameter: name.to_string(),
            value,
            constraint: format!("[{}, {}]", min, max),
        })
    } else {
        Ok(())
    }
}

/// Validates that a count (number of states, iterations) is at least `min`.
pub fn validate_count(value: usize, min: usize, name: &str) -> DbmrResult<()> {
    if value < min {
        Err(DbmrError::InvalidParameter {
            parameter: name.to_string(),
            value: value as f64,
            constraint: format!(">= {}", min),
        })
    } else {
        Ok(())
    }
}

/// Validates a transition-count matrix.
///
/// The matrix must be square with at least one state, and every entry must be
/// finite and nonnegative. Returns the number of observed states.
pub fn validate_count_matrix(counts: &DMatrix<f64>) -> DbmrResult<usize> {
    let (rows, cols) = counts.shape();
    if rows == 0 || rows != cols {
        return Err(DbmrError::InvalidParameter {
            parameter: "counts columns".to_string(),
            value: cols as f64,
            constraint: format!("square matrix with at least one state, got {}x{}", rows, cols),
        });
    }

    // Column-major storage; recover (i, j) for the message
    if let Some((idx, &value)) = counts
        .iter()
        .enumerate()
        .find(|(_, &v)| !v.is_finite() || v < 0.0)
    {
        let (i, j) = (idx % rows, idx / rows);
        return Err(DbmrError::InvalidParameter {
            parameter: format!("counts[{}, {}]", i, j),
            value,
            constraint: "finite and nonnegative".to_string(),
        });
    }

    Ok(rows)
}

/// Checks that `matrix` has the `expected` (rows, columns) shape.
pub fn ensure_shape(matrix: &DMatrix<f64>, expected: (usize, usize), operand: &str) -> DbmrResult<()> {
    let actual = matrix.shape();
    if actual != expected {
        return Err(DbmrError::ShapeMismatch {
            operand: operand.to_string(),
            expected,
            actual,
        });
    }
    Ok(())
}
