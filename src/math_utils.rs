//! Numerical helpers shared by the likelihood and the estimator.
//!
//! All routines operate on `nalgebra::DMatrix<f64>` and keep the floors used
//! by DBMR in one place.

use crate::errors::{DbmrError, DbmrResult};
use nalgebra::DMatrix;

/// Numerical constants for model reduction.
pub mod constants {
    /// Floor applied to stochastic-matrix entries before taking logarithms.
    pub const LOG_FLOOR: f64 = 1e-16;

    /// Value held by non-selected entries of the assignment matrix.
    pub const ASSIGNMENT_FLOOR: f64 = 1e-16;

    /// Value held by the selected entry of each assignment column.
    pub const ASSIGNMENT_SELECTED: f64 = 1.0;

    /// Default convergence threshold on the absolute log-likelihood change.
    pub const DEFAULT_CONVERGENCE: f64 = 1e-16;

    /// Default iteration cap.
    pub const DEFAULT_MAX_ITERATIONS: usize = 1000;
}

/// Natural logarithm with values at or below [`constants::LOG_FLOOR`] floored.
#[inline]
pub fn floored_ln(x: f64) -> f64 {
    x.max(constants::LOG_FLOOR).ln()
}

/// Element-wise floored logarithm of a matrix.
pub fn floored_ln_matrix(matrix: &DMatrix<f64>) -> DMatrix<f64> {
    matrix.map(floored_ln)
}

/// Index of the maximum value, ties resolved to the lowest index.
///
/// NaN entries are never selected. Returns `None` for an empty iterator or
/// when every entry is NaN.
pub fn argmax_first<I>(values: I) -> Option<usize>
where
    I: IntoIterator<Item = f64>,
{
    let mut best: Option<(usize, f64)> = None;
    for (idx, value) in values.into_iter().enumerate() {
        if value.is_nan() {
            continue;
        }
        match best {
            Some((_, best_value)) if value <= best_value => {}
            _ => best = Some((idx, value)),
        }
    }
    best.map(|(idx, _)| idx)
}

/// Scales every column of `matrix` in place so that it sums to 1.
///
/// Fails with [`DbmrError::NumericDegeneracy`] when a column sum is zero or
/// not finite, leaving the matrix partially normalised.
pub fn normalize_columns(matrix: &mut DMatrix<f64>, operation: &str) -> DbmrResult<()> {
    for (k, mut column) in matrix.column_iter_mut().enumerate() {
        let sum = column.sum();
        if !(sum.is_finite() && sum > 0.0) {
            return Err(DbmrError::NumericDegeneracy {
                reason: format!("column {} has normalising sum {}", k, sum),
                operation: Some(operation.to_string()),
            });
        }
        column /= sum;
    }
    Ok(())
}

/// Converts a row-of-vectors matrix into a `DMatrix`.
///
/// Empty and ragged inputs are rejected.
pub fn count_matrix_from_rows(rows: &[Vec<f64>]) -> DbmrResult<DMatrix<f64>> {
    if rows.is_empty() {
        return Err(DbmrError::InvalidParameter {
            parameter: "counts".to_string(),
            value: 0.0,
            constraint: "at least one row".to_string(),
        });
    }

    let n_cols = rows[0].len();
    if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != n_cols) {
        return Err(DbmrError::InvalidParameter {
            parameter: format!("counts row {}", i),
            value: row.len() as f64,
            constraint: format!("length {} (ragged matrix)", n_cols),
        });
    }

    Ok(DMatrix::from_fn(rows.len(), n_cols, |i, j| rows[i][j]))
}
