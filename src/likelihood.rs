//! Log-likelihood of a reduced model.
//!
//! For a count matrix `C` (N×N), a stochastic matrix `Lambda` (N×K) and an
//! assignment matrix `Gamma` (K×N) the score is
//!
//! ```text
//! L = Σ_i Σ_j Σ_k C[i,j] · Gamma[k,j] · ln(max(Lambda[i,k], 1e-16))
//! ```

use crate::errors::{ensure_shape, DbmrResult};
use crate::math_utils::floored_ln_matrix;
use nalgebra::DMatrix;

/// Evaluate the DBMR log-likelihood.
///
/// Entries of `lambda` at or below 1e-16 are floored before the logarithm,
/// so the result is finite for any finite counts.
///
/// # Errors
/// [`DbmrError::ShapeMismatch`](crate::errors::DbmrError::ShapeMismatch) when
/// `counts` is not square, `lambda` is not N×K or `gamma` is not K×N.
pub fn dbmr_log_likelihood(
    lambda: &DMatrix<f64>,
    gamma: &DMatrix<f64>,
    counts: &DMatrix<f64>,
) -> DbmrResult<f64> {
    let n = counts.nrows();
    ensure_shape(counts, (n, n), "counts")?;
    let k = lambda.ncols();
    ensure_shape(lambda, (n, k), "lambda")?;
    ensure_shape(gamma, (k, n), "gamma")?;

    // (ln Lambda · Gamma)[i,j] = Σ_k ln Lambda[i,k] · Gamma[k,j]
    let log_lambda = floored_ln_matrix(lambda);
    let weighted = log_lambda * gamma;
    Ok(counts.component_mul(&weighted).sum())
}
