//! Alternating estimator for Direct Bayesian Model Reduction.
//!
//! Implements the scheme of Gerber & Horenko, "Toward a direct and scalable
//! identification of reduced models for categorical processes", PNAS 2017
//! (doi: 10.1073/pnas.1612619114).
//!
//! Starting from a random column-stochastic `Lambda`, each iteration
//!
//! 1. rebuilds `Lambda` from the counts aggregated over the current hard
//!    assignment and renormalises its columns,
//! 2. reassigns every observed state to the latent state maximising
//!    `Σ_i C[i,j] · ln Lambda[i,k]`,
//! 3. records the log-likelihood and stops once its absolute change is at or
//!    below the tolerance, or once more than `max_iterations` values were
//!    recorded.
//!
//! The first iteration never satisfies the stopping rule, so a run always
//! records at least two likelihoods.

use crate::{
    config::DbmrConfig,
    errors::{ensure_shape, validate_count_matrix, DbmrError, DbmrResult},
    likelihood::dbmr_log_likelihood,
    math_utils::{
        argmax_first,
        constants::{ASSIGNMENT_FLOOR, ASSIGNMENT_SELECTED},
        floored_ln_matrix, normalize_columns,
    },
    results::ReducedModel,
    secure_rng::SecureRng,
};
use log::{debug, info, warn};
use nalgebra::DMatrix;
use rand::Rng;

/// DBMR estimator bound to a configuration
#[derive(Debug, Clone, Default)]
pub struct DbmrEstimator {
    /// Estimation settings
    pub config: DbmrConfig,
}

impl DbmrEstimator {
    /// Estimator with `num_latent_states` latent states and default stopping rule
    pub fn new(num_latent_states: usize) -> Self {
        Self::with_config(DbmrConfig::new(num_latent_states))
    }

    /// Estimator with an explicit configuration
    pub fn with_config(config: DbmrConfig) -> Self {
        Self { config }
    }

    /// Fit the reduced model, drawing the initial `Lambda` from the configured
    /// seed (or OS entropy when no seed is set).
    pub fn fit(&self, counts: &DMatrix<f64>) -> DbmrResult<ReducedModel> {
        let mut rng = SecureRng::from_optional_seed(self.config.seed);
        self.fit_with_rng(counts, &mut rng)
    }

    /// Fit the reduced model with a caller-supplied generator.
    ///
    /// # Errors
    /// * [`DbmrError::InvalidParameter`] when `counts` is not square, empty,
    ///   or holds a negative or non-finite entry, or when the configuration
    ///   fails [`DbmrConfig::validate`]. Raised before any iteration.
    /// * [`DbmrError::NumericDegeneracy`] when a latent state's normalising
    ///   sum vanishes (e.g. an all-zero count matrix).
    pub fn fit_with_rng<R: Rng + ?Sized>(
        &self,
        counts: &DMatrix<f64>,
        rng: &mut R,
    ) -> DbmrResult<ReducedModel> {
        let n = validate_count_matrix(counts)?;
        self.config.validate()?;

        let k = self.config.num_latent_states;
        let tolerance = self.config.convergence_tolerance;
        let max_iterations = self.config.max_iterations;

        let mut lambda = initialize_lambda(n, k, rng)?;
        let mut gamma = DMatrix::from_element(k, n, ASSIGNMENT_FLOOR);
        assign_states(&lambda, counts, &mut gamma)?;

        let mut log_likelihoods: Vec<f64> = Vec::new();
        let mut delta;

        let converged = loop {
            lambda = update_lambda(counts, &gamma)?;
            assign_states(&lambda, counts, &mut gamma)?;

            let ll = dbmr_log_likelihood(&lambda, &gamma, counts)?;
            if !ll.is_finite() {
                return Err(DbmrError::NumericDegeneracy {
                    reason: format!(
                        "log-likelihood is {} at iteration {}",
                        ll,
                        log_likelihoods.len() + 1
                    ),
                    operation: Some("dbmr_log_likelihood".to_string()),
                });
            }

            delta = match log_likelihoods.last() {
                Some(&previous) => (ll - previous).abs(),
                None => f64::INFINITY,
            };
            log_likelihoods.push(ll);
            debug!(
                "DBMR iteration {}: log-likelihood = {:.12e}, delta = {:e}",
                log_likelihoods.len(),
                ll,
                delta
            );

            // The first likelihood has no predecessor and never stops the run
            if log_likelihoods.len() > 1 && delta <= tolerance {
                info!(
                    "DBMR converged after {} iterations (delta {:e} <= {:e})",
                    log_likelihoods.len(),
                    delta,
                    tolerance
                );
                break true;
            }

            if log_likelihoods.len() > max_iterations {
                warn!(
                    "Did not converge to a delta log-likelihood below {:e} ({:e}) within {} iterations. Stopping.",
                    tolerance, delta, max_iterations
                );
                break false;
            }
        };

        Ok(ReducedModel {
            lambda,
            gamma,
            iterations: log_likelihoods.len(),
            log_likelihoods,
            converged,
            final_delta: delta,
        })
    }
}

/// Estimate a reduced model with `k` latent states, initialised from OS entropy.
///
/// Defaults in the reference formulation are `k = 1`,
/// `convergence = 1e-16` and `max_iter = 1000`.
pub fn estimate_dbmr(
    counts: &DMatrix<f64>,
    k: usize,
    convergence: f64,
    max_iter: usize,
) -> DbmrResult<ReducedModel> {
    estimate_dbmr_with_rng(counts, k, convergence, max_iter, &mut SecureRng::new())
}

/// Estimate a reduced model with a caller-supplied generator.
pub fn estimate_dbmr_with_rng<R: Rng + ?Sized>(
    counts: &DMatrix<f64>,
    k: usize,
    convergence: f64,
    max_iter: usize,
    rng: &mut R,
) -> DbmrResult<ReducedModel> {
    let config = DbmrConfig::new(k)
        .with_convergence(convergence)
        .with_max_iterations(max_iter);
    DbmrEstimator::with_config(config).fit_with_rng(counts, rng)
}

/// Uniform random N×K matrix with columns normalised to sum to 1.
pub fn initialize_lambda<R: Rng + ?Sized>(
    n: usize,
    k: usize,
    rng: &mut R,
) -> DbmrResult<DMatrix<f64>> {
    let mut lambda = DMatrix::from_fn(n, k, |_, _| rng.gen::<f64>());
    normalize_columns(&mut lambda, "initialize_lambda")?;
    Ok(lambda)
}

/// Recompute the hard assignment in place.
///
/// Every entry of `gamma` is reset to the floor, then for each observed
/// state `j` the row `argmax_k Σ_i C[i,j] · ln(max(Lambda[i,k], 1e-16))` is
/// set to 1. Ties go to the lowest latent index.
pub fn assign_states(
    lambda: &DMatrix<f64>,
    counts: &DMatrix<f64>,
    gamma: &mut DMatrix<f64>,
) -> DbmrResult<()> {
    let n = counts.nrows();
    ensure_shape(counts, (n, n), "counts")?;
    let k = lambda.ncols();
    ensure_shape(lambda, (n, k), "lambda")?;
    ensure_shape(gamma, (k, n), "gamma")?;

    // scores[k,j] = Σ_i ln Lambda[i,k] · C[i,j]
    let scores = floored_ln_matrix(lambda).transpose() * counts;

    gamma.fill(ASSIGNMENT_FLOOR);
    for (j, column) in scores.column_iter().enumerate() {
        let best = argmax_first(column.iter().copied()).ok_or_else(|| {
            DbmrError::NumericDegeneracy {
                reason: format!("no finite assignment score for observed state {}", j),
                operation: Some("assign_states".to_string()),
            }
        })?;
        gamma[(best, j)] = ASSIGNMENT_SELECTED;
    }
    Ok(())
}

/// Aggregate counts over the assignment and renormalise.
///
/// Returns `Lambda[i,k] = raw[k,i] / Σ_i' raw[k,i']` with
/// `raw[k,i] = Σ_j C[i,j] · Gamma[k,j]`.
///
/// # Errors
/// [`DbmrError::NumericDegeneracy`] when some latent state receives no count
/// mass at all.
pub fn update_lambda(counts: &DMatrix<f64>, gamma: &DMatrix<f64>) -> DbmrResult<DMatrix<f64>> {
    let n = counts.nrows();
    ensure_shape(counts, (n, n), "counts")?;
    let k = gamma.nrows();
    ensure_shape(gamma, (k, n), "gamma")?;

    // (C · Gammaᵀ)[i,k] = raw[k,i]
    let mut lambda = counts * gamma.transpose();
    normalize_columns(&mut lambda, "update_lambda")?;
    Ok(lambda)
}
