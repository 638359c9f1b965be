//! Result structure for a reduced model.

use crate::math_utils::argmax_first;
use nalgebra::DMatrix;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Output of one DBMR estimation run
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ReducedModel {
    /// Stochastic matrix (N×K); column k is the distribution over observed
    /// states given latent state k
    pub lambda: DMatrix<f64>,
    /// Assignment matrix (K×N); one entry per column is 1, the rest hold the floor
    pub gamma: DMatrix<f64>,
    /// Log-likelihood after each iteration
    pub log_likelihoods: Vec<f64>,
    /// Whether the stopping rule was met before the iteration cap
    pub converged: bool,
    /// Number of iterations performed (equals `log_likelihoods.len()`)
    pub iterations: usize,
    /// Absolute change between the last two likelihoods; infinite after a
    /// single iteration
    pub final_delta: f64,
}

impl ReducedModel {
    /// Number of observed states N
    pub fn num_observed_states(&self) -> usize {
        self.lambda.nrows()
    }

    /// Number of latent states K
    pub fn num_latent_states(&self) -> usize {
        self.lambda.ncols()
    }

    /// Last recorded log-likelihood
    pub fn final_log_likelihood(&self) -> Option<f64> {
        self.log_likelihoods.last().copied()
    }

    /// Latent state assigned to each observed state.
    pub fn assignments(&self) -> Vec<usize> {
        self.gamma
            .column_iter()
            .map(|column| argmax_first(column.iter().copied()).unwrap_or(0))
            .collect()
    }

    /// Observed states assigned to `latent_state`, in increasing order.
    pub fn members(&self, latent_state: usize) -> Vec<usize> {
        self.assignments()
            .into_iter()
            .enumerate()
            .filter(|&(_, k)| k == latent_state)
            .map(|(j, _)| j)
            .collect()
    }

    /// `Lambda · Gamma`, the N×N approximation of P(next = i | current = j)
    /// implied by the reduced model. Columns sum to 1 up to the assignment floor.
    pub fn reconstructed_transition_matrix(&self) -> DMatrix<f64> {
        &self.lambda * &self.gamma
    }

    /// Split into `(lambda, gamma, log_likelihoods)`.
    pub fn into_parts(self) -> (DMatrix<f64>, DMatrix<f64>, Vec<f64>) {
        (self.lambda, self.gamma, self.log_likelihoods)
    }
}
