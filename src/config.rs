//! # Estimator Configuration
//!
//! Configuration for the alternating DBMR estimator: the number of latent
//! states, the stopping rule and the optional seed for initialisation.

use crate::errors::{validate_count, validate_parameter, DbmrResult};
use crate::math_utils::constants::{DEFAULT_CONVERGENCE, DEFAULT_MAX_ITERATIONS};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for a single estimation run
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DbmrConfig {
    /// Number of latent states K
    pub num_latent_states: usize,
    /// Stop once the absolute log-likelihood change is at or below this value
    pub convergence_tolerance: f64,
    /// Stop (unconverged) once more than this many likelihoods were recorded
    pub max_iterations: usize,
    /// Seed for the initial stochastic matrix; OS entropy when `None`
    pub seed: Option<u64>,
}

impl Default for DbmrConfig {
    fn default() -> Self {
        Self {
            num_latent_states: 1,
            convergence_tolerance: DEFAULT_CONVERGENCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            seed: None,
        }
    }
}

impl DbmrConfig {
    /// Default configuration with `num_latent_states` latent states.
    pub fn new(num_latent_states: usize) -> Self {
        Self {
            num_latent_states,
            ..Self::default()
        }
    }

    /// Default configuration with a fixed seed.
    pub fn reproducible(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    /// Set the number of latent states
    pub fn with_latent_states(mut self, num_latent_states: usize) -> Self {
        self.num_latent_states = num_latent_states;
        self
    }

    /// Set the convergence tolerance
    pub fn with_convergence(mut self, convergence_tolerance: f64) -> Self {
        self.convergence_tolerance = convergence_tolerance;
        self
    }

    /// Set the iteration cap
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check the parameter preconditions: K >= 1, max_iterations >= 1 and a
    /// nonnegative, non-NaN convergence tolerance.
    pub fn validate(&self) -> DbmrResult<()> {
        validate_count(self.num_latent_states, 1, "num_latent_states")?;
        validate_count(self.max_iterations, 1, "max_iterations")?;
        validate_parameter(
            self.convergence_tolerance,
            0.0,
            f64::INFINITY,
            "convergence_tolerance",
        )
    }
}
