//! # Direct Bayesian Model Reduction
//!
//! Reduction of categorical transition processes following Gerber & Horenko
//! (PNAS 2017).
//!
//! Given a transition-count matrix `C` over `N` observed states, DBMR infers
//! a latent process with `K` states and returns
//!
//! - **Lambda** (N×K): column `k` is the distribution over observed states
//!   given latent state `k`,
//! - **Gamma** (K×N): a hard assignment of every observed state to one latent
//!   state (selected entry `1`, others floored at `1e-16`),
//! - the per-iteration **log-likelihood trace**.
//!
//! ## Quick Start
//!
//! ```rust
//! use dbmr::{DbmrConfig, DbmrEstimator};
//! use nalgebra::DMatrix;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let counts = DMatrix::from_row_slice(4, 4, &[
//!         9.0, 7.0, 1.0, 0.0,
//!         6.0, 8.0, 0.0, 1.0,
//!         1.0, 0.0, 8.0, 7.0,
//!         0.0, 1.0, 6.0, 9.0,
//!     ]);
//!
//!     let estimator = DbmrEstimator::with_config(DbmrConfig::new(2).with_seed(42));
//!     let model = estimator.fit(&counts)?;
//!
//!     println!("assignments: {:?}", model.assignments());
//!     println!("log-likelihood: {:?}", model.final_log_likelihood());
//!     Ok(())
//! }
//! ```
//!
//! Non-convergence within the iteration cap is not an error: it is reported
//! through `log::warn!` and [`ReducedModel::converged`].

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod errors;
pub mod estimator;
pub mod likelihood;
pub mod math_utils;
pub mod results;
pub mod secure_rng;

pub use config::DbmrConfig;
pub use errors::{DbmrError, DbmrResult};
pub use estimator::{
    assign_states, estimate_dbmr, estimate_dbmr_with_rng, initialize_lambda, update_lambda,
    DbmrEstimator,
};
pub use likelihood::dbmr_log_likelihood;
pub use math_utils::count_matrix_from_rows;
pub use results::ReducedModel;
pub use secure_rng::SecureRng;
