//! Integration tests for the properties every reduced model must satisfy.
//!
//! These tests run the full estimator on small count matrices and validate
//! the stochastic/assignment structure of the output, the likelihood trace
//! and reproducibility under a fixed seed.

use assert_approx_eq::assert_approx_eq;
use dbmr::{
    count_matrix_from_rows, dbmr_log_likelihood, estimate_dbmr, estimate_dbmr_with_rng,
    DbmrConfig, DbmrEstimator, ReducedModel, SecureRng,
};
use nalgebra::DMatrix;

const FLOOR: f64 = 1e-16;

fn block_counts() -> DMatrix<f64> {
    // Observed states 0..3 share an outgoing profile, as do 3..6
    let mut rows = Vec::with_capacity(6);
    for i in 0..6 {
        let row: Vec<f64> = (0..6)
            .map(|j| {
                let same_block = (i < 3) == (j < 3);
                if same_block {
                    10.0 + (i + j) as f64 % 2.0
                } else {
                    1.0
                }
            })
            .collect();
        rows.push(row);
    }
    count_matrix_from_rows(&rows).unwrap()
}

fn assert_valid_model(model: &ReducedModel, n: usize, k: usize, max_iter: usize) {
    assert_eq!(model.lambda.shape(), (n, k));
    assert_eq!(model.gamma.shape(), (k, n));

    for column in model.lambda.column_iter() {
        assert_approx_eq!(column.sum(), 1.0, 1e-9);
    }

    for (j, column) in model.gamma.column_iter().enumerate() {
        let ones = column.iter().filter(|&&x| x == 1.0).count();
        let floors = column.iter().filter(|&&x| x == FLOOR).count();
        assert_eq!(ones, 1, "observed state {} must have one assignment", j);
        assert_eq!(floors, k - 1);
    }

    assert!(!model.log_likelihoods.is_empty());
    assert!(model.log_likelihoods.len() <= max_iter + 1);
    assert!(model.log_likelihoods.iter().all(|ll| ll.is_finite()));
}

/// Test scenario: structural postconditions across seeds and latent sizes
#[test]
fn test_postconditions_hold_for_many_seeds() {
    let counts = block_counts();
    for k in 1..=4 {
        for seed in 0..10 {
            let mut rng = SecureRng::with_seed(seed);
            let model = estimate_dbmr_with_rng(&counts, k, 1e-16, 1000, &mut rng).unwrap();
            assert_valid_model(&model, 6, k, 1000);
        }
    }
}

/// Test scenario: fixed seed gives bit-identical output
#[test]
fn test_fixed_seed_is_bit_identical() {
    let counts = block_counts();
    let estimator = DbmrEstimator::with_config(DbmrConfig::new(3).with_seed(2024));

    let a = estimator.fit(&counts).unwrap();
    let b = estimator.fit(&counts).unwrap();

    let bits = |m: &DMatrix<f64>| m.iter().map(|x| x.to_bits()).collect::<Vec<u64>>();
    assert_eq!(bits(&a.lambda), bits(&b.lambda));
    assert_eq!(bits(&a.gamma), bits(&b.gamma));
    let lls_a: Vec<u64> = a.log_likelihoods.iter().map(|x| x.to_bits()).collect();
    let lls_b: Vec<u64> = b.log_likelihoods.iter().map(|x| x.to_bits()).collect();
    assert_eq!(lls_a, lls_b);
    assert_eq!(a, b);
}

/// Test scenario: 2×2 identity-like counts with K = 2
///
/// Each observed state gets its own latent state and Lambda is near-diagonal.
#[test]
fn test_identity_counts_split_into_two_latent_states() {
    let counts = DMatrix::from_row_slice(2, 2, &[10.0, 0.0, 0.0, 10.0]);

    for seed in 0..20 {
        let mut rng = SecureRng::with_seed(seed);
        let model = estimate_dbmr_with_rng(&counts, 2, 1e-16, 1000, &mut rng).unwrap();
        assert_valid_model(&model, 2, 2, 1000);

        let assignments = model.assignments();
        assert_ne!(assignments[0], assignments[1], "seed {}", seed);
        for (i, &k) in assignments.iter().enumerate() {
            assert!(model.lambda[(i, k)] > 0.99, "seed {}: lambda = {}", seed, model.lambda);
        }
        assert!(model.converged);
    }
}

/// Test scenario: K = 1 collapses everything onto the row marginal
#[test]
fn test_single_latent_state_recovers_row_marginal() {
    let counts = DMatrix::from_row_slice(3, 3, &[2.0, 1.0, 0.0, 4.0, 0.0, 1.0, 0.0, 0.0, 2.0]);
    let total = counts.sum();

    let mut rng = SecureRng::with_seed(5);
    let model = estimate_dbmr_with_rng(&counts, 1, 1e-16, 1000, &mut rng).unwrap();

    assert!(model.gamma.iter().all(|&x| x == 1.0));
    for i in 0..3 {
        assert_approx_eq!(model.lambda[(i, 0)], counts.row(i).sum() / total, 1e-12);
    }
    assert_eq!(model.log_likelihoods.len(), 2);
    assert!(model.converged);
}

/// Test scenario: max_iter = 1 always records exactly two likelihoods
#[test]
fn test_max_iter_one_records_two_likelihoods() {
    let counts = block_counts();
    for seed in 0..5 {
        let mut rng = SecureRng::with_seed(seed);
        let model = estimate_dbmr_with_rng(&counts, 2, 1e-16, 1, &mut rng).unwrap();
        assert_eq!(model.log_likelihoods.len(), 2);
        assert_eq!(model.iterations, 2);
        assert_valid_model(&model, 6, 2, 1);
        if !model.converged {
            assert!(model.final_delta > 1e-16);
        }
    }
}

/// Test scenario: a cap that is hit reports non-convergence without failing
#[test]
fn test_non_convergence_is_reported_not_raised() {
    let counts = block_counts();
    let tolerance = 1e-16;
    let max_iter = 1;

    for &seed in [0u64, 4].iter() {
        let config = DbmrConfig::new(2)
            .with_convergence(tolerance)
            .with_max_iterations(max_iter)
            .with_seed(seed);

        let model = DbmrEstimator::with_config(config).fit(&counts).unwrap();
        assert!(!model.converged, "seed {} should hit the iteration cap", seed);
        assert_eq!(model.log_likelihoods.len(), max_iter + 1);
        assert_eq!(model.iterations, max_iter + 1);
        assert!(model.final_delta > tolerance);
        assert_valid_model(&model, 6, 2, max_iter);
    }
}

/// Test scenario: the returned trace matches a fresh likelihood evaluation
#[test]
fn test_final_likelihood_matches_evaluator() {
    let counts = block_counts();
    let mut rng = SecureRng::with_seed(77);
    let model = estimate_dbmr_with_rng(&counts, 2, 1e-16, 1000, &mut rng).unwrap();

    let recomputed = dbmr_log_likelihood(&model.lambda, &model.gamma, &counts).unwrap();
    assert_eq!(model.final_log_likelihood(), Some(recomputed));
}

/// Test scenario: on separated blocks the likelihood trace does not decrease
/// and its successive changes shrink towards termination
#[test]
fn test_likelihood_trace_settles() {
    let counts = block_counts();
    for seed in 0..10 {
        let mut rng = SecureRng::with_seed(seed);
        let model = estimate_dbmr_with_rng(&counts, 2, 1e-16, 1000, &mut rng).unwrap();
        assert!(model.converged, "seed {}", seed);

        let lls = &model.log_likelihoods;
        for pair in lls.windows(2) {
            let tolerance = 1e-9 * pair[0].abs().max(1.0);
            assert!(
                pair[1] >= pair[0] - tolerance,
                "seed {}: trace decreased {:?}",
                seed,
                lls
            );
        }

        let deltas: Vec<f64> = lls.windows(2).map(|w| (w[1] - w[0]).abs()).collect();
        let tail = &deltas[deltas.len().saturating_sub(2)..];
        for pair in tail.windows(2) {
            assert!(
                pair[1] <= pair[0],
                "seed {}: deltas grew near termination {:?}",
                seed,
                deltas
            );
        }
        assert_eq!(deltas.last().copied(), Some(model.final_delta));
    }
}

/// Test scenario: block structure is recovered by the best of several starts
#[test]
fn test_block_structure_recovered() {
    let counts = block_counts();

    let best = (0..20)
        .map(|seed| {
            let mut rng = SecureRng::with_seed(seed);
            estimate_dbmr_with_rng(&counts, 2, 1e-16, 1000, &mut rng).unwrap()
        })
        .max_by(|a, b| {
            a.final_log_likelihood()
                .partial_cmp(&b.final_log_likelihood())
                .unwrap()
        })
        .unwrap();

    let assignments = best.assignments();
    assert_eq!(assignments[0], assignments[1]);
    assert_eq!(assignments[1], assignments[2]);
    assert_eq!(assignments[3], assignments[4]);
    assert_eq!(assignments[4], assignments[5]);
    assert_ne!(assignments[0], assignments[3]);

    let first = assignments[0];
    assert_eq!(best.members(first), vec![0, 1, 2]);

    let p = best.reconstructed_transition_matrix();
    for column in p.column_iter() {
        assert_approx_eq!(column.sum(), 1.0, 1e-9);
    }
}

/// Test scenario: OS-entropy entry point still satisfies the postconditions
#[test]
fn test_unseeded_entry_point() {
    let counts = block_counts();
    let model = estimate_dbmr(&counts, 2, 1e-16, 1000).unwrap();
    assert_valid_model(&model, 6, 2, 1000);

    let (lambda, gamma, lls) = model.into_parts();
    assert_eq!(lambda.ncols(), 2);
    assert_eq!(gamma.nrows(), 2);
    assert!(!lls.is_empty());
}
