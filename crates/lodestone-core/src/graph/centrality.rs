//! Stationary-distribution solver over the affinity matrix.
//!
//! TextRank-style power iteration: row-normalize the affinity matrix into a
//! stochastic transition matrix, blend with a uniform teleport term, and
//! iterate to a fixed point. Higher score means a more central token in this
//! window's cooccurrence graph.

use rand::Rng;
use tracing::debug;

use super::cooccurrence::AffinityMatrix;
use crate::config;

/// Parameters for the power-iteration solve.
#[derive(Debug, Clone, Copy)]
pub struct CentralityConfig {
    /// Teleport damping factor; clamped to [0, 1].
    pub damping: f64,
    /// Convergence threshold on the sum of squared componentwise deltas;
    /// clamped to [0, 1].
    pub epsilon: f64,
    /// Safety cap on iteration rounds. Convergence is the normal exit; the
    /// cap guarantees termination on pathological inputs.
    pub max_iterations: usize,
}

impl Default for CentralityConfig {
    fn default() -> Self {
        Self {
            damping: config::DAMPING,
            epsilon: config::CONVERGENCE_EPSILON,
            max_iterations: config::MAX_POWER_ITERATIONS,
        }
    }
}

/// Solves for the stationary distribution of `matrix` by power iteration.
///
/// Rows with zero total are left zero rather than renormalized; their mass
/// reaches the rest of the graph only through the teleport term. The
/// returned vector is L1-normalized: entries are non-negative and sum to 1
/// for any non-degenerate input. An empty matrix yields an empty vector.
pub fn centrality(matrix: &AffinityMatrix, cfg: CentralityConfig) -> Vec<f64> {
    let n = matrix.dim();
    if n == 0 {
        return Vec::new();
    }
    let d = cfg.damping.clamp(0.0, 1.0);
    let e = cfg.epsilon.clamp(0.0, 1.0);

    // Row-normalize into transition probabilities, kept sparse.
    let mut row_sums = vec![0.0f64; n];
    for (i, _, x) in matrix.iter() {
        row_sums[i as usize] += x;
    }
    let transitions: Vec<(u32, u32, f64)> = matrix
        .iter()
        .filter(|&(i, _, _)| row_sums[i as usize] > 0.0)
        .map(|(i, j, x)| (i, j, x / row_sums[i as usize]))
        .collect();

    // Independent uniform-random positive entries.
    let mut rng = rand::thread_rng();
    let mut v: Vec<f64> = (0..n).map(|_| rng.gen::<f64>() / n as f64).collect();

    // v <- (1-d) * A_norm * v + (d/n) * sum(v), folded so the dense teleport
    // blend is never materialized.
    let mut rounds = 0;
    for round in 0..cfg.max_iterations {
        rounds = round + 1;
        let total: f64 = v.iter().sum();
        let mut next = vec![d / n as f64 * total; n];
        for &(i, j, p) in &transitions {
            next[i as usize] += (1.0 - d) * p * v[j as usize];
        }
        let qerr: f64 = next
            .iter()
            .zip(v.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum();
        v = next;
        if qerr < e {
            break;
        }
    }
    debug!(n, rounds, "centrality converged");

    let total: f64 = v.iter().sum();
    if total > 0.0 {
        for x in &mut v {
            *x /= total;
        }
    } else {
        // all-zero iterate (d = 0 on a disconnected graph): uniform fallback
        v.fill(1.0 / n as f64);
    }
    v
}
