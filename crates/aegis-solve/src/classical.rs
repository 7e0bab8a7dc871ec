//! Classical baselines: exhaustive search and greedy descent.

use std::time::Instant;

use aegis_qubo::{Bitstring, QuboError, QuboInstance};
use tracing::{debug, info};

use crate::error::{SolveError, SolveResult};
use crate::result::{SolverKind, SolverResult, Trajectory};

/// Default variable ceiling for [`BruteForce`].
pub const DEFAULT_MAX_VARIABLES: usize = 24;

/// Exact minimisation by enumerating all 2^N assignments.
///
/// Assignments are visited in Gray-code order so each step flips one bit and
/// costs O(N) through [`QuboInstance::flip_delta`]. The first minimum found
/// wins ties, and its cost is recomputed exactly at the end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BruteForce {
    max_variables: usize,
}

impl Default for BruteForce {
    fn default() -> Self {
        Self {
            max_variables: DEFAULT_MAX_VARIABLES,
        }
    }
}

impl BruteForce {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse instances above `max_variables`.
    #[must_use]
    pub fn with_max_variables(mut self, max_variables: usize) -> Self {
        self.max_variables = max_variables;
        self
    }

    /// Configured ceiling.
    pub fn max_variables(&self) -> usize {
        self.max_variables
    }

    pub fn solve(&self, qubo: &QuboInstance) -> SolveResult<SolverResult> {
        let n = qubo.n();
        // also keeps 1 << n inside usize
        let limit = self.max_variables.min(usize::BITS as usize - 1);
        if n > limit {
            return Err(SolveError::IntractableSize {
                solver: "brute_force",
                n,
                limit,
            });
        }

        let start = Instant::now();
        let total = 1usize << n;
        let mut x = Bitstring::zeros(n);
        let mut cost = qubo.evaluate(&x);
        let mut best = x.clone();
        let mut best_cost = cost;

        for k in 1..total {
            let bit = k.trailing_zeros() as usize;
            cost += qubo.flip_delta(&x, bit);
            x.flip(bit);
            if cost < best_cost {
                best_cost = cost;
                best.clone_from(&x);
            }
        }

        let exact = qubo.evaluate(&best);
        let mut trajectory = Trajectory::new();
        trajectory.push(0, exact);
        let duration = start.elapsed();

        info!(n, cost = exact, bitstring = %best, ?duration, "brute force finished");

        Ok(SolverResult::classical(
            SolverKind::BruteForce,
            best,
            exact,
            trajectory,
            duration,
            total,
        ))
    }
}

/// Steepest-descent single-bit flips down to a local optimum.
///
/// Each round flips the bit with the largest cost decrease (lowest index on
/// ties) and stops when no flip strictly improves.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Greedy {
    start: Option<Bitstring>,
    max_flips: Option<usize>,
}

impl Greedy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from `start` instead of the all-zero assignment.
    #[must_use]
    pub fn with_start(mut self, start: Bitstring) -> Self {
        self.start = Some(start);
        self
    }

    /// Cap the number of accepted flips.
    #[must_use]
    pub fn with_max_flips(mut self, max_flips: usize) -> Self {
        self.max_flips = Some(max_flips);
        self
    }

    pub fn solve(&self, qubo: &QuboInstance) -> SolveResult<SolverResult> {
        let n = qubo.n();
        let mut x = match &self.start {
            Some(s) if s.len() != n => {
                return Err(QuboError::SizeMismatch {
                    expected: n,
                    got: s.len(),
                }
                .into());
            }
            Some(s) => s.clone(),
            None => Bitstring::zeros(n),
        };
        // every flip strictly lowers the cost, so 2^N bounds the walk
        let max_flips = self
            .max_flips
            .unwrap_or_else(|| 1usize.checked_shl(n as u32).unwrap_or(usize::MAX));

        let start = Instant::now();
        let mut cost = qubo.evaluate(&x);
        let mut evaluations = 1;
        let mut trajectory = Trajectory::new();
        trajectory.push(0, cost);

        let mut flips = 0;
        while flips < max_flips {
            let mut best: Option<(usize, f64)> = None;
            for i in 0..n {
                let delta = qubo.flip_delta(&x, i);
                evaluations += 1;
                if delta < 0.0 && best.is_none_or(|(_, d)| delta < d) {
                    best = Some((i, delta));
                }
            }
            let Some((i, delta)) = best else {
                break;
            };
            x.flip(i);
            cost += delta;
            flips += 1;
            trajectory.push(flips, cost);
            debug!(flip = flips, bit = i, delta, cost, "greedy flip");
        }

        let exact = qubo.evaluate(&x);
        let duration = start.elapsed();
        info!(n, flips, cost = exact, bitstring = %x, ?duration, "greedy finished");

        Ok(SolverResult::classical(
            SolverKind::Greedy,
            x,
            exact,
            trajectory,
            duration,
            evaluations,
        ))
    }
}
