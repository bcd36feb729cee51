/*!
# Chain Driver

This module provides the single-chain machinery shared by the samplers:
- The [`MarkovChain`] trait, which abstracts one chain that can be stepped.
- [`run_chain`], which runs a chain for a burn-in phase plus a number of retained draws and
  returns a [`ChainRun`]: the retained samples, a bounded trajectory prefix for path drawing,
  and acceptance counts.

Runs are synchronous: one call executes every step. Two chains built from the same seed,
settings and starting point produce identical [`ChainRun`]s.
*/

use serde::Serialize;
use tracing::debug;

/// A trait that abstracts a single MCMC chain.
pub trait MarkovChain {
    /// Performs one iteration of the chain and returns the new current state.
    fn step(&mut self) -> &[f64];

    /// Returns the current state without advancing the chain.
    fn current_state(&self) -> &[f64];

    /// Whether the proposal of the most recent step was accepted.
    fn last_accepted(&self) -> bool;
}

/// How many steps to run and which of them to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunLength {
    /// Retained draws after burn-in.
    pub n_collect: usize,
    /// Initial steps discarded before anything is retained.
    pub n_discard: usize,
    /// Maximum number of post-burn-in states kept for path rendering.
    pub trajectory_len: usize,
}

/// Everything a chain run produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChainRun {
    /// Post-burn-in states, one per retained step.
    pub samples: Vec<Vec<f64>>,
    /// The first `trajectory_len` post-burn-in states.
    pub trajectory: Vec<Vec<f64>>,
    /// Accepted proposals over the whole run, burn-in included.
    pub accepted: usize,
    /// Accepted proposals after burn-in.
    pub accepted_after_burn_in: usize,
    /// Total steps, burn-in included.
    pub steps: usize,
    pub burn_in: usize,
}

impl ChainRun {
    /// Accepted steps divided by all steps, burn-in included.
    pub fn acceptance_rate(&self) -> f64 {
        if self.steps == 0 {
            return 0.0;
        }
        self.accepted as f64 / self.steps as f64
    }

    /// Acceptance rate over the retained steps only.
    pub fn sampling_acceptance_rate(&self) -> f64 {
        let kept = self.steps.saturating_sub(self.burn_in);
        if kept == 0 {
            return 0.0;
        }
        self.accepted_after_burn_in as f64 / kept as f64
    }

    /// Column `dim` of the retained samples.
    pub fn marginal(&self, dim: usize) -> Vec<f64> {
        self.samples.iter().map(|s| s[dim]).collect()
    }
}

/// Runs `chain` for `len.n_discard + len.n_collect` steps.
pub fn run_chain<M: MarkovChain>(chain: &mut M, len: RunLength) -> ChainRun {
    let total = len.n_discard + len.n_collect;
    let mut samples = Vec::with_capacity(len.n_collect);
    let mut trajectory = Vec::with_capacity(len.trajectory_len.min(len.n_collect));
    let mut accepted = 0;
    let mut accepted_after_burn_in = 0;

    for i in 0..total {
        let state = chain.step().to_vec();
        let moved = chain.last_accepted();
        if moved {
            accepted += 1;
        }
        if i >= len.n_discard {
            if moved {
                accepted_after_burn_in += 1;
            }
            if trajectory.len() < len.trajectory_len {
                trajectory.push(state.clone());
            }
            samples.push(state);
        }
    }

    let run = ChainRun {
        samples,
        trajectory,
        accepted,
        accepted_after_burn_in,
        steps: total,
        burn_in: len.n_discard,
    };
    debug!(
        steps = run.steps,
        accepted = run.accepted,
        acceptance_rate = run.acceptance_rate(),
        "chain run finished"
    );
    run
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Walks +1 on every step, accepting every other proposal.
    struct Counter {
        state: Vec<f64>,
        accepted: bool,
        calls: usize,
    }

    impl MarkovChain for Counter {
        fn step(&mut self) -> &[f64] {
            self.calls += 1;
            self.accepted = self.calls % 2 == 0;
            if self.accepted {
                self.state[0] += 1.0;
            }
            &self.state
        }

        fn current_state(&self) -> &[f64] {
            &self.state
        }

        fn last_accepted(&self) -> bool {
            self.accepted
        }
    }

    fn counter() -> Counter {
        Counter {
            state: vec![0.0],
            accepted: false,
            calls: 0,
        }
    }

    #[test]
    fn burn_in_is_discarded() {
        let run = run_chain(
            &mut counter(),
            RunLength {
                n_collect: 10,
                n_discard: 4,
                trajectory_len: 3,
            },
        );
        assert_eq!(run.samples.len(), 10);
        assert_eq!(run.steps, 14);
        // Steps 1..=4 are burn-in; the state after step 5 is 2.
        assert_eq!(run.samples[0], vec![2.0]);
        assert_eq!(run.trajectory, vec![vec![2.0], vec![3.0], vec![3.0]]);
    }

    #[test]
    fn acceptance_counts_include_burn_in() {
        let run = run_chain(
            &mut counter(),
            RunLength {
                n_collect: 6,
                n_discard: 4,
                trajectory_len: 100,
            },
        );
        assert_eq!(run.accepted, 5);
        assert_eq!(run.accepted_after_burn_in, 3);
        assert!((run.acceptance_rate() - 0.5).abs() < 1e-12);
        assert!((run.sampling_acceptance_rate() - 0.5).abs() < 1e-12);
        assert_eq!(run.trajectory.len(), 6);
    }

    #[test]
    fn empty_run() {
        let run = run_chain(
            &mut counter(),
            RunLength {
                n_collect: 0,
                n_discard: 0,
                trajectory_len: 10,
            },
        );
        assert!(run.samples.is_empty());
        assert_eq!(run.acceptance_rate(), 0.0);
        assert_eq!(run.sampling_acceptance_rate(), 0.0);
    }

    #[test]
    fn burn_in_longer_than_run() {
        let run = ChainRun {
            samples: Vec::new(),
            trajectory: Vec::new(),
            accepted: 0,
            accepted_after_burn_in: 0,
            steps: 0,
            burn_in: 5,
        };
        assert_eq!(run.sampling_acceptance_rate(), 0.0);
        assert_eq!(run.acceptance_rate(), 0.0);
    }
}
