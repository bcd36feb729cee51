/*!
# Metropolis Sampler

A random-walk Metropolis sampler that works with any target implementing [`Target`] and any
symmetric proposal implementing [`Proposal`]. All randomness (proposal offsets and acceptance
draws) comes from one seeded [`Lcg`], so a run is determined by its seed, settings and
starting state.

## Step

1. Draw a candidate from the proposal, one draw per coordinate.
2. If the candidate is outside the target's support the step is rejected immediately: the
   target is not evaluated and no acceptance uniform is drawn.
3. Otherwise accept when `ln(u + ε) < log p(candidate) − log p(current)`.

Because both proposals are symmetric there is no Hastings correction. A candidate whose
log-density is `-∞` yields `-∞` on the right-hand side and is never accepted; no `NaN` enters
the chain because the current state always has a finite log-density once the chain starts
from a feasible point.

## Example

```rust
use bayes_viz::core::{run_chain, RunLength};
use bayes_viz::dataset::SyntheticDataset;
use bayes_viz::metropolis_hastings::{MetropolisHastings, UniformProposal};

let data = SyntheticDataset::default();
let mut chain = MetropolisHastings::new(data.posterior(), UniformProposal::new(0.15), &[0.5, 1.0], 42);
let run = run_chain(&mut chain, RunLength { n_collect: 300, n_discard: 500, trajectory_len: 100 });
assert_eq!(run.samples.len(), 300);
assert!(run.samples.iter().all(|s| s[1] > 0.0));
```
*/

use crate::core::MarkovChain;
use crate::distributions::Target;
use crate::rng::{box_muller, Lcg};

/// A symmetric proposal kernel, `q(x' | x) = q(x | x')`.
pub trait Proposal {
    /// Draws a candidate around `current` using `rng`.
    fn sample(&self, current: &[f64], rng: &mut Lcg) -> Vec<f64>;
}

/// Perturbs every coordinate by an independent uniform offset in `[-step_size, step_size)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformProposal {
    pub step_size: f64,
}

impl UniformProposal {
    pub fn new(step_size: f64) -> Self {
        Self { step_size }
    }
}

impl Proposal for UniformProposal {
    fn sample(&self, current: &[f64], rng: &mut Lcg) -> Vec<f64> {
        current
            .iter()
            .map(|x| x + rng.next_symmetric(self.step_size))
            .collect()
    }
}

/// Adds independent Gaussian noise with standard deviation `std` to every coordinate,
/// using Box-Muller deviates from the chain's generator (one pair per coordinate, the second
/// half discarded so each coordinate costs exactly two uniforms).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IsotropicGaussian {
    pub std: f64,
}

impl IsotropicGaussian {
    pub fn new(std: f64) -> Self {
        Self { std }
    }
}

impl Proposal for IsotropicGaussian {
    fn sample(&self, current: &[f64], rng: &mut Lcg) -> Vec<f64> {
        current
            .iter()
            .map(|x| x + self.std * box_muller(rng).0)
            .collect()
    }
}

/// A single Metropolis chain.
#[derive(Debug, Clone)]
pub struct MetropolisHastings<D, Q> {
    /// The target distribution to sample from.
    pub target: D,
    /// The proposal used to generate candidates.
    pub proposal: Q,
    current_state: Vec<f64>,
    current_lp: f64,
    last_accepted: bool,
    rng: Lcg,
}

impl<D, Q> MetropolisHastings<D, Q>
where
    D: Target,
    Q: Proposal,
{
    /// Creates a chain at `initial_state` whose draws come from an [`Lcg`] seeded with `seed`.
    pub fn new(target: D, proposal: Q, initial_state: &[f64], seed: u32) -> Self {
        let current_lp = if target.in_support(initial_state) {
            target.unnorm_log_prob(initial_state)
        } else {
            f64::NEG_INFINITY
        };
        Self {
            target,
            proposal,
            current_state: initial_state.to_vec(),
            current_lp,
            last_accepted: false,
            rng: Lcg::new(seed),
        }
    }

    /// Unnormalized log-density of the current state.
    pub fn current_log_prob(&self) -> f64 {
        self.current_lp
    }

    fn accept(&mut self, proposed: &[f64]) -> Option<f64> {
        if !self.target.in_support(proposed) {
            return None;
        }
        let proposed_lp = self.target.unnorm_log_prob(proposed);
        let log_accept_ratio = proposed_lp - self.current_lp;
        let log_u = self.rng.next_log_uniform();
        // A NaN ratio (both sides -∞) compares false and is rejected.
        (log_u < log_accept_ratio).then_some(proposed_lp)
    }
}

impl<D, Q> MarkovChain for MetropolisHastings<D, Q>
where
    D: Target,
    Q: Proposal,
{
    fn step(&mut self) -> &[f64] {
        let proposed = self.proposal.sample(&self.current_state, &mut self.rng);
        match self.accept(&proposed) {
            Some(lp) => {
                self.current_state = proposed;
                self.current_lp = lp;
                self.last_accepted = true;
            }
            None => self.last_accepted = false,
        }
        &self.current_state
    }

    fn current_state(&self) -> &[f64] {
        &self.current_state
    }

    fn last_accepted(&self) -> bool {
        self.last_accepted
    }
}
