/*!
Decorative "live" trace for the convergence chapter.

[`TraceAnimation`] imitates a sampler trace plot updating over time: every [`tick`] (driven by
the host's periodic timer) appends one point that wanders around a centre with Gaussian
jitter. It is an animation, not an MCMC run. Its points come from an arbitrary `rand`
generator, are not draws from any posterior, and carry none of the seeded sampler's
reproducibility guarantees.

[`tick`]: TraceAnimation::tick
*/

use std::collections::VecDeque;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

use crate::distributions::SCALE_FLOOR;

/// A bounded window of fabricated trace values.
#[derive(Debug, Clone)]
pub struct TraceAnimation<R: Rng = SmallRng> {
    points: VecDeque<f64>,
    capacity: usize,
    centre: f64,
    /// Fraction of the distance to the centre recovered each tick, in `[0, 1]`.
    reversion: f64,
    jitter: f64,
    rng: R,
}

impl TraceAnimation<SmallRng> {
    /// An animation seeded from system entropy.
    pub fn new(centre: f64, jitter: f64, capacity: usize) -> Self {
        Self::with_rng(centre, jitter, capacity, SmallRng::from_entropy())
    }
}

impl<R: Rng> TraceAnimation<R> {
    pub fn with_rng(centre: f64, jitter: f64, capacity: usize, rng: R) -> Self {
        let jitter = if jitter.is_finite() {
            jitter.max(SCALE_FLOOR)
        } else {
            SCALE_FLOOR
        };
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
            centre,
            reversion: 0.2,
            jitter,
            rng,
        }
    }

    /// Appends one point, dropping the oldest once the window is full. Returns the new point.
    pub fn tick(&mut self) -> f64 {
        let last = self.points.back().copied().unwrap_or(self.centre);
        let z: f64 = self.rng.sample(StandardNormal);
        let next = last + self.reversion * (self.centre - last) + self.jitter * z;
        if self.points.len() == self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(next);
        next
    }

    /// Moves the point the trace wanders around, e.g. when a slider changes.
    pub fn recentre(&mut self, centre: f64) {
        self.centre = centre;
    }

    pub fn points(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::Lcg;

    #[test]
    fn window_is_bounded() {
        let mut trace = TraceAnimation::new(0.0, 0.5, 50);
        for _ in 0..500 {
            trace.tick();
        }
        assert_eq!(trace.len(), 50);
        assert!(trace.points().all(f64::is_finite));
        trace.clear();
        assert!(trace.is_empty());
    }

    #[test]
    fn newest_point_is_last() {
        let mut trace = TraceAnimation::with_rng(1.0, 0.1, 3, Lcg::new(5));
        let values: Vec<f64> = (0..5).map(|_| trace.tick()).collect();
        assert_eq!(trace.points().collect::<Vec<_>>(), values[2..].to_vec());
    }

    #[test]
    fn wanders_around_centre() {
        let mut trace = TraceAnimation::with_rng(4.0, 0.3, 2_000, Lcg::new(17));
        for _ in 0..2_000 {
            trace.tick();
        }
        let mean = trace.points().sum::<f64>() / trace.len() as f64;
        assert!((mean - 4.0).abs() < 0.3, "mean {mean}");
        trace.recentre(-2.0);
        for _ in 0..2_000 {
            trace.tick();
        }
        let mean = trace.points().sum::<f64>() / trace.len() as f64;
        assert!((mean + 2.0).abs() < 0.3, "mean {mean}");
    }
}
