/*!
Deterministic random streams for the visualizations.

A 32-bit linear congruential generator ([`Lcg`]) produces uniforms in `[0, 1)`, and
[`box_muller`] turns pairs of those uniforms into pairs of standard-Normal deviates.
Everything that must be reproducible from a user-chosen seed (the synthetic dataset, the
sampler, predictive replicates) draws from this stream and nothing else. Transcendentals on
this path go through `libm`, whose results do not depend on the platform's math library.

[`Lcg`] also implements [`rand::RngCore`], so it can stand in wherever a `rand` generator is
expected. Only [`Lcg::next_f64`] is guaranteed to follow the canonical `state / 2^32` stream.

# Examples

```rust
use bayes_viz::rng::{box_muller, Lcg};

let mut a = Lcg::new(42);
let mut b = Lcg::new(42);
assert_eq!(a.next_f64(), b.next_f64());

let (z0, z1) = box_muller(&mut a);
assert!(z0.is_finite() && z1.is_finite());
```
*/

use rand::RngCore;
use std::f64::consts::PI;

const MULTIPLIER: u32 = 1_664_525;
const INCREMENT: u32 = 1_013_904_223;
const TWO_POW_32: f64 = 4_294_967_296.0;

/// Added to a uniform draw before taking its logarithm so `ln(0)` is never evaluated.
pub const LOG_EPSILON: f64 = 1e-12;

/// A seeded linear congruential generator with modulus `2^32`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lcg {
    state: u32,
    seed: u32,
}

impl Lcg {
    /// Creates a generator whose stream is fully determined by `seed`.
    pub fn new(seed: u32) -> Self {
        Self { state: seed, seed }
    }

    /// The seed this generator was created with.
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Advances the state and returns the raw 32-bit value.
    pub fn next_raw(&mut self) -> u32 {
        self.state = self
            .state
            .wrapping_mul(MULTIPLIER)
            .wrapping_add(INCREMENT);
        self.state
    }

    /// Advances the state and returns the next uniform in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.next_raw()) / TWO_POW_32
    }

    /// A uniform offset in `[-half_width, half_width)`.
    pub fn next_symmetric(&mut self, half_width: f64) -> f64 {
        (2.0 * self.next_f64() - 1.0) * half_width
    }

    /// `ln(u)` for a fresh uniform `u`, floored so the result is always finite.
    pub fn next_log_uniform(&mut self) -> f64 {
        libm::log(self.next_f64() + LOG_EPSILON)
    }
}

impl RngCore for Lcg {
    fn next_u32(&mut self) -> u32 {
        self.next_raw()
    }

    fn next_u64(&mut self) -> u64 {
        let hi = u64::from(self.next_raw());
        let lo = u64::from(self.next_raw());
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.next_raw().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

/// Box-Muller transform: consumes two uniforms and returns two independent
/// standard-Normal deviates `(r cos θ, r sin θ)`.
pub fn box_muller(rng: &mut Lcg) -> (f64, f64) {
    let u1 = rng.next_f64();
    let u2 = rng.next_f64();
    let radius = libm::sqrt(-2.0 * libm::log(u1 + LOG_EPSILON));
    let theta = 2.0 * PI * u2;
    (radius * libm::cos(theta), radius * libm::sin(theta))
}

/// An endless stream of standard-Normal deviates that uses both halves of every
/// Box-Muller pair, in order.
#[derive(Debug, Clone)]
pub struct StandardNormalStream {
    rng: Lcg,
    spare: Option<f64>,
}

impl StandardNormalStream {
    pub fn new(rng: Lcg) -> Self {
        Self { rng, spare: None }
    }
}

impl Iterator for StandardNormalStream {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        if let Some(z) = self.spare.take() {
            return Some(z);
        }
        let (z0, z1) = box_muller(&mut self.rng);
        self.spare = Some(z1);
        Some(z0)
    }
}
