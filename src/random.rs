//! Random number generation on top of the abstractions of the "rand" crate.
//!
//! Every event gets its own generator, seeded from the run seed and the event
//! number. An event can thus be regenerated on its own, whichever thread
//! processes it and whatever happened before it.

use crate::numeric::{reals::consts::PI, Float};
use prefix_num_ops::real::*;
use rand::{Rng, SeedableRng};

/// Random number generation engine in use
type Engine = rand_xoshiro::Xoshiro256PlusPlus;

/// Odd constant used to spread event numbers across the seed space
const SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

/// Facade which exposes the few distributions that event generation needs
#[derive(Clone)]
pub struct RandomGenerator {
    rng: Engine,
}
//
impl RandomGenerator {
    /// Spawn the random number generator of one event
    pub fn for_event(seed: u64, event_num: usize) -> Self {
        let mixed = seed ^ (event_num as u64).wrapping_add(1).wrapping_mul(SEED_STRIDE);
        Self {
            rng: Engine::seed_from_u64(mixed),
        }
    }

    /// Generate a random floating-point number in [0, 1)
    pub fn random(&mut self) -> Float {
        self.rng.gen()
    }

    /// Generate a random number in (0, 1], safe to take the logarithm of
    pub fn random_open(&mut self) -> Float {
        1. - self.random()
    }

    /// Uniform number in [low, high)
    pub fn uniform(&mut self, low: Float, high: Float) -> Float {
        low + (high - low) * self.random()
    }

    /// Uniform azimuthal angle in [0, 2π)
    pub fn azimuth(&mut self) -> Float {
        2. * PI * self.random()
    }

    /// Exponentially distributed number with the given mean
    pub fn exponential(&mut self, mean: Float) -> Float {
        -mean * ln(self.random_open())
    }

    /// Uniform integer in [low, high]
    pub fn integer(&mut self, low: usize, high: usize) -> usize {
        self.rng.gen_range(low..=high)
    }

    /// Fair coin flip
    pub fn coin(&mut self) -> bool {
        self.rng.gen()
    }
}
