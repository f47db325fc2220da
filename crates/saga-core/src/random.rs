//! Injectable randomness.
//!
//! Combat, travel and the location clock never reach for a global
//! generator; they draw from a [`RandomSource`] handed in by the caller.
//! Sessions use a seeded [`StdRng`]; tests replay fixed draws through
//! [`ScriptedRandom`].

use std::collections::VecDeque;

use rand::Rng;
use rand::rngs::StdRng;

/// A source of uniform draws in `[0, 1)`.
pub trait RandomSource {
    /// Next uniform draw in `[0, 1)`.
    fn next_unit(&mut self) -> f64;

    /// Returns true with the given probability.
    fn chance(&mut self, probability: f64) -> bool {
        self.next_unit() < probability
    }

    /// Uniform draw in `[low, high)`.
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        low + (high - low) * self.next_unit()
    }
}

impl RandomSource for StdRng {
    fn next_unit(&mut self) -> f64 {
        self.random::<f64>()
    }
}

/// Replays a fixed sequence of draws, then repeats a fallback value.
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    draws: VecDeque<f64>,
    fallback: f64,
}

impl ScriptedRandom {
    /// Replay `draws` in order; once exhausted every draw returns 0.5.
    pub fn new(draws: impl IntoIterator<Item = f64>) -> Self {
        Self {
            draws: draws.into_iter().collect(),
            fallback: 0.5,
        }
    }

    /// Always return the same draw.
    pub fn constant(value: f64) -> Self {
        Self {
            draws: VecDeque::new(),
            fallback: value,
        }
    }

    /// Number of scripted draws not yet consumed.
    pub fn remaining(&self) -> usize {
        self.draws.len()
    }
}

impl RandomSource for ScriptedRandom {
    fn next_unit(&mut self) -> f64 {
        self.draws.pop_front().unwrap_or(self.fallback)
    }
}
