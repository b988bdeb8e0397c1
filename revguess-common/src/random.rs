//! Random number source abstraction
//!
//! Selection only ever needs uniform values in `[0, 1)`. Production uses the
//! thread-local RNG; tests inject a scripted sequence.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use rand::Rng;

/// Producer of uniform values in `[0, 1)`
pub trait RandomSource: Send + Sync {
    fn next_unit(&self) -> f64;
}

/// `rand::thread_rng()` backed source
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_unit(&self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }
}

/// Replays a fixed list of values, repeating the last one when exhausted
///
/// An empty script always yields `0.0`.
#[derive(Debug, Default)]
pub struct ScriptedRandom {
    // (remaining values, last value served)
    state: Mutex<(VecDeque<f64>, f64)>,
}

impl ScriptedRandom {
    pub fn new(values: impl IntoIterator<Item = f64>) -> Self {
        Self {
            state: Mutex::new((values.into_iter().collect(), 0.0)),
        }
    }
}

impl RandomSource for ScriptedRandom {
    fn next_unit(&self) -> f64 {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(value) = state.0.pop_front() {
            state.1 = value;
        }
        state.1
    }
}

/// Uniform index into a collection of `len` items: `floor(r * len)`
///
/// `None` when `len` is zero. Out-of-range draws are clamped, so a source
/// that returns exactly `1.0` (or garbage) still yields a valid index.
pub fn pick_index(len: usize, random: &dyn RandomSource) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let r = random.next_unit();
    let r = if r.is_finite() { r.clamp(0.0, 1.0) } else { 0.0 };
    let index = (r * len as f64).floor() as usize;
    Some(index.min(len - 1))
}
