//! Die sources

use rand::Rng;
use std::collections::VecDeque;

/// Anything that can draw a single die
///
/// Every resolver takes `&mut impl DieRoller` so tests can replay fixed
/// sequences and hosts can choose their own generator.
pub trait DieRoller {
    /// Draw one die with the given number of faces, result in `1..=faces`
    fn roll(&mut self, faces: u32) -> u32;
}

/// Adapts any `rand` generator into a die source
#[derive(Debug, Clone)]
pub struct RngRoller<R> {
    rng: R,
}

impl<R: Rng> RngRoller<R> {
    pub fn new(rng: R) -> Self {
        RngRoller { rng }
    }

    /// Give back the wrapped generator
    pub fn into_inner(self) -> R {
        self.rng
    }
}

impl RngRoller<rand::rngs::ThreadRng> {
    /// Roller backed by the thread-local generator
    pub fn thread() -> Self {
        RngRoller::new(rand::thread_rng())
    }
}

impl<R: Rng> DieRoller for RngRoller<R> {
    fn roll(&mut self, faces: u32) -> u32 {
        if faces <= 1 {
            return 1;
        }
        self.rng.gen_range(1..=faces)
    }
}

/// Replays a fixed sequence of die results
///
/// Values above the requested faces are clamped into range. Once the
/// sequence runs out the last value repeats (1 if it was empty).
#[derive(Debug, Clone, Default)]
pub struct ScriptedRoller {
    queue: VecDeque<u32>,
    last: u32,
    drawn: usize,
}

impl ScriptedRoller {
    pub fn new(values: impl IntoIterator<Item = u32>) -> Self {
        ScriptedRoller {
            queue: values.into_iter().collect(),
            last: 1,
            drawn: 0,
        }
    }

    /// Queue more results behind the current ones
    pub fn push(&mut self, value: u32) {
        self.queue.push_back(value);
    }

    /// How many dice have been drawn so far
    pub fn drawn(&self) -> usize {
        self.drawn
    }

    /// Results not yet consumed
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}

impl DieRoller for ScriptedRoller {
    fn roll(&mut self, faces: u32) -> u32 {
        if let Some(next) = self.queue.pop_front() {
            self.last = next;
        }
        self.drawn += 1;
        self.last.clamp(1, faces.max(1))
    }
}
