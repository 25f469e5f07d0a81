//! # Environments
//!
//! The agent only ever sees the [`Environment`] contract: an observation
//! before each step, then the reward, the next observation and whether the
//! episode ended. [`FlappyEnvironment`] implements it with a headless port of
//! the flappy bird game loop.

mod flappy;

pub use flappy::FlappyEnvironment;

use crate::types::{Action, Observation};

/// Result of applying one action.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepOutcome {
    pub next_state: Observation,
    pub reward: f32,
    pub terminal: bool,
    /// Pipes passed so far in this episode.
    pub score: u32,
}

/// A simulation the agent can be trained against.
pub trait Environment {
    /// Start a new episode and return its first observation.
    fn reset(&mut self) -> Observation;

    /// Current observation, without advancing.
    fn observe(&self) -> Observation;

    /// Apply `action` and advance one frame.
    fn step(&mut self, action: Action) -> StepOutcome;
}
