//! # Fixed-Arity Types
//!
//! The agent talks to the game through three small value types:
//!
//! - [`Observation`]: five raw numbers (player y, then x/y of the two nearest
//!   lower pipes). No normalization is applied.
//! - [`Action`]: `Idle` (0) or `Flap` (1).
//! - [`QValues`]: one expected-return estimate per action.
//!
//! Shapes are fixed at compile time. Anything arriving as a slice, `Vec` or
//! ndarray view goes through a fallible conversion that returns
//! [`FlappyError::Shape`] instead of padding or truncating.

use std::fmt;

use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

use crate::error::{FlappyError, Result};

/// Number of values in an [`Observation`].
pub const OBSERVATION_SIZE: usize = 5;

/// Number of discrete actions.
pub const ACTION_COUNT: usize = 2;

/// Snapshot of the game state handed to the agent once per step.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Observation(pub [f32; OBSERVATION_SIZE]);

impl Observation {
    pub fn new(values: [f32; OBSERVATION_SIZE]) -> Self {
        Observation(values)
    }

    /// Convert a raw slice, failing unless it holds exactly five values.
    pub fn from_slice(values: &[f32]) -> Result<Self> {
        <[f32; OBSERVATION_SIZE]>::try_from(values)
            .map(Observation)
            .map_err(|_| FlappyError::shape("observation", OBSERVATION_SIZE, values.len()))
    }

    pub fn values(&self) -> &[f32; OBSERVATION_SIZE] {
        &self.0
    }

    pub fn view(&self) -> ArrayView1<'_, f32> {
        ArrayView1::from(&self.0)
    }

    pub fn to_array(&self) -> Array1<f32> {
        Array1::from(self.0.to_vec())
    }
}

impl From<[f32; OBSERVATION_SIZE]> for Observation {
    fn from(values: [f32; OBSERVATION_SIZE]) -> Self {
        Observation(values)
    }
}

impl TryFrom<&[f32]> for Observation {
    type Error = FlappyError;

    fn try_from(values: &[f32]) -> Result<Self> {
        Observation::from_slice(values)
    }
}

impl TryFrom<Vec<f32>> for Observation {
    type Error = FlappyError;

    fn try_from(values: Vec<f32>) -> Result<Self> {
        Observation::from_slice(&values)
    }
}

impl TryFrom<ArrayView1<'_, f32>> for Observation {
    type Error = FlappyError;

    fn try_from(values: ArrayView1<'_, f32>) -> Result<Self> {
        let values = values.iter().copied().collect::<Vec<_>>();
        Observation::from_slice(&values)
    }
}

/// Expected return for each action, indexed by [`Action::index`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct QValues(pub [f32; ACTION_COUNT]);

impl QValues {
    pub fn new(values: [f32; ACTION_COUNT]) -> Self {
        QValues(values)
    }

    pub fn from_slice(values: &[f32]) -> Result<Self> {
        <[f32; ACTION_COUNT]>::try_from(values)
            .map(QValues)
            .map_err(|_| FlappyError::shape("return estimates", ACTION_COUNT, values.len()))
    }

    pub fn values(&self) -> &[f32; ACTION_COUNT] {
        &self.0
    }

    pub fn get(&self, action: Action) -> f32 {
        self.0[action.index()]
    }

    pub fn set(&mut self, action: Action, value: f32) {
        self.0[action.index()] = value;
    }

    /// Largest estimate.
    pub fn max(&self) -> f32 {
        self.0.iter().copied().fold(f32::NEG_INFINITY, f32::max)
    }

    /// Action with the largest estimate. Ties go to the lowest index.
    pub fn argmax(&self) -> Action {
        let mut best = 0;
        for (index, &value) in self.0.iter().enumerate().skip(1) {
            if value > self.0[best] {
                best = index;
            }
        }
        Action::ALL[best]
    }

    pub fn view(&self) -> ArrayView1<'_, f32> {
        ArrayView1::from(&self.0)
    }
}

impl TryFrom<&[f32]> for QValues {
    type Error = FlappyError;

    fn try_from(values: &[f32]) -> Result<Self> {
        QValues::from_slice(values)
    }
}

impl TryFrom<Array1<f32>> for QValues {
    type Error = FlappyError;

    fn try_from(values: Array1<f32>) -> Result<Self> {
        let values = values.to_vec();
        QValues::from_slice(&values)
    }
}

/// Discrete action space of the game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Let gravity act.
    Idle = 0,
    /// Jump.
    Flap = 1,
}

impl Action {
    /// Every action, ordered by index.
    pub const ALL: [Action; ACTION_COUNT] = [Action::Idle, Action::Flap];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Result<Self> {
        Action::ALL
            .get(index)
            .copied()
            .ok_or(FlappyError::InvalidAction {
                action: index,
                max_actions: ACTION_COUNT,
            })
    }
}

impl TryFrom<usize> for Action {
    type Error = FlappyError;

    fn try_from(index: usize) -> Result<Self> {
        Action::from_index(index)
    }
}

impl From<Action> for usize {
    fn from(action: Action) -> usize {
        action.index()
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Idle => write!(f, "idle"),
            Action::Flap => write!(f, "flap"),
        }
    }
}
