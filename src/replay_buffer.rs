use std::collections::VecDeque;

use rand::seq::index;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{FlappyError, Result};
use crate::types::{Action, Observation};

/// One recorded step of experience.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub state: Observation,
    pub action: Action,
    pub reward: f32,
    pub next_state: Observation,
    pub terminal: bool,
}

impl Transition {
    pub fn new(state: Observation, action: Action, reward: f32, next_state: Observation, terminal: bool) -> Self {
        Transition {
            state,
            action,
            reward,
            next_state,
            terminal,
        }
    }
}

/// Bounded FIFO memory of transitions. Once full, every insert evicts the oldest entry.
#[derive(Clone, Debug)]
pub struct ReplayBuffer {
    buffer: VecDeque<Transition>,
    capacity: usize,
}

impl ReplayBuffer {
    pub fn new(capacity: usize) -> Self {
        ReplayBuffer {
            buffer: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a transition, returning the one evicted to make room, if any.
    pub fn add(&mut self, transition: Transition) -> Option<Transition> {
        if self.capacity == 0 {
            return Some(transition);
        }
        let evicted = if self.buffer.len() == self.capacity {
            self.buffer.pop_front()
        } else {
            None
        };
        self.buffer.push_back(transition);
        evicted
    }

    /// Draw `batch_size` distinct transitions uniformly at random.
    pub fn sample<R: Rng + ?Sized>(&self, batch_size: usize, rng: &mut R) -> Result<Vec<&Transition>> {
        if batch_size > self.buffer.len() {
            return Err(FlappyError::EmptyBatch {
                requested: batch_size,
                available: self.buffer.len(),
            });
        }
        Ok(index::sample(rng, self.buffer.len(), batch_size)
            .into_iter()
            .map(|i| &self.buffer[i])
            .collect())
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.buffer.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &Transition> {
        self.buffer.iter()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}
