use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::approximator::{FunctionApproximator, QNetwork};
use crate::config::AgentConfig;
use crate::error::Result;
use crate::replay_buffer::{ReplayBuffer, Transition};
use crate::types::{Action, Observation};

/// What a call to [`Agent::replay`] did.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ReplayOutcome {
    /// Not enough transitions stored yet; nothing changed.
    Skipped { stored: usize, required: usize },
    /// A full batch of gradient steps ran.
    Trained {
        updates: usize,
        mean_loss: f32,
        epsilon: f32,
    },
}

impl ReplayOutcome {
    pub fn is_trained(&self) -> bool {
        matches!(self, ReplayOutcome::Trained { .. })
    }
}

/// Experience-replay Q-learning agent.
///
/// The agent owns its function approximator, an epsilon-greedy policy, a
/// bounded transition memory and the random source used both for exploration
/// and for minibatch sampling. It lives for a whole training session:
/// episode boundaries reset neither epsilon nor the memory.
///
/// # Example
///
/// ```rust
/// use flappy_dqn::agent::{Agent, QNetwork};
/// use flappy_dqn::config::AgentConfig;
/// use rand::rngs::StdRng;
/// use rand::SeedableRng;
///
/// let mut rng = StdRng::seed_from_u64(42);
/// let network = QNetwork::create(&mut rng).unwrap();
/// let agent = Agent::new(network, &AgentConfig::default(), rng).unwrap();
/// assert_eq!(agent.epsilon(), 1.0);
/// ```
pub struct Agent<F = QNetwork, R = StdRng> {
    approximator: F,
    memory: ReplayBuffer,
    epsilon: f32,
    epsilon_min: f32,
    epsilon_decay: f32,
    gamma: f32,
    batch_size: usize,
    train_steps: usize,
    rng: R,
}

impl<F: FunctionApproximator, R: Rng> Agent<F, R> {
    pub fn new(approximator: F, config: &AgentConfig, rng: R) -> Result<Self> {
        config.validate()?;
        Ok(Agent {
            approximator,
            memory: ReplayBuffer::new(config.memory_capacity),
            epsilon: config.epsilon,
            epsilon_min: config.epsilon_min,
            epsilon_decay: config.epsilon_decay,
            gamma: config.gamma,
            batch_size: config.batch_size,
            train_steps: 0,
            rng,
        })
    }

    /// Select an action using the epsilon-greedy policy.
    ///
    /// Reads epsilon but never changes it, the memory or the approximator.
    pub fn take_action(&mut self, state: &Observation) -> Result<Action> {
        if self.rng.gen::<f32>() < self.epsilon {
            let index = self.rng.gen_range(0..Action::ALL.len());
            return Ok(Action::ALL[index]);
        }
        Ok(self.approximator.predict(state)?.argmax())
    }

    /// Record one step of experience, evicting the oldest once the memory is full.
    pub fn store_transition(
        &mut self,
        state: Observation,
        action: Action,
        reward: f32,
        next_state: Observation,
        terminal: bool,
    ) {
        self.remember(Transition::new(state, action, reward, next_state, terminal));
    }

    pub fn remember(&mut self, transition: Transition) {
        self.memory.add(transition);
    }

    /// Train on a uniformly sampled minibatch of distinct transitions.
    ///
    /// With fewer stored transitions than the batch size this does nothing.
    /// Otherwise every sampled transition gets one gradient step toward its
    /// Bellman target, then epsilon decays toward its floor.
    pub fn replay(&mut self) -> Result<ReplayOutcome> {
        if self.memory.len() < self.batch_size {
            return Ok(ReplayOutcome::Skipped {
                stored: self.memory.len(),
                required: self.batch_size,
            });
        }

        let batch: Vec<Transition> = self
            .memory
            .sample(self.batch_size, &mut self.rng)?
            .into_iter()
            .copied()
            .collect();

        let mut total_loss = 0.0;
        for transition in &batch {
            let target_value = self.bellman_target(transition)?;
            let mut target = self.approximator.predict(&transition.state)?;
            target.set(transition.action, target_value);
            total_loss += self.approximator.train(&transition.state, &target)?;
        }
        self.train_steps += batch.len();

        if self.epsilon > self.epsilon_min {
            self.epsilon = (self.epsilon * self.epsilon_decay).max(self.epsilon_min);
        }

        let mean_loss = total_loss / batch.len() as f32;
        debug!(
            "replayed {} transitions, mean loss {:.6}, epsilon {:.4}",
            batch.len(),
            mean_loss,
            self.epsilon
        );

        Ok(ReplayOutcome::Trained {
            updates: batch.len(),
            mean_loss,
            epsilon: self.epsilon,
        })
    }

    /// `r` for terminal transitions, `r + gamma * max Q(s')` otherwise.
    pub fn bellman_target(&self, transition: &Transition) -> Result<f32> {
        if transition.terminal {
            return Ok(transition.reward);
        }
        let next_values = self.approximator.predict(&transition.next_state)?;
        Ok(transition.reward + self.gamma * next_values.max())
    }

    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    /// Override the exploration rate, clamped to `[0, 1]`.
    pub fn set_epsilon(&mut self, epsilon: f32) {
        self.epsilon = epsilon.clamp(0.0, 1.0);
    }

    pub fn epsilon_min(&self) -> f32 {
        self.epsilon_min
    }

    pub fn epsilon_decay(&self) -> f32 {
        self.epsilon_decay
    }

    pub fn gamma(&self) -> f32 {
        self.gamma
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Total single-example gradient steps taken.
    pub fn train_steps(&self) -> usize {
        self.train_steps
    }

    pub fn memory(&self) -> &ReplayBuffer {
        &self.memory
    }

    pub fn approximator(&self) -> &F {
        &self.approximator
    }

    pub fn approximator_mut(&mut self) -> &mut F {
        &mut self.approximator
    }

    pub fn into_approximator(self) -> F {
        self.approximator
    }
}

impl Agent<QNetwork, StdRng> {
    /// Agent with a fresh Q-network, both seeded from `seed`.
    pub fn with_seed(config: &AgentConfig, seed: u64) -> Result<Self> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    /// Agent with a fresh Q-network, seeded from system entropy.
    pub fn from_entropy(config: &AgentConfig) -> Result<Self> {
        Self::with_rng(config, StdRng::from_entropy())
    }

    fn with_rng(config: &AgentConfig, mut rng: StdRng) -> Result<Self> {
        let network = QNetwork::new(&config.network, &mut rng)?;
        Agent::new(network, config, rng)
    }
}
