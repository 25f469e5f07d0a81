//! Hyperparameters and session settings.
//!
//! Every struct here deserializes with defaults for missing fields, so a JSON
//! config file only has to name what it changes:
//!
//! ```rust
//! use flappy_dqn::config::SessionConfig;
//!
//! let config: SessionConfig = serde_json::from_str(r#"{ "episodes": 5, "agent": { "gamma": 0.9 } }"#).unwrap();
//! assert_eq!(config.episodes, 5);
//! assert_eq!(config.agent.gamma, 0.9);
//! assert_eq!(config.agent.batch_size, 64);
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::activations::Activation;
use crate::error::{FlappyError, Result};

/// Transitions drawn per replay call.
pub const MINI_BATCH_SIZE: usize = 64;

/// Replay memory capacity.
pub const MEMORY_SIZE: usize = 256;

/// Shape and optimizer of the Q-network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub hidden_units: usize,
    pub hidden_activation: Activation,
    pub learning_rate: f32,
    pub beta1: f32,
    pub beta2: f32,
    pub adam_epsilon: f32,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        NetworkConfig {
            hidden_units: 3,
            hidden_activation: Activation::Sigmoid,
            learning_rate: 0.002,
            beta1: 0.9,
            beta2: 0.999,
            adam_epsilon: 1e-7,
        }
    }
}

impl NetworkConfig {
    pub fn validate(&self) -> Result<()> {
        if self.hidden_units == 0 {
            return Err(FlappyError::invalid_parameter("hidden_units", "must be at least 1"));
        }
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return Err(FlappyError::invalid_parameter("learning_rate", "must be a positive number"));
        }
        for (name, beta) in [("beta1", self.beta1), ("beta2", self.beta2)] {
            if !(0.0..1.0).contains(&beta) {
                return Err(FlappyError::invalid_parameter(name, "must be in [0, 1)"));
            }
        }
        if self.adam_epsilon <= 0.0 {
            return Err(FlappyError::invalid_parameter("adam_epsilon", "must be positive"));
        }
        Ok(())
    }
}

/// Exploration, discounting and replay settings of the agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Initial exploration rate.
    pub epsilon: f32,
    pub epsilon_min: f32,
    /// Multiplicative decay applied after every replay batch.
    pub epsilon_decay: f32,
    /// Discount factor.
    pub gamma: f32,
    pub memory_capacity: usize,
    pub batch_size: usize,
    pub network: NetworkConfig,
}

impl Default for AgentConfig {
    fn default() -> Self {
        AgentConfig {
            epsilon: 1.0,
            epsilon_min: 0.01,
            epsilon_decay: 0.995,
            gamma: 0.95,
            memory_capacity: MEMORY_SIZE,
            batch_size: MINI_BATCH_SIZE,
            network: NetworkConfig::default(),
        }
    }
}

impl AgentConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.epsilon_min) {
            return Err(FlappyError::invalid_parameter("epsilon_min", "must be in [0, 1]"));
        }
        if !(0.0..=1.0).contains(&self.epsilon) {
            return Err(FlappyError::invalid_parameter("epsilon", "must be in [0, 1]"));
        }
        if self.epsilon < self.epsilon_min {
            return Err(FlappyError::invalid_parameter(
                "epsilon",
                format!("must not start below epsilon_min ({})", self.epsilon_min),
            ));
        }
        if !(self.epsilon_decay > 0.0 && self.epsilon_decay <= 1.0) {
            return Err(FlappyError::invalid_parameter("epsilon_decay", "must be in (0, 1]"));
        }
        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(FlappyError::invalid_parameter("gamma", "must be in [0, 1]"));
        }
        if self.batch_size == 0 {
            return Err(FlappyError::invalid_parameter("batch_size", "must be at least 1"));
        }
        if self.memory_capacity < self.batch_size {
            return Err(FlappyError::invalid_parameter(
                "memory_capacity",
                format!("must hold at least one batch of {} transitions", self.batch_size),
            ));
        }
        self.network.validate()
    }
}

/// Geometry, physics and rewards of the flappy simulation.
///
/// Lengths are in pixels and velocities in pixels per frame, matching the
/// classic 288x512 game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    pub width: f32,
    pub height: f32,
    /// Floor position as a fraction of the window height.
    pub floor_ratio: f32,
    pub player_width: f32,
    pub player_height: f32,
    pub pipe_width: f32,
    pub pipe_height: f32,
    /// Vertical opening between an upper and a lower pipe.
    pub pipe_gap: f32,
    pub pipe_velocity: f32,
    pub flap_velocity: f32,
    pub gravity: f32,
    pub max_fall_velocity: f32,
    pub alive_reward: f32,
    pub pass_reward: f32,
    pub crash_reward: f32,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        EnvironmentConfig {
            width: 288.0,
            height: 512.0,
            floor_ratio: 0.79,
            player_width: 34.0,
            player_height: 24.0,
            pipe_width: 52.0,
            pipe_height: 320.0,
            pipe_gap: 120.0,
            pipe_velocity: -5.0,
            flap_velocity: -9.0,
            gravity: 1.0,
            max_fall_velocity: 10.0,
            alive_reward: 0.0025,
            pass_reward: 0.05,
            crash_reward: -0.5,
        }
    }
}

impl EnvironmentConfig {
    /// Y coordinate of the floor.
    pub fn floor_y(&self) -> f32 {
        self.height * self.floor_ratio
    }

    pub fn validate(&self) -> Result<()> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(FlappyError::invalid_parameter("width/height", "window must have a positive size"));
        }
        if !(self.floor_ratio > 0.0 && self.floor_ratio <= 1.0) {
            return Err(FlappyError::invalid_parameter("floor_ratio", "must be in (0, 1]"));
        }
        if self.pipe_velocity >= 0.0 {
            return Err(FlappyError::invalid_parameter("pipe_velocity", "pipes must scroll left"));
        }
        if self.pipe_width <= 0.0 || self.pipe_height <= 0.0 {
            return Err(FlappyError::invalid_parameter("pipe_width/pipe_height", "must be positive"));
        }
        if self.pipe_gap <= 0.0 || self.pipe_gap >= self.floor_y() * 0.6 {
            return Err(FlappyError::invalid_parameter(
                "pipe_gap",
                "must be positive and smaller than 60% of the playfield",
            ));
        }
        Ok(())
    }
}

/// Everything the training binary needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub agent: AgentConfig,
    pub environment: EnvironmentConfig,
    pub episodes: usize,
    /// Episodes are cut off after this many steps, if set.
    pub max_steps_per_episode: Option<usize>,
    /// Run `Agent::replay` every this many environment steps.
    pub replay_every: usize,
    /// Seed for the agent, network and pipe placement. Drawn from entropy when absent.
    pub seed: Option<u64>,
    /// Log a progress line every this many episodes.
    pub log_every: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            agent: AgentConfig::default(),
            environment: EnvironmentConfig::default(),
            episodes: 100,
            max_steps_per_episode: None,
            replay_every: 1,
            seed: None,
            log_every: 10,
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<()> {
        if self.replay_every == 0 {
            return Err(FlappyError::invalid_parameter("replay_every", "must be at least 1"));
        }
        if self.max_steps_per_episode == Some(0) {
            return Err(FlappyError::invalid_parameter("max_steps_per_episode", "must be at least 1"));
        }
        self.agent.validate()?;
        self.environment.validate()
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let serialized = serde_json::to_string_pretty(self)?;
        fs::write(path, serialized)?;
        Ok(())
    }
}
