//! # flappy-dqn - Experience-Replay Q-Learning for Flappy Bird
//!
//! A small Q-learning agent that learns to play a side-scrolling
//! obstacle-avoidance game by trial and error. The agent observes five
//! numbers, picks one of two actions and improves a tiny neural network from
//! a bounded memory of past transitions.
//!
//! ## Key Features
//!
//! - **Typed observations**: fixed-arity [`types::Observation`] and
//!   [`types::QValues`]; malformed input is a [`error::FlappyError::Shape`]
//! - **Experience replay**: bounded FIFO memory, uniform minibatches of
//!   distinct transitions, one gradient step per sampled transition
//! - **Epsilon-greedy**: exploration decays after each replay batch down to a floor
//! - **Injectable randomness**: the agent, network initialization and the
//!   game all take seedable generators, so runs are reproducible
//! - **Headless game**: [`environment::FlappyEnvironment`] runs the game
//!   physics without any rendering
//!
//! ## Quick Start
//!
//! ```rust
//! use flappy_dqn::config::SessionConfig;
//! use flappy_dqn::session::TrainingSession;
//!
//! let config = SessionConfig { seed: Some(42), ..Default::default() };
//! let mut session = TrainingSession::from_config(&config).unwrap();
//! let summary = session.run_episode().unwrap();
//! println!("score {} after {} steps", summary.score, summary.steps);
//! ```
//!
//! ## Module Organization
//!
//! - [`activations`] - Activation functions (Sigmoid, Tanh, ReLU, Linear)
//! - [`agent`] - The Q-learning agent and the function approximator trait
//! - [`config`] - Hyperparameters and session settings
//! - [`environment`] - Environment contract and the flappy simulation
//! - [`error`] - Error types and result handling
//! - [`layers`] - Dense layers and weight initialization
//! - [`loss`] - Loss functions for training
//! - [`metrics`] - Training metrics and tracking
//! - [`network`] - Core neural network implementation
//! - [`optimizer`] - Optimization algorithms
//! - [`replay_buffer`] - Transitions and the replay memory
//! - [`session`] - Episodes and training sessions
//! - [`types`] - Observations, actions and return estimates

pub mod activations;
pub mod agent;
pub mod config;
pub mod environment;
pub mod error;
pub mod layers;
pub mod loss;
pub mod metrics;
pub mod network;
pub mod optimizer;
pub mod replay_buffer;
pub mod session;
pub mod types;

pub use agent::{Agent, FunctionApproximator, QNetwork, ReplayOutcome};
pub use error::{FlappyError, Result};
pub use types::{Action, Observation, QValues};

#[cfg(test)]
mod tests;
