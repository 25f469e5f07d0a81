//! # Q-Learning Agent Module
//!
//! This module provides the experience-replay Q-learning agent and the
//! function approximator abstraction it learns through.
//!
//! ## Core Concepts
//!
//! - **Agent**: turns observations into actions and stored transitions into
//!   better return estimates
//! - **Exploration vs Exploitation**: epsilon-greedy, with epsilon decayed
//!   after every replay batch down to a floor
//! - **Experience Replay**: a bounded memory of recent transitions, sampled
//!   uniformly for single-example gradient steps
//! - **Bellman Target**: `r` for terminal transitions, `r + gamma * max Q(s')`
//!   otherwise; only the taken action's estimate is corrected
//!
//! ## Example Usage
//!
//! ```rust
//! use flappy_dqn::agent::Agent;
//! use flappy_dqn::config::AgentConfig;
//! use flappy_dqn::types::{Action, Observation};
//!
//! let mut agent = Agent::with_seed(&AgentConfig::default(), 7).unwrap();
//!
//! let state = Observation::new([244.0, 388.0, 290.0, 532.0, 310.0]);
//! let action = agent.take_action(&state).unwrap();
//!
//! // After the environment step...
//! let next_state = Observation::new([235.0, 383.0, 290.0, 527.0, 310.0]);
//! agent.store_transition(state, action, 0.0025, next_state, false);
//! agent.replay().unwrap();
//! ```
//!
//! ## Concurrency
//!
//! The agent is meant to be driven from a single loop. Callers sharing one
//! across threads must lock around `store_transition` and `replay` together.

mod approximator;
mod dqn;

pub use approximator::{FunctionApproximator, QNetwork};
pub use dqn::{Agent, ReplayOutcome};
