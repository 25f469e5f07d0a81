//! # Training Sessions
//!
//! A [`TrainingSession`] owns one [`Agent`] and one [`Environment`] and runs
//! an explicit sequence of episodes. The agent, its epsilon and its replay
//! memory carry over from one episode to the next; only the environment is
//! reset.
//!
//! ```rust
//! use flappy_dqn::config::SessionConfig;
//! use flappy_dqn::session::TrainingSession;
//!
//! let config = SessionConfig { seed: Some(3), max_steps_per_episode: Some(50), ..Default::default() };
//! let mut session = TrainingSession::from_config(&config).unwrap();
//! let summaries = session.run(2).unwrap();
//! assert_eq!(summaries.len(), 2);
//! assert_eq!(session.episodes_run(), 2);
//! ```

use log::{debug, info};
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::agent::{Agent, FunctionApproximator, QNetwork, ReplayOutcome};
use crate::config::SessionConfig;
use crate::environment::{Environment, FlappyEnvironment, StepOutcome};
use crate::error::Result;
use crate::metrics::MetricsTracker;

/// What happened in one finished episode.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    /// Zero-based position of the episode in its session.
    pub index: usize,
    pub steps: usize,
    pub score: u32,
    pub total_reward: f32,
    /// Epsilon once the episode ended.
    pub epsilon: f32,
    /// Mean loss over the replay batches that trained during the episode.
    pub mean_loss: Option<f32>,
    /// The episode hit the step cap instead of ending in a crash.
    pub truncated: bool,
}

/// Bookkeeping for an episode in progress.
#[derive(Debug, Clone)]
pub struct Episode {
    index: usize,
    steps: usize,
    score: u32,
    total_reward: f32,
    loss_sum: f32,
    trained_batches: usize,
}

impl Episode {
    pub fn begin(index: usize) -> Self {
        Episode {
            index,
            steps: 0,
            score: 0,
            total_reward: 0.0,
            loss_sum: 0.0,
            trained_batches: 0,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn record_step(&mut self, outcome: &StepOutcome) {
        self.steps += 1;
        self.total_reward += outcome.reward;
        self.score = outcome.score;
    }

    pub fn record_replay(&mut self, outcome: &ReplayOutcome) {
        if let ReplayOutcome::Trained { mean_loss, .. } = outcome {
            self.loss_sum += mean_loss;
            self.trained_batches += 1;
        }
    }

    pub fn finish(self, epsilon: f32, truncated: bool) -> EpisodeSummary {
        let mean_loss = if self.trained_batches > 0 {
            Some(self.loss_sum / self.trained_batches as f32)
        } else {
            None
        };
        EpisodeSummary {
            index: self.index,
            steps: self.steps,
            score: self.score,
            total_reward: self.total_reward,
            epsilon,
            mean_loss,
            truncated,
        }
    }
}

/// One agent trained across a sequence of episodes.
pub struct TrainingSession<E, F = QNetwork, R = StdRng> {
    agent: Agent<F, R>,
    environment: E,
    max_steps_per_episode: Option<usize>,
    replay_every: usize,
    log_every: usize,
    metrics: MetricsTracker,
    episodes_run: usize,
    total_steps: usize,
}

impl<E: Environment, F: FunctionApproximator, R: Rng> TrainingSession<E, F, R> {
    pub fn new(agent: Agent<F, R>, environment: E, config: &SessionConfig) -> Result<Self> {
        config.validate()?;
        Ok(TrainingSession {
            agent,
            environment,
            max_steps_per_episode: config.max_steps_per_episode,
            replay_every: config.replay_every,
            log_every: config.log_every,
            metrics: MetricsTracker::default(),
            episodes_run: 0,
            total_steps: 0,
        })
    }

    /// Play one episode from a fresh environment until it crashes or hits the step cap.
    ///
    /// Every step is stored in the agent's memory; every `replay_every`-th
    /// step of the session also triggers a replay, including the final one.
    pub fn run_episode(&mut self) -> Result<EpisodeSummary> {
        let mut episode = Episode::begin(self.episodes_run);
        let mut state = self.environment.reset();

        let truncated = loop {
            if self.max_steps_per_episode.is_some_and(|max| episode.steps() >= max) {
                break true;
            }

            let action = self.agent.take_action(&state)?;
            let outcome = self.environment.step(action);
            self.agent
                .store_transition(state, action, outcome.reward, outcome.next_state, outcome.terminal);
            episode.record_step(&outcome);
            self.total_steps += 1;

            if self.total_steps % self.replay_every == 0 {
                let replay = self.agent.replay()?;
                if let ReplayOutcome::Trained { mean_loss, .. } = replay {
                    self.metrics.record_loss(mean_loss);
                }
                episode.record_replay(&replay);
            }

            if outcome.terminal {
                break false;
            }
            state = outcome.next_state;
        };

        self.episodes_run += 1;
        let summary = episode.finish(self.agent.epsilon(), truncated);
        self.metrics.record_episode(&summary);

        if self.log_every > 0 && self.episodes_run % self.log_every == 0 {
            info!(
                "episode {}: steps {}, score {}, reward {:.4}, epsilon {:.4}, avg score {:.2}, best {}",
                summary.index,
                summary.steps,
                summary.score,
                summary.total_reward,
                summary.epsilon,
                self.metrics.avg_score(self.log_every).unwrap_or(0.0),
                self.metrics.best_score()
            );
        } else {
            debug!(
                "episode {}: steps {}, score {}, reward {:.4}",
                summary.index, summary.steps, summary.score, summary.total_reward
            );
        }

        Ok(summary)
    }

    /// Run `episodes` episodes back to back.
    pub fn run(&mut self, episodes: usize) -> Result<Vec<EpisodeSummary>> {
        (0..episodes).map(|_| self.run_episode()).collect()
    }

    pub fn agent(&self) -> &Agent<F, R> {
        &self.agent
    }

    pub fn agent_mut(&mut self) -> &mut Agent<F, R> {
        &mut self.agent
    }

    pub fn environment(&self) -> &E {
        &self.environment
    }

    pub fn metrics(&self) -> &MetricsTracker {
        &self.metrics
    }

    pub fn episodes_run(&self) -> usize {
        self.episodes_run
    }

    /// Environment steps across all episodes.
    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    pub fn into_agent(self) -> Agent<F, R> {
        self.agent
    }
}

impl TrainingSession<FlappyEnvironment, QNetwork, StdRng> {
    /// Flappy session built from a config. The agent is seeded with `seed`
    /// and the pipe course with `seed + 1`.
    pub fn from_config(config: &SessionConfig) -> Result<Self> {
        let seed = config.seed.unwrap_or_else(rand::random);
        let agent = Agent::with_seed(&config.agent, seed)?;
        let environment = FlappyEnvironment::with_seed(config.environment.clone(), seed.wrapping_add(1))?;
        Self::new(agent, environment, config)
    }
}
