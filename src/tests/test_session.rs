use crate::agent::{Agent, ReplayOutcome};
use crate::config::{AgentConfig, SessionConfig};
use crate::environment::{Environment, StepOutcome};
use crate::session::{Episode, TrainingSession};
use crate::types::{Action, Observation};

/// Walks forward one cell per step and ends after `length` steps,
/// paying 1.0 per step and -1.0 on the last one.
struct Corridor {
    length: usize,
    position: usize,
    resets: usize,
}

impl Corridor {
    fn new(length: usize) -> Self {
        Corridor { length, position: 0, resets: 0 }
    }
}

impl Environment for Corridor {
    fn reset(&mut self) -> Observation {
        self.position = 0;
        self.resets += 1;
        self.observe()
    }

    fn observe(&self) -> Observation {
        Observation::new([self.position as f32, 0.0, 0.0, 0.0, 0.0])
    }

    fn step(&mut self, _action: Action) -> StepOutcome {
        self.position += 1;
        let terminal = self.position >= self.length;
        StepOutcome {
            next_state: self.observe(),
            reward: if terminal { -1.0 } else { 1.0 },
            terminal,
            score: self.position as u32,
        }
    }
}

fn corridor_session(length: usize, config: SessionConfig) -> TrainingSession<Corridor> {
    let agent = Agent::with_seed(&config.agent, 17).unwrap();
    TrainingSession::new(agent, Corridor::new(length), &config).unwrap()
}

#[test]
fn test_episode_runs_until_terminal() {
    let mut session = corridor_session(5, SessionConfig::default());
    let summary = session.run_episode().unwrap();

    assert_eq!(summary.index, 0);
    assert_eq!(summary.steps, 5);
    assert_eq!(summary.score, 5);
    assert_eq!(summary.total_reward, 3.0);
    assert!(!summary.truncated);
    assert_eq!(summary.mean_loss, None);

    let memory = session.agent().memory();
    assert_eq!(memory.len(), 5);
    let terminal: Vec<bool> = memory.iter().map(|t| t.terminal).collect();
    assert_eq!(terminal, vec![false, false, false, false, true]);
    assert_eq!(memory.iter().last().unwrap().reward, -1.0);
}

#[test]
fn test_memory_and_epsilon_carry_across_episodes() {
    let mut session = corridor_session(10, SessionConfig::default());
    let summaries = session.run(10).unwrap();

    let indices: Vec<usize> = summaries.iter().map(|s| s.index).collect();
    assert_eq!(indices, (0..10).collect::<Vec<_>>());
    assert_eq!(session.environment().resets, 10);
    assert_eq!(session.total_steps(), 100);
    assert_eq!(session.agent().memory().len(), 100);

    // Replays start training once 64 transitions are stored: steps 64 to 100.
    let mut expected_epsilon = 1.0f32;
    for _ in 64..=100 {
        expected_epsilon = (expected_epsilon * 0.995).max(0.01);
    }
    assert_eq!(session.agent().epsilon(), expected_epsilon);
    assert_eq!(session.agent().train_steps(), 37 * 64);
    assert_eq!(session.metrics().metrics().losses.len(), 37);
    assert_eq!(session.metrics().episode_count(), 10);

    assert!(summaries[5].mean_loss.is_none());
    assert!(summaries[6].mean_loss.is_some());
    assert_eq!(summaries[9].epsilon, expected_epsilon);
}

#[test]
fn test_step_cap_truncates() {
    let config = SessionConfig {
        max_steps_per_episode: Some(7),
        ..SessionConfig::default()
    };
    let mut session = corridor_session(1000, config);
    let summaries = session.run(2).unwrap();

    for summary in &summaries {
        assert_eq!(summary.steps, 7);
        assert!(summary.truncated);
    }
    assert_eq!(session.environment().resets, 2);
    assert!(session.agent().memory().iter().all(|t| !t.terminal));
}

#[test]
fn test_replay_cadence() {
    let config = SessionConfig {
        replay_every: 4,
        ..SessionConfig::default()
    };
    let mut session = corridor_session(100, config);
    session.run_episode().unwrap();

    // Trained replays at steps 64, 68, ..., 100.
    assert_eq!(session.agent().train_steps(), 10 * 64);
}

#[test]
fn test_rejects_invalid_config() {
    let config = SessionConfig {
        replay_every: 0,
        ..SessionConfig::default()
    };
    let agent = Agent::with_seed(&AgentConfig::default(), 0).unwrap();
    assert!(TrainingSession::new(agent, Corridor::new(3), &config).is_err());
}

#[test]
fn test_seeded_sessions_are_reproducible() {
    let config = SessionConfig {
        seed: Some(9),
        max_steps_per_episode: Some(80),
        ..SessionConfig::default()
    };
    let first = TrainingSession::from_config(&config).unwrap().run(3).unwrap();
    let second = TrainingSession::from_config(&config).unwrap().run(3).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_episode_bookkeeping() {
    let mut episode = Episode::begin(4);
    let outcome = StepOutcome {
        next_state: Observation::new([0.0; 5]),
        reward: 0.5,
        terminal: false,
        score: 1,
    };
    episode.record_step(&outcome);
    episode.record_step(&outcome);
    episode.record_replay(&ReplayOutcome::Skipped { stored: 2, required: 64 });
    episode.record_replay(&ReplayOutcome::Trained { updates: 64, mean_loss: 0.25, epsilon: 0.9 });
    episode.record_replay(&ReplayOutcome::Trained { updates: 64, mean_loss: 0.75, epsilon: 0.8 });

    assert_eq!(episode.index(), 4);
    assert_eq!(episode.steps(), 2);

    let summary = episode.finish(0.8, false);
    assert_eq!(summary.total_reward, 1.0);
    assert_eq!(summary.score, 1);
    assert_eq!(summary.mean_loss, Some(0.5));
    assert_eq!(summary.epsilon, 0.8);
}
