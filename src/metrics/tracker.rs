use std::collections::VecDeque;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::session::EpisodeSummary;

/// Stores training metrics over time
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingMetrics {
    /// Mean loss of each replay batch
    pub losses: VecDeque<f32>,

    /// Rewards per episode
    pub episode_rewards: VecDeque<f32>,

    /// Episode lengths in steps
    pub episode_lengths: VecDeque<usize>,

    /// Pipes passed per episode
    pub episode_scores: VecDeque<u32>,

    /// Epsilon at the end of each episode
    pub epsilons: VecDeque<f32>,
}

impl TrainingMetrics {
    pub fn new(history_size: usize) -> Self {
        TrainingMetrics {
            losses: VecDeque::with_capacity(history_size),
            episode_rewards: VecDeque::with_capacity(history_size),
            episode_lengths: VecDeque::with_capacity(history_size),
            episode_scores: VecDeque::with_capacity(history_size),
            epsilons: VecDeque::with_capacity(history_size),
        }
    }

    fn truncate_front(&mut self, history_size: usize) {
        keep_newest(&mut self.losses, history_size);
        keep_newest(&mut self.episode_rewards, history_size);
        keep_newest(&mut self.episode_lengths, history_size);
        keep_newest(&mut self.episode_scores, history_size);
        keep_newest(&mut self.epsilons, history_size);
    }
}

fn keep_newest<T>(history: &mut VecDeque<T>, history_size: usize) {
    let excess = history.len().saturating_sub(history_size);
    history.drain(..excess);
}

fn push_bounded<T>(history: &mut VecDeque<T>, value: T, history_size: usize) {
    if history.len() >= history_size {
        history.pop_front();
    }
    history.push_back(value);
}

fn recent_mean<I>(values: I, window: usize) -> Option<f32>
where
    I: DoubleEndedIterator<Item = f32> + ExactSizeIterator,
{
    let n = window.min(values.len());
    if n == 0 {
        return None;
    }
    let sum: f32 = values.rev().take(n).sum();
    Some(sum / n as f32)
}

/// Tracks metrics during training, keeping at most `history_size` entries per series.
#[derive(Debug, Clone)]
pub struct MetricsTracker {
    metrics: TrainingMetrics,
    history_size: usize,
    episode_count: usize,
    total_steps: usize,
    best_score: u32,
}

impl MetricsTracker {
    pub fn new(history_size: usize) -> Self {
        MetricsTracker {
            metrics: TrainingMetrics::new(history_size),
            history_size: history_size.max(1),
            episode_count: 0,
            total_steps: 0,
            best_score: 0,
        }
    }

    /// Record the mean loss of a replay batch
    pub fn record_loss(&mut self, loss: f32) {
        push_bounded(&mut self.metrics.losses, loss, self.history_size);
    }

    /// Record a finished episode
    pub fn record_episode(&mut self, summary: &EpisodeSummary) {
        push_bounded(&mut self.metrics.episode_rewards, summary.total_reward, self.history_size);
        push_bounded(&mut self.metrics.episode_lengths, summary.steps, self.history_size);
        push_bounded(&mut self.metrics.episode_scores, summary.score, self.history_size);
        push_bounded(&mut self.metrics.epsilons, summary.epsilon, self.history_size);

        self.episode_count += 1;
        self.total_steps += summary.steps;
        self.best_score = self.best_score.max(summary.score);
    }

    /// Get a reference to the metrics
    pub fn metrics(&self) -> &TrainingMetrics {
        &self.metrics
    }

    pub fn episode_count(&self) -> usize {
        self.episode_count
    }

    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    /// Highest score of any recorded episode, including ones that fell out of the history.
    pub fn best_score(&self) -> u32 {
        self.best_score
    }

    /// Get recent average loss
    pub fn avg_loss(&self, window: usize) -> Option<f32> {
        recent_mean(self.metrics.losses.iter().copied(), window)
    }

    /// Get recent average episode reward
    pub fn avg_episode_reward(&self, window: usize) -> Option<f32> {
        recent_mean(self.metrics.episode_rewards.iter().copied(), window)
    }

    pub fn avg_score(&self, window: usize) -> Option<f32> {
        recent_mean(self.metrics.episode_scores.iter().map(|&score| score as f32), window)
    }

    /// Clear all metrics
    pub fn clear(&mut self) {
        self.metrics = TrainingMetrics::new(self.history_size);
        self.episode_count = 0;
        self.total_steps = 0;
        self.best_score = 0;
    }

    /// Save metrics to a JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> crate::error::Result<()> {
        let serialized = serde_json::to_string_pretty(&self.metrics)?;
        std::fs::write(path, serialized)?;
        Ok(())
    }

    /// Load metrics from a JSON file, replacing the current history.
    ///
    /// Series longer than `history_size` keep their newest entries. Counters
    /// are recomputed from what was kept.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> crate::error::Result<()> {
        let data = std::fs::read_to_string(path)?;
        let mut metrics: TrainingMetrics = serde_json::from_str(&data)?;
        metrics.truncate_front(self.history_size);

        self.episode_count = metrics.episode_lengths.len();
        self.total_steps = metrics.episode_lengths.iter().sum();
        self.best_score = metrics.episode_scores.iter().copied().max().unwrap_or(0);
        self.metrics = metrics;
        Ok(())
    }
}

impl Default for MetricsTracker {
    fn default() -> Self {
        Self::new(1000)
    }
}
