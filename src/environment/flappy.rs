use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{Environment, StepOutcome};
use crate::config::EnvironmentConfig;
use crate::error::Result;
use crate::types::{Action, Observation};

#[derive(Clone, Copy, Debug, PartialEq)]
struct Rect {
    x: f32,
    y: f32,
    w: f32,
    h: f32,
}

impl Rect {
    fn center_x(&self) -> f32 {
        self.x + self.w / 2.0
    }

    fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.x + other.w
            && other.x < self.x + self.w
            && self.y < other.y + other.h
            && other.y < self.y + self.h
    }
}

#[derive(Clone, Debug)]
struct Player {
    rect: Rect,
    vel_y: f32,
    flapped: bool,
    min_y: f32,
    max_y: f32,
}

impl Player {
    fn new(config: &EnvironmentConfig) -> Self {
        let h = config.player_height;
        Player {
            rect: Rect {
                x: (config.width * 0.2).floor(),
                y: ((config.height - h) / 2.0).floor(),
                w: config.player_width,
                h,
            },
            vel_y: config.flap_velocity,
            flapped: false,
            min_y: -2.0 * h,
            max_y: config.floor_y() - h * 0.75,
        }
    }

    fn flap(&mut self, config: &EnvironmentConfig) {
        if self.rect.y > self.min_y {
            self.vel_y = config.flap_velocity;
            self.flapped = true;
        }
    }

    fn tick(&mut self, config: &EnvironmentConfig) {
        // No gravity on the frame of a flap.
        if self.vel_y < config.max_fall_velocity && !self.flapped {
            self.vel_y += config.gravity;
        }
        self.flapped = false;
        self.rect.y = (self.rect.y + self.vel_y).clamp(self.min_y, self.max_y);
    }

    /// The player center passes the pipe center during this frame.
    fn crossed(&self, pipe: &Rect, pipe_velocity: f32) -> bool {
        let center = self.rect.center_x();
        pipe.center_x() <= center && center < pipe.center_x() - pipe_velocity
    }
}

#[derive(Clone, Copy, Debug)]
struct PipePair {
    upper: Rect,
    lower: Rect,
}

/// Headless flappy bird.
///
/// One call to [`Environment::step`] is one frame of the classic game:
/// optional flap, pipes scroll, gravity, collision check, reward. Rewards are
/// `pass_reward` for the frame a pipe is crossed (even if that frame also
/// crashes), `crash_reward` on any other collision and `alive_reward`
/// otherwise. A collision always ends the episode.
///
/// Pipe gap heights come from the environment's own random source, so a
/// seeded environment replays the same course.
pub struct FlappyEnvironment<R = StdRng> {
    config: EnvironmentConfig,
    player: Player,
    pipes: VecDeque<PipePair>,
    score: u32,
    frames: usize,
    crashed: bool,
    rng: R,
}

impl FlappyEnvironment<StdRng> {
    pub fn with_seed(config: EnvironmentConfig, seed: u64) -> Result<Self> {
        Self::new(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> FlappyEnvironment<R> {
    pub fn new(config: EnvironmentConfig, rng: R) -> Result<Self> {
        config.validate()?;
        let player = Player::new(&config);
        let mut environment = FlappyEnvironment {
            config,
            player,
            pipes: VecDeque::new(),
            score: 0,
            frames: 0,
            crashed: false,
            rng,
        };
        environment.spawn_initial_pipes();
        Ok(environment)
    }

    pub fn config(&self) -> &EnvironmentConfig {
        &self.config
    }

    /// Pipes passed in the current episode.
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Frames simulated in the current episode.
    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn is_crashed(&self) -> bool {
        self.crashed
    }

    pub fn player_velocity(&self) -> f32 {
        self.player.vel_y
    }

    fn random_pipe_pair(&mut self, x: f32) -> PipePair {
        let base_y = self.config.floor_y();
        let span = ((base_y * 0.6 - self.config.pipe_gap) as i32).max(1);
        let gap_y = self.rng.gen_range(0..span) as f32 + (base_y * 0.2).floor();
        let (w, h) = (self.config.pipe_width, self.config.pipe_height);

        PipePair {
            upper: Rect { x, y: gap_y - h, w, h },
            lower: Rect {
                x,
                y: gap_y + self.config.pipe_gap,
                w,
                h,
            },
        }
    }

    fn spawn_initial_pipes(&mut self) {
        let first_x = self.config.width + 100.0;
        let second_x = first_x + self.config.width / 2.0;
        let first = self.random_pipe_pair(first_x);
        let second = self.random_pipe_pair(second_x);
        self.pipes.clear();
        self.pipes.push_back(first);
        self.pipes.push_back(second);
    }

    /// Whether a new pair should enter on the right this frame.
    ///
    /// Also spawns whenever fewer than two pairs remain, so there are always
    /// two pairs to observe.
    fn can_spawn_pipes(&self) -> bool {
        match self.pipes.back() {
            Some(last) if self.pipes.len() >= 2 => {
                self.config.width - (last.upper.x + last.upper.w) > last.upper.w * 2.5
            }
            _ => true,
        }
    }

    fn tick_pipes(&mut self) {
        while let Some(first) = self.pipes.front() {
            if first.upper.x < -first.upper.w {
                self.pipes.pop_front();
            } else {
                break;
            }
        }

        if self.can_spawn_pipes() {
            let pair = self.random_pipe_pair(self.config.width + 10.0);
            self.pipes.push_back(pair);
        }

        let velocity = self.config.pipe_velocity;
        for pair in self.pipes.iter_mut() {
            pair.upper.x += velocity;
            pair.lower.x += velocity;
        }
    }

    fn collided(&self) -> bool {
        if self.player.rect.y + self.player.rect.h >= self.config.floor_y() - 1.0 {
            return true;
        }
        self.pipes
            .iter()
            .any(|pair| self.player.rect.overlaps(&pair.upper) || self.player.rect.overlaps(&pair.lower))
    }
}

impl<R: Rng> Environment for FlappyEnvironment<R> {
    fn reset(&mut self) -> Observation {
        self.player = Player::new(&self.config);
        self.score = 0;
        self.frames = 0;
        self.crashed = false;
        self.spawn_initial_pipes();
        self.observe()
    }

    /// `[player y, first lower pipe x, first lower pipe y, second lower pipe x, second lower pipe y]`
    fn observe(&self) -> Observation {
        let pipe = |index: usize| {
            self.pipes
                .get(index)
                .map(|pair| (pair.lower.x, pair.lower.y))
                .unwrap_or((self.config.width + 10.0, self.config.floor_y()))
        };
        let (first_x, first_y) = pipe(0);
        let (second_x, second_y) = pipe(1);
        Observation::new([self.player.rect.y, first_x, first_y, second_x, second_y])
    }

    fn step(&mut self, action: Action) -> StepOutcome {
        if self.crashed {
            return StepOutcome {
                next_state: self.observe(),
                reward: 0.0,
                terminal: true,
                score: self.score,
            };
        }

        self.frames += 1;
        if action == Action::Flap {
            self.player.flap(&self.config);
        }

        self.tick_pipes();
        self.player.tick(&self.config);

        let crossed = self
            .pipes
            .iter()
            .filter(|pair| self.player.crossed(&pair.upper, self.config.pipe_velocity))
            .count() as u32;
        self.score += crossed;

        self.crashed = self.collided();
        // A crossing on the crash frame still pays the pass reward.
        let reward = if crossed > 0 {
            self.config.pass_reward
        } else if self.crashed {
            self.config.crash_reward
        } else {
            self.config.alive_reward
        };

        StepOutcome {
            next_state: self.observe(),
            reward,
            terminal: self.crashed,
            score: self.score,
        }
    }
}
