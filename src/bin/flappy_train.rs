use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

use flappy_dqn::config::SessionConfig;
use flappy_dqn::session::TrainingSession;
use flappy_dqn::Result;

/// Train a Q-learning agent on the headless flappy bird game.
#[derive(Parser, Debug)]
#[command(name = "flappy-train", version, about)]
struct Args {
    /// JSON session config; missing fields use defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of episodes to play
    #[arg(short, long)]
    episodes: Option<usize>,

    /// Seed for the agent and the pipe course
    #[arg(short, long)]
    seed: Option<u64>,

    /// Cut episodes off after this many steps
    #[arg(long)]
    max_steps: Option<usize>,

    /// Log a summary line every N episodes
    #[arg(long)]
    log_every: Option<usize>,

    /// Write the trained Q-network here (bincode)
    #[arg(long)]
    save_model: Option<PathBuf>,

    /// Write training metrics here (JSON)
    #[arg(long)]
    save_metrics: Option<PathBuf>,
}

impl Args {
    fn session_config(&self) -> Result<SessionConfig> {
        let mut config = match &self.config {
            Some(path) => SessionConfig::from_json_file(path)?,
            None => SessionConfig::default(),
        };
        if let Some(episodes) = self.episodes {
            config.episodes = episodes;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if self.max_steps.is_some() {
            config.max_steps_per_episode = self.max_steps;
        }
        if let Some(log_every) = self.log_every {
            config.log_every = log_every;
        }
        config.validate()?;
        Ok(config)
    }
}

fn run(args: Args) -> Result<()> {
    let config = args.session_config()?;
    info!(
        "training for {} episodes (seed {:?}, memory {}, batch {})",
        config.episodes, config.seed, config.agent.memory_capacity, config.agent.batch_size
    );

    let mut session = TrainingSession::from_config(&config)?;
    session.run(config.episodes)?;

    let metrics = session.metrics();
    info!(
        "done: {} episodes, {} steps, best score {}, final epsilon {:.4}",
        metrics.episode_count(),
        metrics.total_steps(),
        metrics.best_score(),
        session.agent().epsilon()
    );

    if let Some(path) = &args.save_metrics {
        metrics.save(path)?;
        info!("metrics written to {}", path.display());
    }
    if let Some(path) = &args.save_model {
        session.agent().approximator().save(path)?;
        info!("model written to {}", path.display());
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
