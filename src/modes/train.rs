//! Training mode for the DQN agent
//!
//! Plays episodes in the Snake environment. Every step is learned from
//! immediately and stored for replay; every finished episode triggers one
//! replay update over a sampled batch.
//!
//! # Example
//!
//! ```rust,ignore
//! use dqn_snake::modes::{TrainConfig, TrainMode};
//! use dqn_snake::rl::{TrainingBackend, default_device};
//! use std::path::PathBuf;
//!
//! let mut config = TrainConfig::new(PathBuf::from("models/snake"));
//! config.num_episodes = Some(500);
//!
//! let mut train_mode = TrainMode::<TrainingBackend>::new(config, default_device())?;
//! train_mode.run()?;
//! ```

use anyhow::{Context, Result, bail};
use burn::tensor::backend::AutodiffBackend;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::game::GameConfig;
use crate::metrics::TrainingStats;
use crate::rl::{
    DqnAgent, DqnConfig, SnakeEnvironment, StateVector, Transition, load_network, save_model,
};

/// Configuration for training mode
#[derive(Debug, Clone)]
pub struct TrainConfig {
    /// Number of episodes to train; `None` runs until the process is stopped
    pub num_episodes: Option<usize>,

    /// Path to save the trained model
    pub save_path: PathBuf,

    /// Save a checkpoint every N episodes
    pub checkpoint_frequency: usize,

    /// Log a summary every N episodes
    pub log_frequency: usize,

    /// Seed for food placement and exploration; `None` uses OS entropy
    pub seed: Option<u64>,

    /// Checkpoint to continue training from
    pub resume_from: Option<PathBuf>,

    pub game_config: GameConfig,

    pub dqn_config: DqnConfig,
}

impl TrainConfig {
    pub fn new(save_path: PathBuf) -> Self {
        Self {
            num_episodes: None,
            save_path,
            checkpoint_frequency: 100,
            log_frequency: 50,
            seed: None,
            resume_from: None,
            game_config: GameConfig::default(),
            dqn_config: DqnConfig::default(),
        }
    }

    /// Reject settings the training loop cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.checkpoint_frequency == 0 {
            bail!("checkpoint_frequency must be at least 1");
        }
        if self.log_frequency == 0 {
            bail!("log_frequency must be at least 1");
        }
        self.game_config.validate()?;
        self.dqn_config
            .validate()
            .map_err(|msg| anyhow::anyhow!("invalid DQN configuration: {msg}"))
    }
}

/// Outcome of a single episode
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeReport {
    /// 1-based index of the episode across the whole run
    pub episode: usize,
    pub score: u32,
    pub record: u32,
    pub reward: f32,
    pub steps: usize,
    pub replay_loss: f32,
}

impl EpisodeReport {
    /// Progress line printed after every episode
    pub fn line(&self) -> String {
        format!(
            "Game {} - Score: {} - Record: {}",
            self.episode, self.score, self.record
        )
    }
}

pub struct TrainMode<B: AutodiffBackend> {
    agent: DqnAgent<B>,
    env: SnakeEnvironment,
    stats: TrainingStats,
    config: TrainConfig,
}

impl<B: AutodiffBackend> TrainMode<B> {
    /// Create a training run, resuming from a checkpoint if one is configured
    pub fn new(config: TrainConfig, device: B::Device) -> Result<Self> {
        config.validate()?;

        let env_seed = config.seed;
        let agent_seed = config.seed.map(|seed| seed.wrapping_add(1));

        let (agent, record) = match &config.resume_from {
            Some(path) => {
                let (network, metadata) = load_network::<B>(path, &device)
                    .with_context(|| format!("Failed to resume from {:?}", path))?;
                if metadata.dqn_config.hidden_size != config.dqn_config.hidden_size {
                    info!(
                        saved = metadata.dqn_config.hidden_size,
                        "using hidden size from checkpoint"
                    );
                }
                let dqn_config = DqnConfig {
                    hidden_size: metadata.dqn_config.hidden_size,
                    ..config.dqn_config.clone()
                };
                let agent = DqnAgent::from_network(
                    network,
                    dqn_config,
                    metadata.episodes_trained,
                    device,
                    agent_seed,
                )?;
                (agent, metadata.record)
            }
            None => (DqnAgent::new(config.dqn_config.clone(), device, agent_seed)?, 0),
        };

        let env = match env_seed {
            Some(seed) => SnakeEnvironment::with_seed(config.game_config.clone(), seed),
            None => SnakeEnvironment::new(config.game_config.clone()),
        }
        .context("Failed to create environment")?;

        Ok(Self {
            agent,
            env,
            stats: TrainingStats::new(100).with_record(record),
            config,
        })
    }

    /// Run the configured number of episodes, or forever
    pub fn run(&mut self) -> Result<()> {
        self.log_header();

        let mut completed = 0;
        while self.config.num_episodes.is_none_or(|limit| completed < limit) {
            let report = match self.run_episode() {
                Ok(report) => report,
                Err(err) => {
                    warn!(error = %err, "episode failed, saving model before stopping");
                    if let Err(save_err) = self.save_model() {
                        warn!(error = %save_err, "could not save model");
                    }
                    return Err(err);
                }
            };
            completed += 1;

            println!("{}", report.line());

            if completed % self.config.log_frequency == 0 {
                info!(epsilon = self.agent.epsilon(), "{}", self.stats.format_summary());
            }

            if completed % self.config.checkpoint_frequency == 0 {
                self.save_checkpoint()?;
            }
        }

        self.save_model()?;
        info!(path = ?self.config.save_path, "training complete");
        info!("{}", self.stats.format_summary());

        Ok(())
    }

    /// Play one episode to termination, then reset and replay
    pub fn run_episode(&mut self) -> Result<EpisodeReport> {
        let mut state: StateVector = self.env.observe();
        let mut episode_reward = 0.0;
        let mut steps = 0;

        loop {
            let action = self.agent.select_action(&state)?;
            let (next_state, result) = self.env.step(action)?;

            let transition = Transition {
                state,
                action,
                reward: result.reward,
                next_state,
                done: result.terminated,
            };
            self.agent.train_short_memory(&transition)?;
            self.agent.remember(transition);

            episode_reward += result.reward;
            steps += 1;
            state = next_state;

            if result.terminated {
                debug!(cause = ?result.info.collision_type, steps, "episode ended");
                break;
            }
        }

        let score = self.env.state().score;
        self.env.reset()?;
        self.agent.finish_episode();
        let replay_loss = self.agent.train_long_memory()?;

        self.stats.record_episode(score, episode_reward, steps);
        self.stats.record_update(replay_loss);

        let report = EpisodeReport {
            episode: self.agent.episodes_trained(),
            score,
            record: self.stats.record(),
            reward: episode_reward,
            steps,
            replay_loss,
        };
        debug!(?report, epsilon = self.agent.epsilon(), "episode report");

        Ok(report)
    }

    pub fn agent(&self) -> &DqnAgent<B> {
        &self.agent
    }

    pub fn stats(&self) -> &TrainingStats {
        &self.stats
    }

    fn save_checkpoint(&self) -> Result<()> {
        let checkpoint_path = self
            .config
            .save_path
            .parent()
            .unwrap_or(Path::new("."))
            .join(format!("checkpoint_ep{}", self.agent.episodes_trained()));

        save_model(
            &self.agent,
            &self.config.game_config,
            self.stats.record(),
            &checkpoint_path,
        )
        .with_context(|| format!("Failed to save checkpoint to {:?}", checkpoint_path))
    }

    fn save_model(&self) -> Result<()> {
        save_model(
            &self.agent,
            &self.config.game_config,
            self.stats.record(),
            &self.config.save_path,
        )
        .with_context(|| format!("Failed to save final model to {:?}", self.config.save_path))
    }

    fn log_header(&self) {
        let game = &self.config.game_config;
        let dqn = self.agent.config();
        info!(
            width = game.width,
            height = game.height,
            cell = game.cell_size,
            "game configuration"
        );
        info!(
            learning_rate = dqn.learning_rate,
            gamma = dqn.gamma,
            hidden = dqn.hidden_size,
            memory = dqn.memory_capacity,
            batch = dqn.batch_size,
            epsilon = self.agent.epsilon(),
            "dqn configuration"
        );
        match self.config.num_episodes {
            Some(n) => info!(episodes = n, save_path = ?self.config.save_path, "starting training"),
            None => info!(save_path = ?self.config.save_path, "starting training until stopped"),
        }
    }
}
