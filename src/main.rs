use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use dqn_snake::game::GameConfig;
use dqn_snake::modes::{EvaluateMode, TrainConfig, TrainMode};
use dqn_snake::rl::{InferenceBackend, TrainingBackend, default_device};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Games played by `--mode evaluate` when `--episodes` is not given
const DEFAULT_EVALUATION_GAMES: usize = 10;

#[derive(Parser)]
#[command(name = "dqn_snake")]
#[command(version, about = "Snake game with a Deep Q-Learning agent")]
struct Cli {
    /// Execution mode
    #[arg(long, default_value = "train")]
    mode: Mode,

    /// Number of episodes (train runs until stopped if omitted)
    #[arg(long)]
    episodes: Option<usize>,

    /// Field width in pixels [default: 640]
    #[arg(long)]
    width: Option<i32>,

    /// Field height in pixels [default: 480]
    #[arg(long)]
    height: Option<i32>,

    /// Grid cell size in pixels [default: 20]
    #[arg(long)]
    cell_size: Option<i32>,

    /// Seed for food placement and exploration
    #[arg(long)]
    seed: Option<u64>,

    /// Model path (training output, evaluation input)
    #[arg(long, default_value = "models/snake")]
    model: PathBuf,

    /// Resume training from this checkpoint
    #[arg(long)]
    resume: Option<PathBuf>,

    /// Save a checkpoint every N episodes
    #[arg(long, default_value = "100")]
    checkpoint_frequency: usize,

    /// Adam learning rate
    #[arg(long, default_value = "0.001")]
    learning_rate: f64,

    /// Replay batch size
    #[arg(long, default_value = "1000")]
    batch_size: usize,
}

#[derive(Clone, ValueEnum)]
enum Mode {
    /// Train the agent
    Train,
    /// Play a saved model greedily
    Evaluate,
}

impl Cli {
    /// Game configuration from the size flags, or `None` if none were given
    fn game_config(&self) -> Option<GameConfig> {
        if self.width.is_none() && self.height.is_none() && self.cell_size.is_none() {
            return None;
        }

        let defaults = GameConfig::default();
        Some(GameConfig {
            width: self.width.unwrap_or(defaults.width),
            height: self.height.unwrap_or(defaults.height),
            cell_size: self.cell_size.unwrap_or(defaults.cell_size),
            ..defaults
        })
    }
}

fn init_logging() -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("dqn_snake=info"));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging()?;

    let device = default_device();

    match cli.mode {
        Mode::Train => {
            let mut config = TrainConfig::new(cli.model.clone());
            config.num_episodes = cli.episodes;
            config.checkpoint_frequency = cli.checkpoint_frequency;
            config.seed = cli.seed;
            config.resume_from = cli.resume.clone();
            config.game_config = cli.game_config().unwrap_or_default();
            config.dqn_config.learning_rate = cli.learning_rate;
            config.dqn_config.batch_size = cli.batch_size;

            let mut train_mode = TrainMode::<TrainingBackend>::new(config, device)?;
            train_mode.run()?;
        }
        Mode::Evaluate => {
            let games = cli.episodes.unwrap_or(DEFAULT_EVALUATION_GAMES);
            let mut evaluate_mode = EvaluateMode::<InferenceBackend>::new(
                &cli.model,
                cli.game_config(),
                cli.seed,
                device,
            )?;
            let summary = evaluate_mode.run(games)?;
            println!(
                "Mean score: {:.2} - Best: {}",
                summary.mean_score(),
                summary.best_score()
            );
        }
    }

    info!("done");
    Ok(())
}
