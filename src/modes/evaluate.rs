//! Evaluation mode for trained agents
//!
//! Loads a saved Q-network and plays games greedily, with no exploration
//! and no learning, reporting the score of every game.
//!
//! # Example
//!
//! ```rust,ignore
//! use dqn_snake::modes::EvaluateMode;
//! use dqn_snake::rl::{InferenceBackend, default_device};
//! use std::path::Path;
//!
//! let mut evaluate_mode =
//!     EvaluateMode::<InferenceBackend>::new(Path::new("models/snake"), None, None, default_device())?;
//! let summary = evaluate_mode.run(10)?;
//! println!("mean score {:.2}", summary.mean_score());
//! ```

use anyhow::{Context, Result};
use burn::tensor::backend::Backend;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::game::GameConfig;
use crate::rl::{QNetwork, SnakeEnvironment, greedy_action, load_network};

/// Result of one evaluation game
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameOutcome {
    pub score: u32,
    pub steps: usize,
    pub reward: f32,
}

/// Scores of every evaluated game
#[derive(Debug, Clone, Default)]
pub struct EvaluationSummary {
    pub games: Vec<GameOutcome>,
}

impl EvaluationSummary {
    pub fn mean_score(&self) -> f32 {
        if self.games.is_empty() {
            return 0.0;
        }
        self.games.iter().map(|g| g.score as f32).sum::<f32>() / self.games.len() as f32
    }

    pub fn best_score(&self) -> u32 {
        self.games.iter().map(|g| g.score).max().unwrap_or(0)
    }
}

pub struct EvaluateMode<B: Backend> {
    network: QNetwork<B>,
    env: SnakeEnvironment,
    device: B::Device,
}

impl<B: Backend> EvaluateMode<B> {
    /// Load a checkpoint and prepare an environment for it
    ///
    /// Without an explicit `game_config` the game the model was trained on is
    /// used.
    pub fn new(
        model_path: &Path,
        game_config: Option<GameConfig>,
        seed: Option<u64>,
        device: B::Device,
    ) -> Result<Self> {
        let (network, metadata) = load_network::<B>(model_path, &device)
            .with_context(|| format!("Failed to load model from {:?}", model_path))?;

        info!(
            episodes = metadata.episodes_trained,
            record = metadata.record,
            version = %metadata.version,
            "evaluating model"
        );
        if metadata.version != env!("CARGO_PKG_VERSION") {
            warn!(saved = %metadata.version, "model was saved by a different version");
        }

        let game_config = game_config.unwrap_or(metadata.game_config);
        Self::from_network(network, game_config, seed, device)
    }

    /// Evaluate a network that is already in memory
    pub fn from_network(
        network: QNetwork<B>,
        game_config: GameConfig,
        seed: Option<u64>,
        device: B::Device,
    ) -> Result<Self> {
        let env = match seed {
            Some(seed) => SnakeEnvironment::with_seed(game_config, seed),
            None => SnakeEnvironment::new(game_config),
        }
        .context("Failed to create environment")?;

        Ok(Self {
            network,
            env,
            device,
        })
    }

    /// Play `num_games` games and print one line per game
    pub fn run(&mut self, num_games: usize) -> Result<EvaluationSummary> {
        let mut summary = EvaluationSummary::default();

        for game in 1..=num_games {
            let outcome = self.play_game()?;
            println!("Game {} - Score: {} - Steps: {}", game, outcome.score, outcome.steps);
            summary.games.push(outcome);
        }

        info!(
            games = summary.games.len(),
            mean_score = summary.mean_score(),
            best_score = summary.best_score(),
            "evaluation complete"
        );

        Ok(summary)
    }

    /// Play a single game to termination with the greedy policy
    pub fn play_game(&mut self) -> Result<GameOutcome> {
        let mut state = self.env.reset()?;
        let mut outcome = GameOutcome {
            score: 0,
            steps: 0,
            reward: 0.0,
        };

        loop {
            let action = greedy_action(&self.network, &state, &self.device)?;
            let (next_state, result) = self.env.step(action)?;

            outcome.steps += 1;
            outcome.reward += result.reward;
            state = next_state;

            if result.terminated {
                debug!(cause = ?result.info.collision_type, steps = outcome.steps, "game over");
                break;
            }
        }

        outcome.score = self.env.state().score;
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rl::{
        DqnAgent, DqnConfig, InferenceBackend, QNetworkConfig, TrainingBackend, default_device,
        save_model,
    };
    use tempfile::TempDir;

    #[test]
    fn test_summary_of_no_games() {
        let summary = EvaluationSummary::default();
        assert_eq!(summary.mean_score(), 0.0);
        assert_eq!(summary.best_score(), 0);
    }

    #[test]
    fn test_summary_statistics() {
        let summary = EvaluationSummary {
            games: vec![
                GameOutcome { score: 1, steps: 10, reward: 0.0 },
                GameOutcome { score: 4, steps: 40, reward: 0.0 },
            ],
        };
        assert!((summary.mean_score() - 2.5).abs() < 1e-6);
        assert_eq!(summary.best_score(), 4);
    }

    #[test]
    fn test_games_terminate() {
        let device = default_device();
        let network = QNetworkConfig::new(8).init::<InferenceBackend>(&device);
        let mut evaluate_mode =
            EvaluateMode::from_network(network, GameConfig::small(), Some(5), device).unwrap();

        let summary = evaluate_mode.run(3).unwrap();

        assert_eq!(summary.games.len(), 3);
        for game in &summary.games {
            assert!(game.steps > 0);
        }
    }

    #[test]
    fn test_evaluation_is_deterministic_for_seed() {
        let device = default_device();
        let network = QNetworkConfig::new(8).init::<InferenceBackend>(&device);

        let mut first =
            EvaluateMode::from_network(network.clone(), GameConfig::small(), Some(9), device)
                .unwrap();
        let mut second =
            EvaluateMode::from_network(network, GameConfig::small(), Some(9), device).unwrap();

        assert_eq!(first.play_game().unwrap(), second.play_game().unwrap());
    }

    #[test]
    fn test_load_saved_model() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("snake");
        let device = default_device();

        let config = DqnConfig {
            hidden_size: 8,
            ..Default::default()
        };
        let agent = DqnAgent::<TrainingBackend>::new(config, device, Some(2)).unwrap();
        save_model(&agent, &GameConfig::small(), 0, &path).unwrap();

        let mut evaluate_mode =
            EvaluateMode::<InferenceBackend>::new(&path, None, Some(1), device).unwrap();
        assert_eq!(evaluate_mode.env.config(), &GameConfig::small());
        assert!(evaluate_mode.play_game().unwrap().steps > 0);
    }
}
