//! Checkpoints for resuming training and evaluating agents
//!
//! A checkpoint is two files:
//! - `<path>` - network weights (Burn named MessagePack record)
//! - `<path>.meta.json` - [`ModelMetadata`] as JSON
//!
//! Replay memory and optimizer state are not saved; a resumed run starts
//! with empty memory and fresh Adam moments.

use super::{DqnAgent, DqnConfig, QNetwork, QNetworkConfig};
use crate::game::GameConfig;
use anyhow::{Context, Result};
use burn::{
    module::Module,
    record::{FullPrecisionSettings, NamedMpkFileRecorder, Recorder},
    tensor::backend::{AutodiffBackend, Backend},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Metadata saved with the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Hyperparameters used during training
    pub dqn_config: DqnConfig,

    /// Game the agent was trained on
    pub game_config: GameConfig,

    /// Number of completed training episodes
    pub episodes_trained: usize,

    /// Best score reached so far
    pub record: u32,

    /// Exploration value at save time
    pub epsilon: f32,

    /// Version identifier for compatibility checking
    pub version: String,
}

impl ModelMetadata {
    pub fn new(
        dqn_config: DqnConfig,
        game_config: GameConfig,
        episodes_trained: usize,
        record: u32,
        epsilon: f32,
    ) -> Self {
        Self {
            dqn_config,
            game_config,
            episodes_trained,
            record,
            epsilon,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

fn metadata_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".meta.json");
    PathBuf::from(name)
}

/// Save the agent's network and training progress
///
/// Creates parent directories if they don't exist.
pub fn save_model<B: AutodiffBackend>(
    agent: &DqnAgent<B>,
    game_config: &GameConfig,
    record: u32,
    path: &Path,
) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }

    let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
    recorder
        .record(agent.network().clone().into_record(), path.to_path_buf())
        .context("Failed to save network weights")?;

    let metadata = ModelMetadata::new(
        agent.config().clone(),
        game_config.clone(),
        agent.episodes_trained(),
        record,
        agent.epsilon(),
    );

    let meta_path = metadata_path(path);
    let meta_json =
        serde_json::to_string_pretty(&metadata).context("Failed to serialize metadata")?;
    std::fs::write(&meta_path, meta_json)
        .with_context(|| format!("Failed to write metadata to {:?}", meta_path))?;

    info!(path = ?path, episodes = metadata.episodes_trained, record, "saved checkpoint");

    Ok(())
}

/// Load a saved network and its metadata
///
/// Works on any backend: load onto the autodiff backend to resume training,
/// or onto the plain backend to evaluate.
pub fn load_network<B: Backend>(
    path: &Path,
    device: &B::Device,
) -> Result<(QNetwork<B>, ModelMetadata)> {
    let meta_path = metadata_path(path);
    let meta_json = std::fs::read_to_string(&meta_path)
        .with_context(|| format!("Failed to read metadata from {:?}", meta_path))?;
    let metadata: ModelMetadata =
        serde_json::from_str(&meta_json).context("Failed to deserialize metadata")?;

    let network = QNetworkConfig::new(metadata.dqn_config.hidden_size).init::<B>(device);

    let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
    let record = recorder
        .load(path.to_path_buf(), device)
        .with_context(|| format!("Failed to load network weights from {:?}", path))?;

    info!(path = ?path, episodes = metadata.episodes_trained, "loaded checkpoint");

    Ok((network.load_record(record), metadata))
}
