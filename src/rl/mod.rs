//! Deep Q-Learning for the Snake game
//!
//! Provides:
//! - 11-feature state encoding
//! - Relative-action RL environment
//! - Q-network, trainer and epsilon-greedy agent
//! - Experience replay memory
//! - Checkpoint persistence

pub mod agent;
pub mod backend;
pub mod config;
pub mod environment;
pub mod memory;
pub mod network;
pub mod observation;
pub mod persistence;
pub mod trainer;

pub use agent::{DqnAgent, epsilon_schedule, greedy_action};
pub use backend::{InferenceBackend, TrainingBackend, default_device};
pub use config::DqnConfig;
pub use environment::SnakeEnvironment;
pub use memory::{ReplayMemory, Transition, TransitionBatch};
pub use network::{QNetwork, QNetworkConfig};
pub use observation::{STATE_SIZE, StateVector, encode_state};
pub use persistence::{ModelMetadata, load_network, save_model};
pub use trainer::{QTrainer, bellman_targets};
