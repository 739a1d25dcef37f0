//! Core game logic module for Snake
//!
//! This module contains all the game logic without any I/O or rendering dependencies.
//! Actions are relative to the snake's heading, which is what the agent learns to choose.

pub mod action;
pub mod config;
pub mod engine;
pub mod error;
pub mod state;

// Re-export commonly used types
pub use action::{Direction, RelativeAction};
pub use config::GameConfig;
pub use engine::{GameEngine, StepInfo, StepResult};
pub use error::GameError;
pub use state::{CollisionType, GameState, Position, Snake};
