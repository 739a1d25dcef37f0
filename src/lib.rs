//! DQN Snake - a Snake game used as a Deep Q-Learning testbed
//!
//! This library provides:
//! - Core game logic on a pixel grid (game module)
//! - State encoding, Q-network, replay memory and the DQN agent (rl module)
//! - Rolling training statistics (metrics module)
//! - Training and evaluation loops (modes module)

pub mod game;
pub mod metrics;
pub mod modes;
pub mod rl;
