//! DQN hyperparameter configuration

use serde::{Deserialize, Serialize};

/// Configuration for the Deep Q-Learning agent
///
/// # Example
///
/// ```rust
/// use dqn_snake::rl::DqnConfig;
///
/// let config = DqnConfig {
///     learning_rate: 5e-4,
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DqnConfig {
    /// Learning rate for the Adam optimizer
    ///
    /// Default: 1e-3
    pub learning_rate: f64,

    /// Discount factor applied to the best next-state value
    ///
    /// Default: 0.9
    pub gamma: f32,

    /// Width of the Q-network hidden layer
    ///
    /// Default: 256
    pub hidden_size: usize,

    /// Maximum number of transitions kept for experience replay
    ///
    /// Default: 100_000
    pub memory_capacity: usize,

    /// Transitions sampled for each end-of-episode replay update
    ///
    /// Default: 1000
    pub batch_size: usize,

    /// Exploration value before any episode has completed
    ///
    /// Default: 80
    pub epsilon_start: f32,

    /// Amount subtracted from epsilon per completed episode
    ///
    /// Default: 1
    pub epsilon_decay: f32,

    /// Lower bound on epsilon, so some exploration always remains
    ///
    /// Default: 2
    pub epsilon_floor: f32,

    /// A step is random with probability `epsilon / epsilon_scale`
    ///
    /// Default: 200
    pub epsilon_scale: f32,
}

impl DqnConfig {
    /// Check that all hyperparameters are in valid ranges
    pub fn validate(&self) -> Result<(), String> {
        if self.learning_rate <= 0.0 {
            return Err(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            ));
        }

        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(format!("gamma must be in [0, 1], got {}", self.gamma));
        }

        if self.hidden_size == 0 {
            return Err("hidden_size must be at least 1".to_string());
        }

        if self.memory_capacity == 0 {
            return Err("memory_capacity must be at least 1".to_string());
        }

        if self.batch_size == 0 {
            return Err("batch_size must be at least 1".to_string());
        }

        if self.epsilon_decay < 0.0 {
            return Err(format!(
                "epsilon_decay must be non-negative, got {}",
                self.epsilon_decay
            ));
        }

        if self.epsilon_floor < 0.0 || self.epsilon_floor > self.epsilon_start {
            return Err(format!(
                "epsilon_floor must be in [0, epsilon_start ({})], got {}",
                self.epsilon_start, self.epsilon_floor
            ));
        }

        if self.epsilon_scale <= 0.0 {
            return Err(format!(
                "epsilon_scale must be positive, got {}",
                self.epsilon_scale
            ));
        }

        Ok(())
    }
}

impl Default for DqnConfig {
    fn default() -> Self {
        Self {
            learning_rate: 1e-3,
            gamma: 0.9,
            hidden_size: 256,
            memory_capacity: 100_000,
            batch_size: 1000,
            epsilon_start: 80.0,
            epsilon_decay: 1.0,
            epsilon_floor: 2.0,
            epsilon_scale: 200.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DqnConfig::default();
        assert_eq!(config.learning_rate, 1e-3);
        assert_eq!(config.gamma, 0.9);
        assert_eq!(config.hidden_size, 256);
        assert_eq!(config.memory_capacity, 100_000);
        assert_eq!(config.batch_size, 1000);
        assert_eq!(config.epsilon_start, 80.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_negative_learning_rate() {
        let config = DqnConfig {
            learning_rate: -0.1,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_gamma_out_of_range() {
        let mut config = DqnConfig::default();
        config.gamma = 1.5;
        assert!(config.validate().is_err());

        config.gamma = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_zero_sizes() {
        for config in [
            DqnConfig { hidden_size: 0, ..Default::default() },
            DqnConfig { memory_capacity: 0, ..Default::default() },
            DqnConfig { batch_size: 0, ..Default::default() },
        ] {
            assert!(config.validate().is_err());
        }
    }

    #[test]
    fn test_validation_epsilon_schedule() {
        let config = DqnConfig {
            epsilon_floor: 90.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = DqnConfig {
            epsilon_decay: -1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = DqnConfig {
            epsilon_scale: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_serialization() {
        let config = DqnConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let restored: DqnConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, config);
    }
}
