use serde::{Deserialize, Serialize};

use super::error::GameError;

/// Configuration for the game
///
/// Dimensions are in pixels; the playing field is a grid of `cell_size`
/// squares and every snake segment and food item sits on a cell corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Width of the playing field in pixels
    pub width: i32,
    /// Height of the playing field in pixels
    pub height: i32,
    /// Edge length of one grid cell in pixels
    pub cell_size: i32,
    /// Initial length of the snake
    pub initial_snake_length: usize,

    // Rewards (for RL)
    /// Reward for eating food
    pub food_reward: f32,
    /// Penalty for each step (encourages efficiency)
    pub step_penalty: f32,
    /// Penalty for dying or running out of steps
    pub death_penalty: f32,

    /// An episode ends once its step count exceeds this factor times the
    /// snake length
    pub step_budget_factor: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            cell_size: 20,
            initial_snake_length: 3,
            food_reward: 30.0,
            step_penalty: -1.0,
            death_penalty: -10.0,
            step_budget_factor: 100,
        }
    }
}

impl GameConfig {
    /// Create a new configuration with a custom field size
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    /// Create a small field for testing (8x6 cells)
    pub fn small() -> Self {
        Self::new(160, 120)
    }

    /// Number of grid columns
    pub fn columns(&self) -> i32 {
        self.width / self.cell_size
    }

    /// Number of grid rows
    pub fn rows(&self) -> i32 {
        self.height / self.cell_size
    }

    /// Total number of cells on the field
    pub fn cell_count(&self) -> usize {
        (self.columns() * self.rows()) as usize
    }

    pub fn validate(&self) -> Result<(), GameError> {
        if self.cell_size <= 0 {
            return Err(GameError::InvalidConfig(format!(
                "cell_size must be positive, got {}",
                self.cell_size
            )));
        }

        if self.width <= 0 || self.height <= 0 {
            return Err(GameError::InvalidConfig(format!(
                "field must have positive size, got {}x{}",
                self.width, self.height
            )));
        }

        if self.width % self.cell_size != 0 || self.height % self.cell_size != 0 {
            return Err(GameError::InvalidConfig(format!(
                "field {}x{} is not a multiple of cell_size {}",
                self.width, self.height, self.cell_size
            )));
        }

        if self.initial_snake_length == 0 {
            return Err(GameError::InvalidConfig(
                "initial_snake_length must be at least 1".to_string(),
            ));
        }

        // The snake starts at the centre column and extends to the left
        let free_left = (self.columns() / 2) as usize;
        if self.initial_snake_length > free_left + 1 {
            return Err(GameError::InvalidConfig(format!(
                "snake of length {} does not fit in {} columns",
                self.initial_snake_length,
                self.columns()
            )));
        }

        if self.step_budget_factor == 0 {
            return Err(GameError::InvalidConfig(
                "step_budget_factor must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GameConfig::default();
        assert_eq!(config.width, 640);
        assert_eq!(config.height, 480);
        assert_eq!(config.cell_size, 20);
        assert_eq!(config.initial_snake_length, 3);
        assert_eq!(config.columns(), 32);
        assert_eq!(config.rows(), 24);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_custom_config() {
        let config = GameConfig::new(200, 100);
        assert_eq!(config.columns(), 10);
        assert_eq!(config.rows(), 5);
        assert_eq!(config.cell_count(), 50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_misaligned_field() {
        let config = GameConfig::new(645, 480);
        assert!(matches!(config.validate(), Err(GameError::InvalidConfig(_))));
    }

    #[test]
    fn test_validation_rejects_zero_cell() {
        let config = GameConfig {
            cell_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_snake_too_long() {
        let config = GameConfig {
            initial_snake_length: 4,
            ..GameConfig::new(80, 80)
        };
        assert!(config.validate().is_err());
    }
}
