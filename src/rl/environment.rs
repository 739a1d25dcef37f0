use super::observation::{StateVector, encode_state};
use crate::game::{
    GameConfig, GameEngine, GameError, GameState, Position, RelativeAction, StepResult,
};

/// Snake environment for reinforcement learning
///
/// Wraps the game engine and provides the RL interface:
/// - 11-feature state vectors
/// - Discrete relative action space (Straight, Left, Right)
/// - Standard reset/step cycle
pub struct SnakeEnvironment {
    engine: GameEngine,
    state: GameState,
}

impl SnakeEnvironment {
    /// Create a new Snake environment
    pub fn new(config: GameConfig) -> Result<Self, GameError> {
        Self::from_engine(GameEngine::new(config)?)
    }

    /// Create an environment with a reproducible food sequence
    pub fn with_seed(config: GameConfig, seed: u64) -> Result<Self, GameError> {
        Self::from_engine(GameEngine::with_seed(config, seed)?)
    }

    fn from_engine(mut engine: GameEngine) -> Result<Self, GameError> {
        let state = engine.reset()?;
        Ok(Self { engine, state })
    }

    /// Reset the environment and return the initial features
    pub fn reset(&mut self) -> Result<StateVector, GameError> {
        self.state = self.engine.reset()?;
        Ok(self.observe())
    }

    /// Advance one step and return (next features, step result)
    pub fn step(
        &mut self,
        action: RelativeAction,
    ) -> Result<(StateVector, StepResult), GameError> {
        let result = self.engine.step(&mut self.state, action)?;
        Ok((self.observe(), result))
    }

    /// Current features without stepping
    pub fn observe(&self) -> StateVector {
        encode_state(&self.state)
    }

    /// Side-effect free collision query for lookahead
    pub fn probe_collision(&self, point: Position) -> bool {
        GameEngine::probe_collision(&self.state, point)
    }

    /// Read-only view of the game, for display or inspection
    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn config(&self) -> &GameConfig {
        self.engine.config()
    }

    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }
}
