use super::{
    action::{Direction, RelativeAction},
    config::GameConfig,
    error::GameError,
    state::{CollisionType, GameState, Position, Snake},
};
use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};

/// Information about a step
#[derive(Debug, Clone, PartialEq)]
pub struct StepInfo {
    /// Whether the snake ate food this step
    pub ate_food: bool,
    /// Why the episode ended, if it did
    pub collision_type: Option<CollisionType>,
}

/// Result of a game step
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    /// Reward for this step (for RL training)
    pub reward: f32,
    /// Whether the game has terminated
    pub terminated: bool,
    /// Additional information about the step
    pub info: StepInfo,
}

/// The game engine that handles all game logic
pub struct GameEngine {
    config: GameConfig,
    rng: StdRng,
}

impl GameEngine {
    /// Create a new game engine seeded from OS entropy
    pub fn new(config: GameConfig) -> Result<Self, GameError> {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Create a new game engine with a reproducible food sequence
    pub fn with_seed(config: GameConfig, seed: u64) -> Result<Self, GameError> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: GameConfig, rng: StdRng) -> Result<Self, GameError> {
        config.validate()?;
        Ok(Self { config, rng })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Reset the game to initial state
    pub fn reset(&mut self) -> Result<GameState, GameError> {
        let cell = self.config.cell_size;
        let center_x = (self.config.width / 2) / cell * cell;
        let center_y = (self.config.height / 2) / cell * cell;

        let snake = Snake::new(
            Position::new(center_x, center_y),
            Direction::Right,
            self.config.initial_snake_length,
            cell,
        );

        let food = self.spawn_food_avoid_snake(&snake)?;

        Ok(GameState::new(
            snake,
            food,
            self.config.width,
            self.config.height,
            cell,
        ))
    }

    /// Execute one step of the game
    pub fn step(
        &mut self,
        state: &mut GameState,
        action: RelativeAction,
    ) -> Result<StepResult, GameError> {
        if !state.is_alive {
            return Ok(StepResult {
                reward: 0.0,
                terminated: true,
                info: StepInfo {
                    ate_food: false,
                    collision_type: None,
                },
            });
        }

        let previous_direction = state.snake.direction;
        state.snake.direction = state.snake.direction.turned(action);
        let new_head = state.snake.head().stepped(state.snake.direction, state.cell_size);
        state.steps += 1;

        // Checked against the body before the head moves
        let collision = state.collision_at(new_head);
        state.snake.body.insert(0, new_head);

        let budget = self.config.step_budget_factor as usize * state.snake.len();
        let collision = collision.or(if state.steps as usize > budget {
            Some(CollisionType::StepBudget)
        } else {
            None
        });

        if let Some(collision_type) = collision {
            state.is_alive = false;

            return Ok(StepResult {
                reward: self.config.death_penalty,
                terminated: true,
                info: StepInfo {
                    ate_food: false,
                    collision_type: Some(collision_type),
                },
            });
        }

        let ate_food = new_head == state.food;

        let reward = if ate_food {
            match self.spawn_food_avoid_snake(&state.snake) {
                Ok(food) => state.food = food,
                Err(err) => {
                    // Undo the move so the caller still sees the last valid state
                    state.snake.body.remove(0);
                    state.snake.direction = previous_direction;
                    state.steps -= 1;
                    return Err(err);
                }
            }
            state.score += 1;
            self.config.food_reward
        } else {
            state.snake.body.pop();
            self.config.step_penalty
        };

        Ok(StepResult {
            reward,
            terminated: false,
            info: StepInfo {
                ate_food,
                collision_type: None,
            },
        })
    }

    /// Whether moving the head onto `point` this step would end the game
    ///
    /// Unlike `step`, this never touches the game state.
    pub fn probe_collision(state: &GameState, point: Position) -> bool {
        state.collision_at(point).is_some()
    }

    /// Spawn food at a uniformly random empty cell
    fn spawn_food_avoid_snake(&mut self, snake: &Snake) -> Result<Position, GameError> {
        let cells = self.config.cell_count();
        if snake.len() >= cells {
            return Err(GameError::BoardFull { cells: snake.len() });
        }

        let cell = self.config.cell_size;
        let columns = self.config.columns();
        let rows = self.config.rows();

        for _ in 0..4 * cells {
            let x = self.rng.gen_range(0..columns) * cell;
            let y = self.rng.gen_range(0..rows) * cell;
            let pos = Position::new(x, y);

            if !snake.contains(pos) {
                return Ok(pos);
            }
        }

        // Crowded board: pick among the remaining free cells directly
        let free: Vec<Position> = (0..rows)
            .flat_map(|row| (0..columns).map(move |col| Position::new(col * cell, row * cell)))
            .filter(|&pos| !snake.contains(pos))
            .collect();

        free.choose(&mut self.rng)
            .copied()
            .ok_or(GameError::BoardFull { cells: snake.len() })
    }
}
