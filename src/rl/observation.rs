use burn::tensor::{Tensor, TensorData, backend::Backend};

use crate::game::{Direction, GameEngine, GameState, RelativeAction};

/// Number of features produced by [`encode_state`]
pub const STATE_SIZE: usize = 11;

/// Flat feature vector fed to the Q-network
pub type StateVector = [f32; STATE_SIZE];

/// Encode the game state as 11 binary features
///
/// Layout:
/// - 0..3: danger straight, right, left (relative to heading)
/// - 3..7: heading left, right, down, up
/// - 7..11: food left, right, below, above the head
pub fn encode_state(state: &GameState) -> StateVector {
    let head = state.snake.head();
    let heading = state.snake.direction;
    let cell = state.cell_size;

    let danger = |action: RelativeAction| {
        GameEngine::probe_collision(state, head.stepped(heading.turned(action), cell))
    };

    let food = state.food;
    let features = [
        danger(RelativeAction::Straight),
        danger(RelativeAction::Right),
        danger(RelativeAction::Left),
        heading == Direction::Left,
        heading == Direction::Right,
        heading == Direction::Down,
        heading == Direction::Up,
        food.x < head.x,
        food.x > head.x,
        food.y > head.y,
        food.y < head.y,
    ];

    features.map(|flag| if flag { 1.0 } else { 0.0 })
}

/// Stack feature vectors into a `[batch, STATE_SIZE]` tensor
pub fn states_to_tensor<B: Backend>(states: &[StateVector], device: &B::Device) -> Tensor<B, 2> {
    let data: Vec<f32> = states.iter().flat_map(|s| s.iter().copied()).collect();
    Tensor::from_data(TensorData::new(data, [states.len(), STATE_SIZE]), device)
}
