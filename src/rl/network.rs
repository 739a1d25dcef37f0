//! Q-value network for the Snake agent
//!
//! # Architecture
//!
//! ```text
//! Input: [batch, 11]
//!   ↓ Linear(11 → hidden) + ReLU
//!   ↓ Linear(hidden → 3)
//! Output: [batch, 3] one Q-value per relative action
//! ```
//!
//! The output layer has no activation since Q-values are unbounded.
//!
//! # Example
//!
//! ```rust
//! use dqn_snake::rl::QNetworkConfig;
//! use burn::backend::ndarray::NdArrayDevice;
//! use burn::backend::NdArray;
//! use burn::tensor::Tensor;
//!
//! type Backend = NdArray<f32>;
//!
//! let device = NdArrayDevice::default();
//! let network = QNetworkConfig::new(256).init::<Backend>(&device);
//!
//! let states = Tensor::zeros([4, 11], &device);
//! let q_values = network.forward(states);
//!
//! assert_eq!(q_values.dims(), [4, 3]);
//! ```

use burn::{
    module::Module,
    nn::{Linear, LinearConfig},
    tensor::{Tensor, activation::relu, backend::Backend},
};

use super::observation::STATE_SIZE;
use crate::game::RelativeAction;

/// Configuration for the Q-network
#[derive(Debug, Clone)]
pub struct QNetworkConfig {
    /// Number of input features (default: 11)
    pub input_size: usize,

    /// Width of the hidden layer
    pub hidden_size: usize,

    /// Number of actions (default: 3 for Straight/Left/Right)
    pub num_actions: usize,
}

impl QNetworkConfig {
    pub fn new(hidden_size: usize) -> Self {
        Self {
            input_size: STATE_SIZE,
            hidden_size,
            num_actions: RelativeAction::COUNT,
        }
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> QNetwork<B> {
        QNetwork {
            hidden: LinearConfig::new(self.input_size, self.hidden_size).init(device),
            output: LinearConfig::new(self.hidden_size, self.num_actions).init(device),
        }
    }
}

impl Default for QNetworkConfig {
    fn default() -> Self {
        Self::new(256)
    }
}

/// Feed-forward Q-value approximator
///
/// Generic over the Burn backend so the same network runs with autodiff for
/// training and without it for evaluation.
#[derive(Module, Debug)]
pub struct QNetwork<B: Backend> {
    hidden: Linear<B>,
    output: Linear<B>,
}

impl<B: Backend> QNetwork<B> {
    /// Map `[batch, 11]` features to `[batch, 3]` action values
    pub fn forward(&self, states: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = relu(self.hidden.forward(states));
        self.output.forward(x)
    }
}

/// Index of the largest value, lowest index on ties
pub fn argmax(values: &[f32]) -> usize {
    values
        .iter()
        .enumerate()
        .fold((0, f32::NEG_INFINITY), |(best_idx, best), (idx, &value)| {
            if value > best { (idx, value) } else { (best_idx, best) }
        })
        .0
}
