//! Q-learning trainer
//!
//! Computes Bellman targets for a batch of transitions and performs one Adam
//! step on the mean-squared error between predicted and target Q-values.
//! A single transition is just a batch of one.

use anyhow::{Result, anyhow};
use burn::{
    module::AutodiffModule,
    nn::loss::{MseLoss, Reduction},
    optim::{Adam, AdamConfig, GradientsParams, Optimizer, adaptor::OptimizerAdaptor},
    tensor::{ElementConversion, Tensor, TensorData, backend::AutodiffBackend},
};

use super::memory::TransitionBatch;
use super::network::QNetwork;
use super::observation::states_to_tensor;
use crate::game::RelativeAction;

/// Build the regression targets for a batch
///
/// `predicted` and `next_q` are row-major `[batch, 3]` Q-values for the
/// states and next states. The result equals `predicted` except at each
/// taken action, which holds `reward` for terminal transitions and
/// `reward + gamma * max(next_q row)` otherwise.
pub fn bellman_targets(
    predicted: &[f32],
    next_q: &[f32],
    batch: &TransitionBatch,
    gamma: f32,
) -> Vec<f32> {
    let num_actions = RelativeAction::COUNT;
    let mut targets = predicted.to_vec();

    for i in 0..batch.len() {
        let q_new = if batch.dones[i] {
            batch.rewards[i]
        } else {
            let row = &next_q[i * num_actions..(i + 1) * num_actions];
            let best_next = row.iter().copied().fold(f32::NEG_INFINITY, f32::max);
            batch.rewards[i] + gamma * best_next
        };

        targets[i * num_actions + batch.actions[i].index()] = q_new;
    }

    targets
}

/// Owns the Q-network and its optimizer
pub struct QTrainer<B: AutodiffBackend> {
    network: QNetwork<B>,
    optim: OptimizerAdaptor<Adam, QNetwork<B>, B>,
    learning_rate: f64,
    gamma: f32,
    device: B::Device,
}

impl<B: AutodiffBackend> QTrainer<B> {
    pub fn new(network: QNetwork<B>, learning_rate: f64, gamma: f32, device: B::Device) -> Self {
        Self {
            network,
            optim: AdamConfig::new().init(),
            learning_rate,
            gamma,
            device,
        }
    }

    /// One gradient step over the batch, returning the loss before the step
    ///
    /// An empty batch leaves the network untouched.
    pub fn update(&mut self, batch: &TransitionBatch) -> Result<f32> {
        if batch.is_empty() {
            return Ok(0.0);
        }

        let states: Tensor<B, 2> = states_to_tensor(&batch.states, &self.device);
        let next_states = states_to_tensor::<B::InnerBackend>(&batch.next_states, &self.device);

        let predicted = self.network.forward(states);

        // Bootstrap values come from a no-grad copy of the network
        let next_q = self.network.valid().forward(next_states);

        let predicted_values = tensor_values(predicted.clone().detach().into_data())?;
        let next_values = tensor_values(next_q.into_data())?;
        let targets = bellman_targets(&predicted_values, &next_values, batch, self.gamma);

        let target: Tensor<B, 2> = Tensor::from_data(
            TensorData::new(targets, [batch.len(), RelativeAction::COUNT]),
            &self.device,
        );

        let loss = MseLoss::new().forward(predicted, target, Reduction::Mean);
        let loss_value = loss.clone().into_scalar().elem::<f32>();

        let grads = loss.backward();
        let grads = GradientsParams::from_grads(grads, &self.network);
        self.network = self
            .optim
            .step(self.learning_rate, self.network.clone(), grads);

        Ok(loss_value)
    }

    pub fn network(&self) -> &QNetwork<B> {
        &self.network
    }

    pub fn device(&self) -> &B::Device {
        &self.device
    }
}

/// Flatten tensor data into `f32` values
pub(crate) fn tensor_values(data: TensorData) -> Result<Vec<f32>> {
    data.to_vec::<f32>()
        .map_err(|err| anyhow!("failed to read tensor values: {err:?}"))
}
