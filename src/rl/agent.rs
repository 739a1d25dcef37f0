//! Epsilon-greedy Deep Q-Learning agent
//!
//! Combines the Q-network trainer with replay memory and the exploration
//! schedule. The training loop drives it one step at a time:
//!
//! ```rust,ignore
//! let action = agent.select_action(&state)?;
//! let (next_state, result) = env.step(action)?;
//! let transition = Transition { state, action, reward: result.reward, next_state, done: result.terminated };
//! agent.train_short_memory(&transition)?;
//! agent.remember(transition);
//! // ... on termination
//! agent.finish_episode();
//! agent.train_long_memory()?;
//! ```

use anyhow::{Result, anyhow};
use burn::{
    module::AutodiffModule,
    tensor::backend::{AutodiffBackend, Backend},
};
use rand::{Rng, SeedableRng, rngs::StdRng};

use super::config::DqnConfig;
use super::memory::{ReplayMemory, Transition, TransitionBatch};
use super::network::{QNetwork, QNetworkConfig, argmax};
use super::observation::{StateVector, states_to_tensor};
use super::trainer::{QTrainer, tensor_values};
use crate::game::RelativeAction;

/// Exploration value after `episodes` completed episodes
///
/// Decreases linearly with the episode count and never drops below the floor.
pub fn epsilon_schedule(config: &DqnConfig, episodes: usize) -> f32 {
    (config.epsilon_start - config.epsilon_decay * episodes as f32).max(config.epsilon_floor)
}

/// Best action according to the network (lowest index on ties)
pub fn greedy_action<B: Backend>(
    network: &QNetwork<B>,
    state: &StateVector,
    device: &B::Device,
) -> Result<RelativeAction> {
    let q_values = tensor_values(network.forward(states_to_tensor(&[*state], device)).into_data())?;
    Ok(RelativeAction::from_index(argmax(&q_values))?)
}

pub struct DqnAgent<B: AutodiffBackend> {
    trainer: QTrainer<B>,
    memory: ReplayMemory,
    config: DqnConfig,
    /// Completed episodes, drives the exploration schedule
    episodes: usize,
    rng: StdRng,
}

impl<B: AutodiffBackend> DqnAgent<B> {
    /// Create an agent with a freshly initialised network
    pub fn new(config: DqnConfig, device: B::Device, seed: Option<u64>) -> Result<Self> {
        let network = QNetworkConfig::new(config.hidden_size).init::<B>(&device);
        Self::from_network(network, config, 0, device, seed)
    }

    /// Create an agent around an existing network, e.g. loaded from a checkpoint
    pub fn from_network(
        network: QNetwork<B>,
        config: DqnConfig,
        episodes: usize,
        device: B::Device,
        seed: Option<u64>,
    ) -> Result<Self> {
        config
            .validate()
            .map_err(|msg| anyhow!("invalid DQN configuration: {msg}"))?;

        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            trainer: QTrainer::new(network, config.learning_rate, config.gamma, device),
            memory: ReplayMemory::new(config.memory_capacity),
            config,
            episodes,
            rng,
        })
    }

    /// Current exploration value
    pub fn epsilon(&self) -> f32 {
        epsilon_schedule(&self.config, self.episodes)
    }

    /// Epsilon-greedy action for the given state
    pub fn select_action(&mut self, state: &StateVector) -> Result<RelativeAction> {
        if self.rng.gen_range(0.0..self.config.epsilon_scale) < self.epsilon() {
            let idx = self.rng.gen_range(0..RelativeAction::COUNT);
            return Ok(RelativeAction::from_index(idx)?);
        }

        self.best_action(state)
    }

    /// Greedy action, without exploration
    pub fn best_action(&self, state: &StateVector) -> Result<RelativeAction> {
        let network = self.trainer.network().valid();
        greedy_action(&network, state, self.trainer.device())
    }

    /// Immediate single-sample update on the latest transition
    pub fn train_short_memory(&mut self, transition: &Transition) -> Result<f32> {
        self.trainer.update(&TransitionBatch::from(transition.clone()))
    }

    /// Store a transition for experience replay
    pub fn remember(&mut self, transition: Transition) {
        self.memory.push(transition);
    }

    /// Replay one randomly sampled batch from memory
    pub fn train_long_memory(&mut self) -> Result<f32> {
        let batch = self.memory.sample(self.config.batch_size, &mut self.rng);
        self.trainer.update(&batch)
    }

    /// Mark an episode as completed, lowering epsilon
    pub fn finish_episode(&mut self) {
        self.episodes += 1;
    }

    pub fn episodes_trained(&self) -> usize {
        self.episodes
    }

    pub fn network(&self) -> &QNetwork<B> {
        self.trainer.network()
    }

    pub fn memory(&self) -> &ReplayMemory {
        &self.memory
    }

    pub fn config(&self) -> &DqnConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rl::observation::STATE_SIZE;
    use burn::backend::{
        Autodiff,
        ndarray::{NdArray, NdArrayDevice},
    };
    use std::collections::HashSet;

    type TestBackend = Autodiff<NdArray<f32>>;

    fn small_config() -> DqnConfig {
        DqnConfig {
            hidden_size: 16,
            memory_capacity: 50,
            batch_size: 8,
            ..Default::default()
        }
    }

    fn create_test_agent(config: DqnConfig) -> DqnAgent<TestBackend> {
        DqnAgent::new(config, NdArrayDevice::default(), Some(7)).unwrap()
    }

    fn transition(reward: f32, done: bool) -> Transition {
        Transition {
            state: [0.0; STATE_SIZE],
            action: RelativeAction::Straight,
            reward,
            next_state: [1.0; STATE_SIZE],
            done,
        }
    }

    #[test]
    fn test_epsilon_schedule_monotonic_with_floor() {
        let config = DqnConfig::default();
        let mut previous = f32::INFINITY;

        for episodes in 0..500 {
            let epsilon = epsilon_schedule(&config, episodes);
            assert!(epsilon <= previous);
            assert!(epsilon >= config.epsilon_floor);
            previous = epsilon;
        }

        assert_eq!(epsilon_schedule(&config, 0), 80.0);
        assert_eq!(epsilon_schedule(&config, 30), 50.0);
        assert_eq!(epsilon_schedule(&config, 10_000), config.epsilon_floor);
    }

    #[test]
    fn test_finish_episode_lowers_epsilon() {
        let mut agent = create_test_agent(small_config());
        let before = agent.epsilon();

        agent.finish_episode();

        assert_eq!(agent.episodes_trained(), 1);
        assert!(agent.epsilon() < before);
    }

    #[test]
    fn test_full_exploration_covers_all_actions() {
        let config = DqnConfig {
            epsilon_start: 200.0,
            epsilon_floor: 200.0,
            ..small_config()
        };
        let mut agent = create_test_agent(config);
        let state = [0.0; STATE_SIZE];

        let seen: HashSet<RelativeAction> = (0..200)
            .map(|_| agent.select_action(&state).unwrap())
            .collect();
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn test_no_exploration_is_greedy() {
        let config = DqnConfig {
            epsilon_start: 0.0,
            epsilon_floor: 0.0,
            ..small_config()
        };
        let mut agent = create_test_agent(config);
        let state = [1.0; STATE_SIZE];
        let greedy = agent.best_action(&state).unwrap();

        for _ in 0..20 {
            assert_eq!(agent.select_action(&state).unwrap(), greedy);
        }
    }

    #[test]
    fn test_remember_and_replay() {
        let mut agent = create_test_agent(small_config());

        for i in 0..60 {
            agent.remember(transition(i as f32, i % 10 == 0));
        }
        assert_eq!(agent.memory().len(), 50);

        let loss = agent.train_long_memory().unwrap();
        assert!(loss.is_finite());
    }

    #[test]
    fn test_replay_with_empty_memory() {
        let mut agent = create_test_agent(small_config());
        assert_eq!(agent.train_long_memory().unwrap(), 0.0);
    }

    #[test]
    fn test_short_memory_update() {
        let mut agent = create_test_agent(small_config());
        let loss = agent.train_short_memory(&transition(-10.0, true)).unwrap();
        assert!(loss.is_finite());
        assert!(agent.memory().is_empty());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = DqnConfig {
            gamma: 2.0,
            ..small_config()
        };
        assert!(DqnAgent::<TestBackend>::new(config, NdArrayDevice::default(), None).is_err());
    }
}
