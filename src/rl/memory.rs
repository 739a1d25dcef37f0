//! Experience replay memory for DQN training
//!
//! A fixed-capacity ring buffer of transitions. Once full, every push evicts
//! the oldest transition. Sampling is uniform and without replacement.

use std::collections::VecDeque;

use rand::{Rng, seq::index};

use super::observation::StateVector;
use crate::game::RelativeAction;

/// One step of experience
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: StateVector,
    pub action: RelativeAction,
    pub reward: f32,
    pub next_state: StateVector,
    pub done: bool,
}

/// A batch of transitions laid out as parallel vectors
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransitionBatch {
    pub states: Vec<StateVector>,
    pub actions: Vec<RelativeAction>,
    pub rewards: Vec<f32>,
    pub next_states: Vec<StateVector>,
    pub dones: Vec<bool>,
}

impl TransitionBatch {
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    fn push(&mut self, transition: &Transition) {
        self.states.push(transition.state);
        self.actions.push(transition.action);
        self.rewards.push(transition.reward);
        self.next_states.push(transition.next_state);
        self.dones.push(transition.done);
    }
}

impl From<Transition> for TransitionBatch {
    /// Batch of one, used for single-step updates
    fn from(transition: Transition) -> Self {
        let mut batch = Self::default();
        batch.push(&transition);
        batch
    }
}

impl<'a> FromIterator<&'a Transition> for TransitionBatch {
    fn from_iter<I: IntoIterator<Item = &'a Transition>>(iter: I) -> Self {
        let mut batch = Self::default();
        for transition in iter {
            batch.push(transition);
        }
        batch
    }
}

/// Bounded FIFO store of past transitions
///
/// # Example
///
/// ```rust
/// use dqn_snake::game::RelativeAction;
/// use dqn_snake::rl::{ReplayMemory, Transition};
///
/// let mut memory = ReplayMemory::new(2);
/// for reward in [1.0, 2.0, 3.0] {
///     memory.push(Transition {
///         state: [0.0; 11],
///         action: RelativeAction::Straight,
///         reward,
///         next_state: [0.0; 11],
///         done: false,
///     });
/// }
///
/// assert_eq!(memory.len(), 2);
/// assert_eq!(memory.iter().next().unwrap().reward, 2.0);
/// ```
#[derive(Debug, Clone)]
pub struct ReplayMemory {
    transitions: VecDeque<Transition>,
    capacity: usize,
}

impl ReplayMemory {
    /// Create an empty memory holding at most `capacity` transitions
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "replay memory capacity must be positive");
        Self {
            transitions: VecDeque::with_capacity(capacity.min(1 << 16)),
            capacity,
        }
    }

    /// Append a transition, evicting the oldest when full
    pub fn push(&mut self, transition: Transition) {
        if self.transitions.len() == self.capacity {
            self.transitions.pop_front();
        }
        self.transitions.push_back(transition);
    }

    /// Uniformly sample `min(batch_size, len)` distinct transitions
    pub fn sample<R: Rng + ?Sized>(&self, batch_size: usize, rng: &mut R) -> TransitionBatch {
        let amount = batch_size.min(self.transitions.len());
        index::sample(rng, self.transitions.len(), amount)
            .into_iter()
            .map(|i| &self.transitions[i])
            .collect()
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.transitions.clear();
    }

    /// Iterate from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &Transition> {
        self.transitions.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};
    use std::collections::HashSet;

    fn transition(reward: f32) -> Transition {
        Transition {
            state: [reward; 11],
            action: RelativeAction::Left,
            reward,
            next_state: [0.0; 11],
            done: false,
        }
    }

    #[test]
    fn test_push_and_len() {
        let mut memory = ReplayMemory::new(10);
        assert!(memory.is_empty());

        memory.push(transition(1.0));
        memory.push(transition(2.0));

        assert_eq!(memory.len(), 2);
        assert_eq!(memory.capacity(), 10);
    }

    #[test]
    fn test_fifo_eviction() {
        let capacity = 5;
        let mut memory = ReplayMemory::new(capacity);

        for i in 0..=capacity {
            memory.push(transition(i as f32));
        }

        assert_eq!(memory.len(), capacity);
        let rewards: Vec<f32> = memory.iter().map(|t| t.reward).collect();
        assert!(!rewards.contains(&0.0), "oldest transition should be evicted");
        assert_eq!(rewards.last(), Some(&(capacity as f32)));
        assert_eq!(rewards, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_never_exceeds_capacity() {
        let mut memory = ReplayMemory::new(3);
        for i in 0..100 {
            memory.push(transition(i as f32));
            assert!(memory.len() <= 3);
        }
    }

    #[test]
    fn test_sample_without_replacement() {
        let mut memory = ReplayMemory::new(100);
        for i in 0..50 {
            memory.push(transition(i as f32));
        }

        let mut rng = StdRng::seed_from_u64(0);
        let batch = memory.sample(20, &mut rng);

        assert_eq!(batch.len(), 20);
        assert_eq!(batch.actions.len(), 20);
        assert_eq!(batch.rewards.len(), 20);
        assert_eq!(batch.next_states.len(), 20);
        assert_eq!(batch.dones.len(), 20);

        let distinct: HashSet<u32> = batch.rewards.iter().map(|r| *r as u32).collect();
        assert_eq!(distinct.len(), 20);
    }

    #[test]
    fn test_sample_keeps_fields_aligned() {
        let mut memory = ReplayMemory::new(100);
        for i in 0..30 {
            memory.push(transition(i as f32));
        }

        let mut rng = StdRng::seed_from_u64(3);
        let batch = memory.sample(10, &mut rng);

        for (state, reward) in batch.states.iter().zip(&batch.rewards) {
            assert_eq!(state[0], *reward);
        }
    }

    #[test]
    fn test_sample_smaller_than_batch() {
        let mut memory = ReplayMemory::new(100);
        for i in 0..7 {
            memory.push(transition(i as f32));
        }

        let mut rng = StdRng::seed_from_u64(1);
        let batch = memory.sample(1000, &mut rng);
        assert_eq!(batch.len(), 7);
    }

    #[test]
    fn test_sample_empty() {
        let memory = ReplayMemory::new(4);
        let mut rng = StdRng::seed_from_u64(1);
        assert!(memory.sample(8, &mut rng).is_empty());
    }

    #[test]
    fn test_batch_of_one() {
        let batch = TransitionBatch::from(transition(4.0));
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.rewards, vec![4.0]);
        assert_eq!(batch.actions, vec![RelativeAction::Left]);
    }

    #[test]
    fn test_clear() {
        let mut memory = ReplayMemory::new(4);
        memory.push(transition(1.0));
        memory.clear();
        assert!(memory.is_empty());
    }
}
