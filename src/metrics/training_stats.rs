//! Running statistics for a DQN training run
//!
//! Every per-episode series is kept in a [`RollingWindow`], so the means
//! reflect recent play. Totals and the record score cover the whole run.

use std::collections::VecDeque;

/// Fixed-size window over the most recent values of a series
#[derive(Debug, Clone)]
pub struct RollingWindow {
    values: VecDeque<f32>,
    capacity: usize,
}

impl RollingWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            values: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a value, evicting the oldest once the window is full
    pub fn push(&mut self, value: f32) {
        if self.capacity == 0 {
            return;
        }
        if self.values.len() == self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(value);
    }

    /// Mean of the window; 0 for an empty window
    pub fn mean(&self) -> f32 {
        match self.values.len() {
            0 => 0.0,
            n => self.values.iter().sum::<f32>() / n as f32,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Score, reward, length and loss tracking across a training run
///
/// # Example
///
/// ```rust
/// use dqn_snake::metrics::TrainingStats;
///
/// let mut stats = TrainingStats::new(100);
///
/// stats.record_episode(3, 42.0, 150);
/// stats.record_update(0.8);
///
/// assert_eq!(stats.record(), 3);
/// println!("{}", stats.format_summary());
/// ```
#[derive(Debug, Clone)]
pub struct TrainingStats {
    scores: RollingWindow,
    rewards: RollingWindow,
    lengths: RollingWindow,
    /// Replay losses, one per finished episode
    losses: RollingWindow,
    episodes: usize,
    steps: usize,
    record: u32,
    window_size: usize,
}

impl TrainingStats {
    pub fn new(window_size: usize) -> Self {
        Self {
            scores: RollingWindow::new(window_size),
            rewards: RollingWindow::new(window_size),
            lengths: RollingWindow::new(window_size),
            losses: RollingWindow::new(window_size),
            episodes: 0,
            steps: 0,
            record: 0,
            window_size,
        }
    }

    /// Carry over the best score of an earlier run
    pub fn with_record(mut self, record: u32) -> Self {
        self.record = record;
        self
    }

    /// Add a finished episode; true when its score beats the record
    pub fn record_episode(&mut self, score: u32, reward: f32, length: usize) -> bool {
        self.scores.push(score as f32);
        self.rewards.push(reward);
        self.lengths.push(length as f32);
        self.episodes += 1;
        self.steps += length;

        let improved = score > self.record;
        self.record = self.record.max(score);
        improved
    }

    pub fn record_update(&mut self, loss: f32) {
        self.losses.push(loss);
    }

    pub fn mean_episode_score(&self) -> f32 {
        self.scores.mean()
    }

    pub fn mean_episode_reward(&self) -> f32 {
        self.rewards.mean()
    }

    pub fn mean_episode_length(&self) -> f32 {
        self.lengths.mean()
    }

    pub fn mean_loss(&self) -> f32 {
        self.losses.mean()
    }

    pub fn record(&self) -> u32 {
        self.record
    }

    pub fn total_episodes(&self) -> usize {
        self.episodes
    }

    pub fn total_steps(&self) -> usize {
        self.steps
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn format_summary(&self) -> String {
        format!(
            "Episodes: {} | Steps: {} | Score: {:.2} | Record: {} | Reward: {:.2} | Len: {:.1} | Loss: {:.4}",
            self.episodes,
            self.steps,
            self.scores.mean(),
            self.record,
            self.rewards.mean(),
            self.lengths.mean(),
            self.losses.mean(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(actual: f32, expected: f32) -> bool {
        (actual - expected).abs() < 1e-5
    }

    #[test]
    fn test_window_evicts_oldest() {
        let mut window = RollingWindow::new(2);
        assert!(window.is_empty());

        window.push(1.0);
        window.push(2.0);
        window.push(6.0);

        assert_eq!(window.len(), 2);
        assert!(approx(window.mean(), 4.0));
    }

    #[test]
    fn test_zero_capacity_window_stays_empty() {
        let mut window = RollingWindow::new(0);
        window.push(5.0);
        assert!(window.is_empty());
        assert_eq!(window.mean(), 0.0);
    }

    #[test]
    fn test_fresh_stats_are_zero() {
        let stats = TrainingStats::new(100);
        assert_eq!(stats.window_size(), 100);
        assert_eq!(stats.total_episodes(), 0);
        assert_eq!(stats.total_steps(), 0);
        assert_eq!(stats.record(), 0);
        assert_eq!(stats.mean_episode_score(), 0.0);
        assert_eq!(stats.mean_loss(), 0.0);
    }

    #[test]
    fn test_single_episode() {
        let mut stats = TrainingStats::new(100);
        assert!(stats.record_episode(3, 10.0, 50));

        assert_eq!(stats.total_episodes(), 1);
        assert_eq!(stats.total_steps(), 50);
        assert!(approx(stats.mean_episode_score(), 3.0));
        assert!(approx(stats.mean_episode_reward(), 10.0));
        assert!(approx(stats.mean_episode_length(), 50.0));
    }

    #[test]
    fn test_record_outlives_window() {
        let mut stats = TrainingStats::new(2);

        assert!(stats.record_episode(10, 0.0, 1));
        assert!(!stats.record_episode(5, 0.0, 1));
        assert!(!stats.record_episode(10, 0.0, 1));
        stats.record_episode(1, 0.0, 1);
        stats.record_episode(1, 0.0, 1);
        assert_eq!(stats.record(), 10);
        assert!(approx(stats.mean_episode_score(), 1.0));

        assert!(stats.record_episode(15, 0.0, 1));
        assert_eq!(stats.record(), 15);
    }

    #[test]
    fn test_resumed_record_must_be_beaten() {
        let mut stats = TrainingStats::new(10).with_record(20);
        assert!(!stats.record_episode(12, 0.0, 5));
        assert_eq!(stats.record(), 20);
        assert!(stats.record_episode(21, 0.0, 5));
    }

    #[test]
    fn test_totals_cover_whole_run() {
        let mut stats = TrainingStats::new(3);
        for (score, length) in [(1, 10), (2, 20), (3, 30), (4, 40)] {
            stats.record_episode(score, score as f32, length);
        }

        assert_eq!(stats.total_episodes(), 4);
        assert_eq!(stats.total_steps(), 100);
        assert!(approx(stats.mean_episode_reward(), 3.0));
        assert!(approx(stats.mean_episode_length(), 30.0));
    }

    #[test]
    fn test_summary_line() {
        let mut stats = TrainingStats::new(100);
        stats.record_episode(5, 15.5, 150);
        stats.record_update(0.02);

        assert_eq!(
            stats.format_summary(),
            "Episodes: 1 | Steps: 150 | Score: 5.00 | Record: 5 | Reward: 15.50 | Len: 150.0 | Loss: 0.0200"
        );
    }
}
