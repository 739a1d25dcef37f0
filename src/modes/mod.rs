pub mod evaluate;
pub mod train;

pub use evaluate::{EvaluateMode, EvaluationSummary, GameOutcome};
pub use train::{EpisodeReport, TrainConfig, TrainMode};
