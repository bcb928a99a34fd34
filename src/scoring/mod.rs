pub mod algorithm;
pub mod scaler;
pub mod weights;
pub mod calculator;

pub use algorithm::{ScoringAlgorithm, ScoreBreakdown, ScoredFeature};
pub use scaler::MinMax;
pub use weights::ScoringWeights;
pub use calculator::{ScoreCalculator, ScoreReport, SourceSummary};
