pub mod models;
pub mod config;
pub mod ingest;
pub mod aggregation;
pub mod scoring;
pub mod output;
pub mod utils;

pub use models::{ActionKind, RawEvent, NormalizedEvent, WalletAccumulator, WalletFeatures, ScoredWallet, WalletScoreError, Result};
pub use config::Settings;
pub use scoring::{ScoreCalculator, ScoringWeights};
pub use output::{ScoreTable, ScoreDistribution};
