use std::collections::HashSet;
use crate::{
    aggregation::{features, WalletAggregator},
    ingest::{normalizer, EventSource},
    models::{RawEvent, Result},
    output::ScoreTable,
    scoring::{ScoringAlgorithm, ScoringWeights},
};
use tracing::{info, warn};

/// Outcome of one pipeline run.
#[derive(Debug, Clone)]
pub struct ScoreReport {
    pub table: ScoreTable,
    pub transactions_loaded: usize,
    pub records_rejected: usize,
    pub events_dropped: usize,
    pub unique_wallets: usize,
}

/// Transaction and wallet counts for an input, without scoring it.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceSummary {
    pub transactions: usize,
    pub unique_wallets: usize,
    pub records_rejected: usize,
}

/// Drives the batch: load, normalize, aggregate, derive, score.
pub struct ScoreCalculator {
    algorithm: ScoringAlgorithm,
}

impl ScoreCalculator {
    pub fn new(weights: ScoringWeights) -> Self {
        Self {
            algorithm: ScoringAlgorithm::new(weights),
        }
    }

    pub fn run(&self, source: &dyn EventSource) -> Result<ScoreReport> {
        info!("Loading transactions from {}", source.describe());
        let batch = source.load()?;

        let mut report = self.score_events(&batch.events)?;
        report.records_rejected = batch.rejected;
        Ok(report)
    }

    pub fn score_events(&self, raw_events: &[RawEvent]) -> Result<ScoreReport> {
        let (events, events_dropped) = normalizer::normalize_all(raw_events);
        if events_dropped > 0 {
            warn!("Dropped {} events with unparseable amount or price", events_dropped);
        }

        let mut aggregator = WalletAggregator::new();
        aggregator.ingest_all(&events);
        let unique_wallets = aggregator.unique_wallets();
        let wallets = aggregator.finish();

        let population = features::derive_all(&wallets);
        let scores = self.algorithm.score_population(&population)?;
        info!("Scored {} wallets", scores.len());

        Ok(ScoreReport {
            table: ScoreTable::from_scores(scores),
            transactions_loaded: raw_events.len(),
            records_rejected: 0,
            events_dropped,
            unique_wallets,
        })
    }

    pub fn summarize(source: &dyn EventSource) -> Result<SourceSummary> {
        let batch = source.load()?;
        let unique_wallets = batch
            .events
            .iter()
            .map(|e| e.wallet.as_str())
            .collect::<HashSet<_>>()
            .len();

        Ok(SourceSummary {
            transactions: batch.events.len(),
            unique_wallets,
            records_rejected: batch.rejected,
        })
    }
}
