use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::{
    models::{Result, ScoredWallet, WalletFeatures, WalletScoreError},
    scoring::{scaler::MinMax, ScoringWeights},
    utils::finite_or_zero,
};

/// Features that contribute positively to the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoredFeature {
    TotalDepositUsd,
    TotalRepayUsd,
    RepayRate,
    DepositToWithdrawRatio,
    ActivitySpanDays,
}

impl ScoredFeature {
    pub const ALL: [ScoredFeature; 5] = [
        ScoredFeature::TotalDepositUsd,
        ScoredFeature::TotalRepayUsd,
        ScoredFeature::RepayRate,
        ScoredFeature::DepositToWithdrawRatio,
        ScoredFeature::ActivitySpanDays,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScoredFeature::TotalDepositUsd => "total_deposit_usd",
            ScoredFeature::TotalRepayUsd => "total_repay_usd",
            ScoredFeature::RepayRate => "repay_rate",
            ScoredFeature::DepositToWithdrawRatio => "deposit_to_withdraw_ratio",
            ScoredFeature::ActivitySpanDays => "activity_span_days",
        }
    }

    pub fn value(&self, features: &WalletFeatures) -> f64 {
        let raw = match self {
            ScoredFeature::TotalDepositUsd => features.total_deposit_usd,
            ScoredFeature::TotalRepayUsd => features.total_repay_usd,
            ScoredFeature::RepayRate => features.repay_rate,
            ScoredFeature::DepositToWithdrawRatio => features.deposit_to_withdraw_ratio,
            ScoredFeature::ActivitySpanDays => features.activity_span_days as f64,
        };
        finite_or_zero(raw)
    }
}

/// Intermediate values behind one wallet's final score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoreBreakdown {
    pub wallet: String,
    /// Scaled features, in `ScoredFeature::ALL` order.
    pub scaled_features: [f64; 5],
    pub penalty: f64,
    /// Sum of scaled features minus penalty, clipped at zero.
    pub raw_score: f64,
}

/// Population-relative scorer.
///
/// Every feature is min-max scaled against the whole wallet set, so a score
/// only has meaning relative to the population it was computed with.
/// Scoring a different subset changes every wallet's score.
pub struct ScoringAlgorithm {
    weights: ScoringWeights,
}

impl ScoringAlgorithm {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    /// First pass: feature ranges over the population. Second pass: scaled
    /// sum minus penalty, clipped at zero.
    pub fn breakdown(&self, population: &[WalletFeatures]) -> Result<Vec<ScoreBreakdown>> {
        if population.is_empty() {
            return Err(WalletScoreError::EmptyPopulation);
        }

        let bounds: Vec<MinMax> = ScoredFeature::ALL
            .iter()
            .map(|feature| {
                let column: Vec<f64> = population.iter().map(|f| feature.value(f)).collect();
                MinMax::observe(&column).ok_or(WalletScoreError::EmptyPopulation)
            })
            .collect::<Result<_>>()?;

        for (feature, b) in ScoredFeature::ALL.iter().zip(&bounds) {
            debug!("{} range: [{}, {}]", feature.as_str(), b.min, b.max);
        }

        let ceiling = self.weights.feature_ceiling;
        Ok(population
            .iter()
            .map(|features| {
                let mut scaled_features = [0.0; 5];
                for (slot, (feature, b)) in scaled_features
                    .iter_mut()
                    .zip(ScoredFeature::ALL.iter().zip(&bounds))
                {
                    *slot = b.scale(feature.value(features), ceiling);
                }

                let penalty = self.weights.penalty(features);
                let raw_score = (scaled_features.iter().sum::<f64>() - penalty).max(0.0);

                ScoreBreakdown {
                    wallet: features.wallet.clone(),
                    scaled_features,
                    penalty,
                    raw_score: finite_or_zero(raw_score),
                }
            })
            .collect())
    }

    /// Scores the population and returns it ranked, highest first.
    pub fn score_population(&self, population: &[WalletFeatures]) -> Result<Vec<ScoredWallet>> {
        let breakdown = self.breakdown(population)?;

        let raw: Vec<f64> = breakdown.iter().map(|b| b.raw_score).collect();
        let bounds = MinMax::observe(&raw).ok_or(WalletScoreError::EmptyPopulation)?;
        let ceiling = self.weights.score_ceiling;

        let mut scored: Vec<ScoredWallet> = breakdown
            .into_iter()
            .map(|b| {
                // Truncation, not rounding.
                let score = bounds.scale(b.raw_score, ceiling as f64).trunc() as u32;
                ScoredWallet::new(b.wallet, score.min(ceiling))
            })
            .collect();

        scored.sort_by(ScoredWallet::ranking);
        Ok(scored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wallet(name: &str) -> WalletFeatures {
        WalletFeatures {
            wallet: name.to_string(),
            ..WalletFeatures::default()
        }
    }

    fn score_of(scores: &[ScoredWallet], name: &str) -> u32 {
        scores.iter().find(|s| s.wallet == name).unwrap().score
    }

    #[test]
    fn test_empty_population_is_an_error() {
        let algo = ScoringAlgorithm::new(ScoringWeights::default());
        assert!(matches!(
            algo.score_population(&[]),
            Err(WalletScoreError::EmptyPopulation)
        ));
    }

    #[test]
    fn test_single_wallet_scores_zero() {
        let algo = ScoringAlgorithm::new(ScoringWeights::default());
        let mut w = wallet("0xsolo");
        w.total_deposit_usd = 5_000.0;
        w.liquidation_count = 2;

        let breakdown = algo.breakdown(&[w.clone()]).unwrap();
        assert_eq!(breakdown[0].scaled_features, [0.0; 5]);
        assert_eq!(breakdown[0].raw_score, 0.0);

        let scores = algo.score_population(&[w]).unwrap();
        assert_eq!(scores, vec![ScoredWallet::new("0xsolo", 0)]);
    }

    #[test]
    fn test_best_wallet_gets_ceiling() {
        let algo = ScoringAlgorithm::new(ScoringWeights::default());
        let mut good = wallet("0xgood");
        good.total_deposit_usd = 1_000.0;
        good.total_repay_usd = 400.0;
        let mut mid = wallet("0xmid");
        mid.total_deposit_usd = 500.0;
        let idle = wallet("0xidle");

        let scores = algo.score_population(&[idle, mid, good]).unwrap();
        assert_eq!(scores[0], ScoredWallet::new("0xgood", 1000));
        assert_eq!(score_of(&scores, "0xmid"), 250);
        assert_eq!(score_of(&scores, "0xidle"), 0);
    }

    #[test]
    fn test_penalties_reduce_raw_score() {
        let algo = ScoringAlgorithm::new(ScoringWeights::default());
        let mut a = wallet("0xa");
        a.total_deposit_usd = 100.0;
        a.liquidation_count = 1;
        a.borrow_to_repay_ratio = 2.0;
        let b = wallet("0xb");

        let breakdown = algo.breakdown(&[a, b]).unwrap();
        assert_eq!(breakdown[0].penalty, 50.0);
        assert_eq!(breakdown[0].raw_score, 950.0);
    }

    #[test]
    fn test_raw_score_clips_at_zero() {
        let algo = ScoringAlgorithm::new(ScoringWeights::default());
        let mut debtor = wallet("0xdebtor");
        debtor.total_deposit_usd = 10.0;
        debtor.borrow_to_repay_ratio = 1_000_000.0;
        let mut other = wallet("0xother");
        other.total_deposit_usd = 20.0;

        let breakdown = algo.breakdown(&[debtor, other]).unwrap();
        assert_eq!(breakdown[0].raw_score, 0.0);
    }

    #[test]
    fn test_final_score_truncates() {
        let algo = ScoringAlgorithm::new(ScoringWeights::default());
        let mut top = wallet("0xtop");
        top.total_deposit_usd = 3.0;
        let mut third = wallet("0xthird");
        third.total_deposit_usd = 1.0;
        let bottom = wallet("0xbottom");

        // 1/3 of 1000 is 333.33.., never rounded up
        let scores = algo.score_population(&[top, third, bottom]).unwrap();
        assert_eq!(score_of(&scores, "0xthird"), 333);
    }

    #[test]
    fn test_ties_rank_by_address() {
        let algo = ScoringAlgorithm::new(ScoringWeights::default());
        let scores = algo
            .score_population(&[wallet("0xc"), wallet("0xa"), wallet("0xb")])
            .unwrap();
        let order: Vec<&str> = scores.iter().map(|s| s.wallet.as_str()).collect();
        assert_eq!(order, vec!["0xa", "0xb", "0xc"]);
    }

    #[test]
    fn test_scores_are_population_relative() {
        let algo = ScoringAlgorithm::new(ScoringWeights::default());
        let mut a = wallet("0xa");
        a.total_deposit_usd = 100.0;
        let mut b = wallet("0xb");
        b.total_deposit_usd = 200.0;
        let c = wallet("0xc");

        let full = algo.score_population(&[a.clone(), b.clone(), c]).unwrap();
        let subset = algo.score_population(&[a, b]).unwrap();

        assert_eq!(score_of(&full, "0xa"), 500);
        assert_eq!(score_of(&subset, "0xa"), 0);
    }
}
