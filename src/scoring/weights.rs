use serde::{Deserialize, Serialize};
use crate::models::WalletFeatures;
use crate::utils::finite_or_zero;

/// Scaling ranges and penalty multipliers used by the scorer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoringWeights {
    /// Upper bound each scaled feature is mapped onto.
    pub feature_ceiling: f64,
    /// Upper bound of the final integer score.
    pub score_ceiling: u32,
    /// Subtracted once per liquidation.
    pub liquidation_penalty: f64,
    /// Multiplier on borrow_to_repay_ratio. Unbounded before clipping.
    pub borrow_repay_penalty: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            feature_ceiling: 1000.0,
            score_ceiling: 1000,
            liquidation_penalty: 30.0,
            borrow_repay_penalty: 10.0,
        }
    }
}

impl ScoringWeights {
    pub fn penalty(&self, features: &WalletFeatures) -> f64 {
        let liquidations = features.liquidation_count as f64 * self.liquidation_penalty;
        let ratio = finite_or_zero(features.borrow_to_repay_ratio) * self.borrow_repay_penalty;
        liquidations + ratio
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.feature_ceiling.is_finite() || self.feature_ceiling <= 0.0 {
            return Err(format!("Feature ceiling must be positive, got {}", self.feature_ceiling));
        }

        if self.score_ceiling == 0 {
            return Err("Score ceiling must be positive".to_string());
        }

        if !self.liquidation_penalty.is_finite() || self.liquidation_penalty < 0.0 ||
           !self.borrow_repay_penalty.is_finite() || self.borrow_repay_penalty < 0.0 {
            return Err("Penalty multipliers must be finite and non-negative".to_string());
        }

        Ok(())
    }
}
